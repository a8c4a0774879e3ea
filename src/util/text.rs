use std::borrow::Cow;

/// True for characters matched by the XML 1.0 `Char` production.
///
/// `char` never holds a surrogate, so only the C0 controls (other than tab,
/// newline and carriage return) and U+FFFE/U+FFFF fall outside.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Strip characters that cannot appear anywhere in an XML 1.0 document.
///
/// Strips:
/// - ASCII control chars: 0x00-0x08, 0x0B-0x0C, 0x0E-0x1F
/// - The noncharacters U+FFFE and U+FFFF
///
/// Preserves: tab (0x09), newline (0x0A), carriage return (0x0D).
///
/// Returns `Cow::Borrowed` when the input is already clean (common case).
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        return Cow::Borrowed(s);
    }

    let cleaned: String = s.chars().filter(|&c| is_xml_char(c)).collect();
    tracing::debug!(
        removed = s.chars().count() - cleaned.chars().count(),
        "Stripped characters not allowed in XML"
    );
    Cow::Owned(cleaned)
}
