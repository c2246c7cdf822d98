use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

const UNKNOWN_CHAR: char = '\u{FFFD}';

/// Decode a hex code point. Surrogates and values past U+10FFFF become
/// U+FFFD.
pub fn decode_code_point(hex: &str) -> char {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(UNKNOWN_CHAR)
}

/// Decode the escape sequences of a string literal body: `\\`, `\"`,
/// `\uXXXX` and `\UXXXXXX`. Malformed sequences decode to U+FFFD; the parser
/// rejects them before they reach this point.
pub fn unescape(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.char_indices();
    while let Some((_, ch)) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let decoded = match chars.next() {
            Some((_, '\\')) => '\\',
            Some((_, '"')) => '"',
            Some((pos, marker @ ('u' | 'U'))) => {
                let len = if marker == 'u' { 4 } else { 6 };
                let start = pos + 1;
                match input.get(start..start + len) {
                    Some(hex) if hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                        for _ in 0..len {
                            chars.next();
                        }
                        decode_code_point(hex)
                    }
                    _ => UNKNOWN_CHAR,
                }
            }
            _ => UNKNOWN_CHAR,
        };
        result.push(decoded);
    }
    Cow::Owned(result)
}

/// Inverse of [`unescape`] for text that must fit in a string literal.
pub fn escape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' | '\r' => result.push_str(&format!("\\u{:04X}", ch as u32)),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{escape, unescape};
    use alloc::borrow::Cow;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(unescape("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn decodes_known_sequences() {
        assert_eq!(unescape("a\\u0041b"), "aAb");
        assert_eq!(unescape("\\\"quoted\\\" \\\\"), "\"quoted\" \\");
        assert_eq!(unescape("\\U01F602"), "\u{1F602}");
        assert_eq!(unescape("zaż\\u00F3łć"), "zażółć");
    }

    #[test]
    fn invalid_code_points_become_replacement_char() {
        assert_eq!(unescape("\\uD800"), "\u{FFFD}");
        assert_eq!(unescape("\\UFFFFFF"), "\u{FFFD}");
    }

    #[test]
    fn escape_round_trips() {
        let text = "say \"hi\"\\\nbye";
        assert_eq!(escape(text), "say \\\"hi\\\"\\\\\\u000Abye");
        assert_eq!(unescape(&escape(text)), text);
    }
}
