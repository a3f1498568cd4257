//! Directory value codecs
//!
//! Context-sensitive hex escaping of attribute values for search filters
//! (RFC 4515) and distinguished names (RFC 4514), its inverse, and the
//! quoted UTF-16LE encoding Active Directory expects for `unicodePwd`.
//!
//! Every escaped character is written as `\` followed by two lowercase hex
//! digits per UTF-8 byte, so multi-byte characters expand to several
//! escape sequences and [`unescape`] restores them exactly.

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Which characters [`escape`] rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EscapeContext {
    /// Escape every character that is not ignored.
    #[default]
    Unspecified,
    /// Search filter metacharacters: `( ) * \` and NUL.
    Filter,
    /// DN metacharacters: `, + " \ < > ; = #`, plus a leading or
    /// trailing space.
    DistinguishedName,
    /// Union of [`EscapeContext::Filter`] and
    /// [`EscapeContext::DistinguishedName`].
    Both,
}

impl EscapeContext {
    /// Map the integer escape flag (0 to 3) used on the wire.
    ///
    /// Unknown flags fall back to [`EscapeContext::Unspecified`].
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            1 => EscapeContext::Filter,
            2 => EscapeContext::DistinguishedName,
            3 => EscapeContext::Both,
            _ => EscapeContext::Unspecified,
        }
    }

    /// The integer escape flag for this context.
    pub fn flag(self) -> u8 {
        match self {
            EscapeContext::Unspecified => 0,
            EscapeContext::Filter => 1,
            EscapeContext::DistinguishedName => 2,
            EscapeContext::Both => 3,
        }
    }

    fn must_escape(self, ch: char, leading: bool, trailing: bool) -> bool {
        match self {
            EscapeContext::Unspecified => true,
            EscapeContext::Filter => is_filter_special(ch),
            EscapeContext::DistinguishedName => is_dn_special(ch, leading, trailing),
            EscapeContext::Both => is_filter_special(ch) || is_dn_special(ch, leading, trailing),
        }
    }
}

fn is_filter_special(ch: char) -> bool {
    matches!(ch, '(' | ')' | '*' | '\\' | '\0')
}

fn is_dn_special(ch: char, leading: bool, trailing: bool) -> bool {
    match ch {
        ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' | '#' => true,
        ' ' => leading || trailing,
        _ => false,
    }
}

fn push_hex_escaped(out: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    for byte in ch.encode_utf8(&mut buf).bytes() {
        out.push('\\');
        out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
        out.push(HEX_DIGITS[usize::from(byte & 0x0f)] as char);
    }
}

/// Escape `value` for use in the given context.
///
/// Characters contained in `ignore` are always emitted unchanged.
///
/// ```
/// use ldapkit::codec::{escape, EscapeContext};
///
/// assert_eq!(escape("(admin)", "", EscapeContext::Filter), "\\28admin\\29");
/// assert_eq!(escape("a,b", "", EscapeContext::DistinguishedName), "a\\2cb");
/// ```
pub fn escape(value: &str, ignore: &str, context: EscapeContext) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut result = String::with_capacity(value.len() * 3);

    for (i, ch) in value.chars().enumerate() {
        if ignore.contains(ch) || !context.must_escape(ch, i == 0, i == last) {
            result.push(ch);
        } else {
            push_hex_escaped(&mut result, ch);
        }
    }

    result
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Replace every `\XX` hex sequence with the byte it encodes.
///
/// Decoded bytes are read as UTF-8, the same unit [`escape`] writes, so
/// `\c3\a9` is `é`. A lone `\e9` is not the code point U+00E9 but an
/// invalid UTF-8 byte, and becomes U+FFFD like any other invalid sequence.
/// A backslash not followed by two hex digits is kept literally.
pub fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Encode a password for the `unicodePwd` attribute.
///
/// The password is surrounded with double quotes and encoded as UTF-16LE,
/// so an ASCII password of `n` characters yields `2 * (n + 2)` bytes.
pub fn encode_password(password: &str) -> Vec<u8> {
    format!("\"{password}\"")
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Interpret a directory boolean (`TRUE`/`FALSE`, any case).
pub fn convert_string_to_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
