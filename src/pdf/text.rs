//! Decoding of PDF text strings.

use encoding_rs::{UTF_16BE, WINDOWS_1252};

/// Decode a PDF text string to UTF-8.
///
/// Strings with a big-endian BOM are UTF-16BE per the PDF spec. Everything
/// else is tried as UTF-8 first, then decoded as WINDOWS-1252, which covers
/// the printable range of PDFDocEncoding.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (text, _, _) = UTF_16BE.decode(bytes);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16be_with_bom() {
        // "1 In" as UTF-16BE with BOM
        let bytes = [0xFE, 0xFF, 0x00, 0x31, 0x00, 0x20, 0x00, 0x49, 0x00, 0x6E];
        assert_eq!(decode_text(&bytes), "1 In");
    }

    #[test]
    fn test_plain_utf8() {
        assert_eq!(decode_text("Chapter 1".as_bytes()), "Chapter 1");
        assert_eq!(decode_text("第1章".as_bytes()), "第1章");
    }

    #[test]
    fn test_cp1252_fallback() {
        // 0xE9 is é in CP1252 but invalid standalone UTF-8
        assert_eq!(decode_text(&[0x52, 0xE9, 0x73, 0x75, 0x6D, 0xE9]), "Résumé");
    }
}
