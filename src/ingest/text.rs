use crate::error::{ChatError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode a plain-text document as strict UTF-8.
pub fn extract(bytes: &[u8]) -> Result<Vec<String>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| ChatError::parse_failure("text", e))?;
    Ok(vec![text.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_byte_order_mark() {
        let segments = extract(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(segments, vec!["hello".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_a_parse_failure() {
        let err = extract(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ChatError::ParseFailure { ref format, .. } if format == "text"));
    }
}
