//! Reading individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{ConvertError, Result};

/// Read a message file from disk.
pub fn read_eml(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::FileNotFound(path.to_path_buf())
        } else {
            ConvertError::io(path, e)
        }
    })
}

/// Find the byte offset where headers end (position of the first blank line).
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    (0..data.len()).find(|&i| {
        data[i..].starts_with(b"\n\n") || data[i..].starts_with(b"\r\n\r\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_header_end() {
        // "From: a@b.com\n" = 14 bytes, "Subject: Hi\n" = 12 bytes
        let data = b"From: a@b.com\nSubject: Hi\n\nBody\n";
        assert_eq!(find_header_end(data), Some(25));
    }

    #[test]
    fn test_find_header_end_crlf() {
        let data = b"From: a@b.com\r\nSubject: Hi\r\n\r\nBody\r\n";
        assert_eq!(find_header_end(data), Some(26));
    }

    #[test]
    fn test_find_header_end_headers_only() {
        assert_eq!(find_header_end(b"Subject: Hi\n"), None);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_eml("/nonexistent/definitely/missing.eml").unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound(_)));
    }
}
