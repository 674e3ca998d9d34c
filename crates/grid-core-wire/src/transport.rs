//! Stdio message framing.
//!
//! Messages are JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use serde_json::Value;
use std::io::{BufRead, Write};

use crate::WireError;

/// Write a single framed message to `writer`.
pub fn write_message<W: Write>(writer: &mut W, value: &Value) -> Result<(), WireError> {
    let body = serde_json::to_vec(value)?;

    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read a single framed message from `reader`.
///
/// Returns `Ok(None)` on a clean EOF before any header byte.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Value>, WireError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            if saw_header {
                return Err(WireError::UnexpectedEof);
            }
            return Ok(None);
        }
        saw_header = true;

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }

        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("Content-Length")
        {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| WireError::InvalidContentLength(value.trim().to_string()))?;
            content_length = Some(parsed);
        }
    }

    let length = content_length.ok_or(WireError::MissingContentLength)?;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    Ok(Some(serde_json::from_slice(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_framing_round_trip() {
        let mut buf = Vec::new();
        write_message(&mut buf, &json!({"id": 1, "result": []})).unwrap();
        write_message(&mut buf, &json!({"id": 2, "error": "no"})).unwrap();
        let first = serde_json::to_vec(&json!({"id": 1, "result": []})).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", first.len());
        assert!(buf.starts_with(header.as_bytes()));

        let mut reader = Cursor::new(buf);
        assert_eq!(
            read_message(&mut reader).unwrap(),
            Some(json!({"id": 1, "result": []}))
        );
        assert_eq!(
            read_message(&mut reader).unwrap(),
            Some(json!({"id": 2, "error": "no"}))
        );
        assert_eq!(read_message(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut reader = Cursor::new(b"content-length: 2\r\nX-Other: y\r\n\r\n{}".to_vec());
        assert_eq!(read_message(&mut reader).unwrap(), Some(json!({})));
    }

    #[test]
    fn test_missing_length_is_an_error() {
        let mut reader = Cursor::new(b"X-Other: y\r\n\r\n{}".to_vec());
        assert!(matches!(
            read_message(&mut reader),
            Err(WireError::MissingContentLength)
        ));
    }

    #[test]
    fn test_truncated_body_is_io_error() {
        let mut reader = Cursor::new(b"Content-Length: 10\r\n\r\n{}".to_vec());
        assert!(matches!(read_message(&mut reader), Err(WireError::Io(_))));
    }
}
