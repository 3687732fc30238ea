use crate::codec::cursor::ReadCursor;
use crate::codec::types::Value;
use crate::internal::error::DecodeError;

/// Width of the legacy FLOAT payload.
pub const LEGACY_FLOAT_LEN: usize = 31;

/// Decodes a legacy FLOAT payload: 31 bytes of ASCII text, NUL padded.
pub fn decode_float(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    let raw: [u8; LEGACY_FLOAT_LEN] = cursor.read_array()?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(LEGACY_FLOAT_LEN);
    let text = std::str::from_utf8(&raw[..end])
        .map_err(|_| DecodeError::MalformedFloat(String::from_utf8_lossy(&raw[..end]).into_owned()))?;
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| DecodeError::MalformedFloat(trimmed.to_string()))
}

/// Decodes a NEW_FLOAT payload: a big-endian IEEE 754 double.
pub fn decode_new_float(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    Ok(Value::Float(cursor.read_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn legacy(text: &str) -> ReadCursor {
        let mut raw = text.as_bytes().to_vec();
        raw.resize(LEGACY_FLOAT_LEN, 0);
        ReadCursor::new(Bytes::from(raw))
    }

    #[test]
    fn test_decode_legacy_float() {
        let mut cursor = legacy("2.50000000000000000000e+00");
        assert_eq!(decode_float(&mut cursor).unwrap(), Value::Float(2.5));
        assert!(cursor.is_empty());

        let mut negative = legacy("-1.00000000000000000000e+02");
        assert_eq!(decode_float(&mut negative).unwrap(), Value::Float(-100.0));
    }

    #[test]
    fn test_decode_legacy_float_errors() {
        assert_eq!(
            decode_float(&mut legacy("2.5abc")),
            Err(DecodeError::MalformedFloat("2.5abc".to_string()))
        );
        assert!(matches!(decode_float(&mut legacy("")), Err(DecodeError::MalformedFloat(_))));

        let mut short = ReadCursor::new(Bytes::from_static(b"1.0"));
        assert_eq!(
            decode_float(&mut short),
            Err(DecodeError::UnexpectedEof { needed: 31, remaining: 3 })
        );
    }

    #[test]
    fn test_decode_new_float() {
        let mut cursor = ReadCursor::new(Bytes::from_static(&[0x40, 0x04, 0, 0, 0, 0, 0, 0]));
        assert_eq!(decode_new_float(&mut cursor).unwrap(), Value::Float(2.5));
    }
}
