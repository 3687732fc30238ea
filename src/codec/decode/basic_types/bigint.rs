use crate::codec::cursor::ReadCursor;
use crate::codec::types::{BigInt, Sign, Tag, Value};
use crate::internal::error::DecodeError;

/// Decodes a SMALL_BIG or LARGE_BIG payload.
///
/// The magnitude is kept exactly as sent, high zero bytes included.
pub fn decode_big(cursor: &mut ReadCursor, tag: Tag) -> Result<Value, DecodeError> {
    let digits = match tag {
        Tag::SmallBig => usize::from(cursor.read_u8()?),
        _ => cursor.read_u32()? as usize,
    };
    let sign = Sign::from_byte(cursor.read_u8()?);
    let magnitude = cursor.read_exact(digits)?;
    Ok(Value::BigInt(BigInt { sign, magnitude }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_decode_small_big() {
        // 2147483648
        let mut cursor = ReadCursor::new(Bytes::from_static(&[4, 0, 0x00, 0x00, 0x00, 0x80]));
        let value = decode_big(&mut cursor, Tag::SmallBig).unwrap();
        assert_eq!(value.as_i64(), Some(2147483648));

        // -2147483649
        let mut cursor = ReadCursor::new(Bytes::from_static(&[4, 1, 0x01, 0x00, 0x00, 0x80]));
        let value = decode_big(&mut cursor, Tag::SmallBig).unwrap();
        assert_eq!(value.as_i64(), Some(-2147483649));
    }

    #[test]
    fn test_decode_large_big_keeps_padding() {
        let mut cursor = ReadCursor::new(Bytes::from_static(&[0, 0, 0, 3, 7, 0x05, 0x00, 0x00]));
        match decode_big(&mut cursor, Tag::LargeBig).unwrap() {
            Value::BigInt(big) => {
                assert_eq!(big.sign, Sign::Negative);
                assert_eq!(&big.magnitude[..], &[0x05, 0x00, 0x00]);
                assert_eq!(big.to_i64(), Some(-5));
            }
            other => panic!("expected bigint, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_big_truncated_magnitude() {
        let mut cursor = ReadCursor::new(Bytes::from_static(&[8, 0, 1, 2]));
        assert_eq!(
            decode_big(&mut cursor, Tag::SmallBig),
            Err(DecodeError::UnexpectedEof { needed: 8, remaining: 2 })
        );
    }
}
