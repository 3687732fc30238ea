use crate::codec::cursor::ReadCursor;
use crate::codec::types::Value;
use crate::internal::error::DecodeError;

/// Decodes the payload of a SMALL_INTEGER term: one unsigned byte.
pub fn decode_small_integer(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    Ok(Value::SmallInteger(cursor.read_u8()?))
}

/// Decodes the payload of an INTEGER term: a big-endian `i32`.
pub fn decode_integer(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    Ok(Value::Integer(cursor.read_i32()?))
}
