use crate::codec::cursor::ReadCursor;
use crate::codec::types::Value;
use crate::internal::error::DecodeError;

/// Decodes a BINARY payload: u32 length then the bytes, sliced without copying.
pub fn decode_binary(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    let length = cursor.read_u32()? as usize;
    Ok(Value::Binary(cursor.read_exact(length)?))
}

/// Decodes a STRING payload: u16 length then the bytes.
///
/// The bytes are not text; they stand for a list of small integers.
pub fn decode_string(cursor: &mut ReadCursor) -> Result<Value, DecodeError> {
    let length = usize::from(cursor.read_u16()?);
    Ok(Value::String(cursor.read_exact(length)?))
}
