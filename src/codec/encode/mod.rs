// Encode module for the External Term Format

pub mod basic;
pub mod complex;
pub mod opaque;

use bytes::{Bytes, BytesMut};

use crate::codec::cursor::WriteCursor;
use crate::codec::decode::DEFAULT_MAX_DEPTH;
use crate::codec::types::{Value, VERSION};
use crate::internal::error::EncodeError;

/// Encodes `value` as a version-tagged term, choosing the most compact tag
/// for each node.
pub fn encode(value: &Value) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::new();
    encode_into(value, &mut buf)?;
    Ok(buf.freeze())
}

/// Appends the version-tagged encoding of `value` to `buf`.
///
/// Terms nested `DEFAULT_MAX_DEPTH` composites deep or more are refused, so
/// everything written here decodes with the default settings. On error `buf`
/// is left exactly as it was.
pub fn encode_into(value: &Value, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let start = buf.len();
    let mut writer = WriteCursor::new(buf);
    writer.write_u8(VERSION);
    let result = encode_term(&mut writer, value, 0);
    if result.is_err() {
        buf.truncate(start);
    }
    result
}

/// Reusable encoder. Keeps its output buffer between calls so a steady
/// stream of similar terms stops reallocating.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Encoder { buf: BytesMut::with_capacity(capacity) }
    }

    pub fn encode(&mut self, value: &Value) -> Result<Bytes, EncodeError> {
        encode_into(value, &mut self.buf)?;
        Ok(self.buf.split().freeze())
    }
}

/// Encodes one term, tag byte first, without the version marker. `depth`
/// counts the composites enclosing it, as the decoder counts them.
pub(crate) fn encode_term(writer: &mut WriteCursor<'_>, value: &Value, depth: usize) -> Result<(), EncodeError> {
    if depth >= DEFAULT_MAX_DEPTH {
        return Err(EncodeError::RecursionLimitExceeded(DEFAULT_MAX_DEPTH));
    }
    match value {
        Value::SmallInteger(v) => {
            basic::encode_integer(writer, i64::from(*v));
            Ok(())
        }
        Value::Integer(v) => {
            basic::encode_integer(writer, i64::from(*v));
            Ok(())
        }
        Value::BigInt(big) => basic::encode_bigint(writer, big),
        Value::Float(v) => {
            basic::encode_float(writer, *v);
            Ok(())
        }
        Value::Atom(atom) => basic::encode_atom(writer, atom),
        Value::String(data) => basic::encode_string(writer, data),
        Value::Binary(data) => basic::encode_binary(writer, data),
        Value::Nil => {
            basic::encode_nil(writer);
            Ok(())
        }
        Value::Tuple(elements) => complex::encode_tuple(writer, elements, depth),
        Value::List(list) => complex::encode_list(writer, list, depth),
        Value::Map(pairs) => complex::encode_map(writer, pairs, depth),
        Value::Pid(pid) => opaque::encode_pid(writer, pid),
        Value::Port(port) => opaque::encode_port(writer, port),
        Value::Reference(reference) => opaque::encode_reference(writer, reference),
        Value::Export(export) => opaque::encode_export(writer, export),
        Value::NewFunction(fun) => opaque::encode_new_function(writer, fun, depth),
    }
}

/// Checks that a length fits a `u16` wire field.
pub(crate) fn fit_u16(kind: &'static str, length: usize) -> Result<u16, EncodeError> {
    u16::try_from(length).map_err(|_| EncodeError::LengthOverflow { kind, length })
}

/// Checks that a length fits a `u32` wire field.
pub(crate) fn fit_u32(kind: &'static str, length: usize) -> Result<u32, EncodeError> {
    u32::try_from(length).map_err(|_| EncodeError::LengthOverflow { kind, length })
}
