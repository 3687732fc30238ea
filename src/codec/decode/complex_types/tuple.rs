use crate::codec::decode::complex_types::capacity_hint;
use crate::codec::decode::TermReader;
use crate::codec::types::{Tag, Value};
use crate::internal::error::DecodeError;

impl TermReader<'_> {
    /// Decodes a SMALL_TUPLE or LARGE_TUPLE payload.
    pub(crate) fn decode_tuple(&mut self, tag: Tag, depth: usize) -> Result<Value, DecodeError> {
        let arity = match tag {
            Tag::SmallTuple => usize::from(self.cursor.read_u8()?),
            _ => self.cursor.read_u32()? as usize,
        };
        let mut elements = Vec::with_capacity(capacity_hint(arity, self.cursor.remaining()));
        for _ in 0..arity {
            elements.push(self.decode_term(depth + 1)?);
        }
        Ok(Value::Tuple(elements))
    }
}
