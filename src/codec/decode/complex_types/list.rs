use crate::codec::decode::complex_types::capacity_hint;
use crate::codec::decode::TermReader;
use crate::codec::types::{List, Value};
use crate::internal::error::DecodeError;

impl TermReader<'_> {
    /// Decodes a LIST payload: u32 count, the elements, then the tail term.
    ///
    /// The tail is read even for a zero count. A non-`Nil` tail is kept, which
    /// makes the list improper.
    pub(crate) fn decode_list(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let count = self.cursor.read_u32()? as usize;
        let mut elements = Vec::with_capacity(capacity_hint(count, self.cursor.remaining()));
        for _ in 0..count {
            elements.push(self.decode_term(depth + 1)?);
        }
        let tail = self.decode_term(depth + 1)?;
        Ok(Value::List(List::improper(elements, tail)))
    }
}
