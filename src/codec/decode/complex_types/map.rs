use crate::codec::decode::complex_types::capacity_hint;
use crate::codec::decode::TermReader;
use crate::codec::types::Value;
use crate::internal::error::DecodeError;

impl TermReader<'_> {
    /// Decodes a MAP payload into pairs, in stream order. Duplicate keys are kept.
    pub(crate) fn decode_map(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let count = self.cursor.read_u32()? as usize;
        // Each pair needs at least two bytes.
        let mut pairs = Vec::with_capacity(capacity_hint(count, self.cursor.remaining() / 2));
        for _ in 0..count {
            let key = self.decode_term(depth + 1)?;
            let value = self.decode_term(depth + 1)?;
            pairs.push((key, value));
        }
        Ok(Value::Map(pairs))
    }
}
