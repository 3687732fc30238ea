use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::decode::Decoder;
use crate::codec::types::Value;
use crate::internal::error::DecodeError;

/// Default cap on the bytes a single streamed term may occupy.
pub const DEFAULT_MAX_BUFFERED: usize = 64 * 1024 * 1024;

/// Pulls whole terms out of input that arrives in arbitrary chunks.
///
/// Each term on the stream carries its own version byte, the way consecutive
/// gateway frames do. A term split across chunks is retried once enough bytes
/// have been fed to get past the field that was short, so a large term fed in
/// small pieces is parsed a bounded number of times rather than once per chunk.
#[derive(Debug)]
pub struct StreamDecoder {
    decoder: Decoder,
    // Bytes already seen by a decode attempt, starting at a term boundary.
    pending: Bytes,
    // Bytes fed since the last attempt.
    incoming: BytesMut,
    // Buffered total below which another attempt cannot get further.
    wanted: usize,
    max_buffered: usize,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        StreamDecoder::new(Decoder::default())
    }
}

impl StreamDecoder {
    pub fn new(decoder: Decoder) -> Self {
        StreamDecoder {
            decoder,
            pending: Bytes::new(),
            incoming: BytesMut::new(),
            wanted: 0,
            max_buffered: DEFAULT_MAX_BUFFERED,
        }
    }

    /// Sets how many bytes one term may need before `next_term` gives up on it.
    pub fn with_max_buffered(mut self, limit: usize) -> Self {
        self.max_buffered = limit;
        self
    }

    /// Appends received bytes.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.incoming.extend_from_slice(chunk);
        trace!(received = chunk.len(), buffered = self.buffered(), "stream input buffered");
    }

    /// Bytes received but not yet part of a returned term.
    pub fn buffered(&self) -> usize {
        self.pending.len() + self.incoming.len()
    }

    /// Drops everything buffered.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.incoming.clear();
        self.wanted = 0;
    }

    /// Returns the next complete term, or `Ok(None)` when the buffered bytes
    /// end before one is complete.
    ///
    /// A term that needs more than the configured maximum fails with
    /// `FrameTooLarge`. That error and any other decode error discard the
    /// buffer: there is no way to find the start of the next term in a corrupt
    /// stream.
    pub fn next_term(&mut self) -> Result<Option<Value>, DecodeError> {
        let buffered = self.buffered();
        if buffered == 0 || buffered < self.wanted {
            return Ok(None);
        }
        self.join_incoming();

        match self.decoder.decode_prefix(self.pending.clone()) {
            Ok((value, consumed)) => {
                self.pending.advance(consumed);
                self.wanted = 0;
                trace!(consumed, remaining = self.buffered(), "stream term decoded");
                Ok(Some(value))
            }
            Err(DecodeError::UnexpectedEof { needed, remaining }) => {
                let wanted = self.pending.len() + needed.saturating_sub(remaining);
                if wanted > self.max_buffered {
                    let err = DecodeError::FrameTooLarge { needed: wanted, limit: self.max_buffered };
                    debug!(error = %err, discarded = self.buffered(), "stream term too large, buffer dropped");
                    self.clear();
                    return Err(err);
                }
                self.wanted = wanted;
                trace!(needed, remaining, wanted, "stream term incomplete");
                Ok(None)
            }
            Err(err) => {
                debug!(error = %err, discarded = self.buffered(), "stream decode failed, buffer dropped");
                self.clear();
                Err(err)
            }
        }
    }

    /// Moves fed bytes behind the pending ones. Only copies when a partial
    /// term is pending, which happens once per retry.
    fn join_incoming(&mut self) {
        if self.incoming.is_empty() {
            return;
        }
        if self.pending.is_empty() {
            self.pending = self.incoming.split().freeze();
            return;
        }
        let mut joined = BytesMut::with_capacity(self.pending.len() + self.incoming.len());
        joined.extend_from_slice(&self.pending);
        joined.extend_from_slice(&self.incoming);
        self.incoming.clear();
        self.pending = joined.freeze();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode::DecoderConfig;
    use crate::codec::encode::encode;

    fn sample_frames() -> (Value, Value, Vec<u8>) {
        let first = Value::map(vec![
            (Value::atom("op").unwrap(), Value::SmallInteger(10)),
            (Value::atom("d").unwrap(), Value::from("hello")),
        ]);
        let second = Value::list(vec![Value::from(1024i64), Value::from(2.5)]);
        let mut stream = encode(&first).unwrap().to_vec();
        stream.extend_from_slice(&encode(&second).unwrap());
        (first, second, stream)
    }

    fn binary_header(len: u32) -> Vec<u8> {
        let mut out = vec![131, 109];
        out.extend_from_slice(&len.to_be_bytes());
        out
    }

    #[test]
    fn test_stream_resumes_across_chunks() {
        let (first, second, stream) = sample_frames();
        let mut decoder = StreamDecoder::default();
        let mut terms = Vec::new();
        for chunk in stream.chunks(3) {
            decoder.feed(chunk);
            while let Some(term) = decoder.next_term().unwrap() {
                terms.push(term);
            }
        }
        assert_eq!(terms, vec![first, second]);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_stream_whole_input_at_once() {
        let (first, second, stream) = sample_frames();
        let mut decoder = StreamDecoder::default();
        decoder.feed(&stream);
        assert_eq!(decoder.next_term().unwrap(), Some(first));
        assert_eq!(decoder.next_term().unwrap(), Some(second));
        assert_eq!(decoder.next_term().unwrap(), None);
    }

    #[test]
    fn test_stream_incomplete_keeps_buffer() {
        let mut decoder = StreamDecoder::default();
        decoder.feed(&[131, 109, 0, 0, 0, 4, b'a']);
        assert_eq!(decoder.next_term().unwrap(), None);
        assert_eq!(decoder.buffered(), 7);
        decoder.feed(b"bcd");
        assert_eq!(decoder.next_term().unwrap(), Some(Value::from("abcd")));
    }

    #[test]
    fn test_stream_waits_for_short_field() {
        let mut decoder = StreamDecoder::default();
        let mut first = binary_header(1000);
        first.extend_from_slice(&[7; 10]);
        decoder.feed(&first);
        assert_eq!(decoder.next_term().unwrap(), None);
        assert_eq!(decoder.wanted, 1006);

        // Not enough yet: no new attempt, the fed bytes stay unjoined.
        decoder.feed(&[7; 500]);
        assert_eq!(decoder.next_term().unwrap(), None);
        assert_eq!(decoder.incoming.len(), 500);
        assert_eq!(decoder.buffered(), 516);

        decoder.feed(&[7; 490]);
        assert_eq!(decoder.next_term().unwrap(), Some(Value::Binary(Bytes::from(vec![7; 1000]))));
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.wanted, 0);
    }

    #[test]
    fn test_stream_rejects_oversized_term() {
        let mut decoder = StreamDecoder::default().with_max_buffered(1024);
        decoder.feed(&binary_header(1 << 20));
        assert_eq!(
            decoder.next_term(),
            Err(DecodeError::FrameTooLarge { needed: (1 << 20) + 6, limit: 1024 })
        );
        assert_eq!(decoder.buffered(), 0);

        decoder.feed(&[131, 97, 5]);
        assert_eq!(decoder.next_term().unwrap(), Some(Value::SmallInteger(5)));
    }

    #[test]
    fn test_stream_error_drops_buffer() {
        let mut decoder = StreamDecoder::default();
        decoder.feed(&[131, 200, 1, 2, 3]);
        assert_eq!(decoder.next_term(), Err(DecodeError::UnknownTag(200)));
        assert_eq!(decoder.buffered(), 0);

        decoder.feed(&[131, 97, 1]);
        assert_eq!(decoder.next_term().unwrap(), Some(Value::SmallInteger(1)));
    }

    #[test]
    fn test_stream_uses_decoder_config() {
        let shallow = Decoder::new(DecoderConfig::new().with_max_depth(1));
        let mut decoder = StreamDecoder::new(shallow);
        decoder.feed(&[131, 104, 1, 106]);
        assert_eq!(decoder.next_term(), Err(DecodeError::RecursionLimitExceeded(1)));
    }
}
