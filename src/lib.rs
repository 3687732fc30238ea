// beamterm library entry point
// Erlang External Term Format: decoding, encoding and term printing

pub mod codec;
pub mod internal;

pub use codec::{
    decode, encode, encode_into, Atom, AtomTable, BigInt, Decoder, DecoderConfig, Encoder, List, StreamDecoder, Value,
};
pub use internal::error::{DecodeError, EncodeError, Error, Result};
