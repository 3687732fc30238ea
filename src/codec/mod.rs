// Codec module for the Erlang External Term Format

pub mod atom_table;
pub mod cursor;
pub mod decode;
pub mod display;
pub mod encode;
pub mod stream;
pub mod types;

pub use atom_table::AtomTable;
pub use decode::{decode, Decoder, DecoderConfig, DEFAULT_MAX_DEPTH};
pub use encode::{encode, encode_into, Encoder};
pub use stream::{StreamDecoder, DEFAULT_MAX_BUFFERED};
pub use types::{Atom, BigInt, Export, List, NewFunction, Pid, Port, Reference, Sign, Tag, Value, VERSION};
