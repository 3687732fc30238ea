// Decode module for the External Term Format

pub mod basic_types;
pub mod complex_types;
pub mod opaque;

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::atom_table::AtomTable;
use crate::codec::cursor::ReadCursor;
use crate::codec::types::{Tag, Value, VERSION};
use crate::internal::error::DecodeError;

/// Default nesting limit for composite terms.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Settings that shape a decode call.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Deepest nesting accepted before failing with `RecursionLimitExceeded`.
    pub max_depth: usize,
    /// Table used to intern atom text, if any.
    pub atom_table: Option<Arc<AtomTable>>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            atom_table: None,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_atom_table(mut self, table: Arc<AtomTable>) -> Self {
        self.atom_table = Some(table);
        self
    }

    /// Interns atoms through [`AtomTable::global`].
    pub fn with_global_atom_table(self) -> Self {
        self.with_atom_table(AtomTable::global())
    }
}

/// Decodes version-tagged terms. Holds only configuration, so one decoder can
/// serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a buffer holding exactly one version-tagged term.
    ///
    /// `String` and `Binary` payloads in the result share `data`'s storage.
    pub fn decode(&self, data: Bytes) -> Result<Value, DecodeError> {
        let total = data.len();
        let (value, consumed) = self.decode_prefix(data)?;
        if consumed != total {
            return Err(DecodeError::TrailingBytes(total - consumed));
        }
        Ok(value)
    }

    /// Decodes one version-tagged term from the front of `data`.
    /// Returns the term and the number of bytes it occupied.
    pub fn decode_prefix(&self, data: Bytes) -> Result<(Value, usize), DecodeError> {
        let mut reader = TermReader {
            cursor: ReadCursor::new(data),
            config: &self.config,
        };
        let version = reader.cursor.read_u8()?;
        if version != VERSION {
            return Err(DecodeError::InvalidVersion(version));
        }
        let value = reader.decode_term(0)?;
        Ok((value, reader.cursor.position()))
    }
}

/// Decodes a buffer holding exactly one version-tagged term, with default settings.
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    Decoder::default().decode(Bytes::copy_from_slice(data))
}

/// Cursor plus settings for one decode call.
pub(crate) struct TermReader<'a> {
    pub(crate) cursor: ReadCursor,
    pub(crate) config: &'a DecoderConfig,
}

impl TermReader<'_> {
    /// Decodes one term. `depth` counts the composites enclosing it.
    pub(crate) fn decode_term(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth >= self.config.max_depth {
            return Err(DecodeError::RecursionLimitExceeded(self.config.max_depth));
        }
        let tag_byte = self.cursor.read_u8()?;
        let tag = Tag::from_byte(tag_byte).ok_or(DecodeError::UnknownTag(tag_byte))?;
        let cursor = &mut self.cursor;

        match tag {
            Tag::SmallInteger => basic_types::integers::decode_small_integer(cursor),
            Tag::Integer => basic_types::integers::decode_integer(cursor),
            Tag::Float => basic_types::floats::decode_float(cursor),
            Tag::NewFloat => basic_types::floats::decode_new_float(cursor),
            Tag::SmallBig | Tag::LargeBig => basic_types::bigint::decode_big(cursor, tag),
            Tag::Atom | Tag::SmallAtom | Tag::AtomUtf8 | Tag::SmallAtomUtf8 => {
                let atom = basic_types::atoms::decode_atom(cursor, tag, self.config.atom_table.as_deref())?;
                Ok(Value::Atom(atom))
            }
            Tag::String => basic_types::bytes_and_string::decode_string(cursor),
            Tag::Binary => basic_types::bytes_and_string::decode_binary(cursor),
            Tag::Nil => Ok(Value::Nil),
            Tag::SmallTuple | Tag::LargeTuple => self.decode_tuple(tag, depth),
            Tag::List => self.decode_list(depth),
            Tag::Map => self.decode_map(depth),
            Tag::Pid | Tag::NewPid => Ok(Value::Pid(self.decode_pid(tag)?)),
            Tag::Port | Tag::NewPort | Tag::V4Port => self.decode_port(tag),
            Tag::Reference | Tag::NewReference | Tag::NewerReference => self.decode_reference(tag),
            Tag::Export => self.decode_export(),
            Tag::NewFunction => self.decode_new_function(depth),
        }
    }
}
