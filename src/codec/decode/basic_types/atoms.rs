use std::borrow::Cow;
use std::sync::Arc;

use crate::codec::atom_table::AtomTable;
use crate::codec::cursor::ReadCursor;
use crate::codec::types::{Atom, Tag};
use crate::internal::error::DecodeError;

/// Decodes the payload of any of the four atom tags.
///
/// Latin-1 tags map each byte to the code point of the same value, so both
/// encodings end up as the same UTF-8 text. When `table` is given the text is
/// interned through it.
pub fn decode_atom(cursor: &mut ReadCursor, tag: Tag, table: Option<&AtomTable>) -> Result<Atom, DecodeError> {
    let length = match tag {
        Tag::SmallAtom | Tag::SmallAtomUtf8 => usize::from(cursor.read_u8()?),
        _ => usize::from(cursor.read_u16()?),
    };
    let raw = cursor.read_exact(length)?;

    let text: Cow<'_, str> = match tag {
        Tag::Atom | Tag::SmallAtom => Cow::Owned(raw.iter().map(|&b| char::from(b)).collect()),
        _ => Cow::Borrowed(
            std::str::from_utf8(&raw).map_err(|e| DecodeError::MalformedAtom(format!("invalid UTF-8: {}", e)))?,
        ),
    };

    let chars = text.chars().count();
    if chars > Atom::MAX_CHARS {
        return Err(DecodeError::MalformedAtom(format!(
            "{} characters, the maximum is {}",
            chars,
            Atom::MAX_CHARS
        )));
    }

    Ok(match table {
        Some(table) => table.intern(&text),
        None => Atom::from_shared(Arc::from(text.as_ref())),
    })
}
