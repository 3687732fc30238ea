use crate::codec::cursor::WriteCursor;
use crate::codec::encode::{encode_term, fit_u32};
use crate::codec::types::{List, Tag, Value};
use crate::internal::error::EncodeError;

/// Encodes a tuple, with the one-byte arity form up to 255 elements.
pub fn encode_tuple(writer: &mut WriteCursor<'_>, elements: &[Value], depth: usize) -> Result<(), EncodeError> {
    match u8::try_from(elements.len()) {
        Ok(arity) => {
            writer.write_u8(Tag::SmallTuple as u8);
            writer.write_u8(arity);
        }
        Err(_) => {
            let arity = fit_u32("tuple", elements.len())?;
            writer.write_u8(Tag::LargeTuple as u8);
            writer.write_u32(arity);
        }
    }
    for element in elements {
        encode_term(writer, element, depth + 1)?;
    }
    Ok(())
}

/// Encodes a list: count, elements, then the tail term.
///
/// A list with no elements is just its tail, so `[]` comes out as NIL.
pub fn encode_list(writer: &mut WriteCursor<'_>, list: &List, depth: usize) -> Result<(), EncodeError> {
    if list.elements.is_empty() {
        return encode_term(writer, &list.tail, depth);
    }
    let count = fit_u32("list", list.elements.len())?;
    writer.write_u8(Tag::List as u8);
    writer.write_u32(count);
    for element in &list.elements {
        encode_term(writer, element, depth + 1)?;
    }
    encode_term(writer, &list.tail, depth + 1)
}

/// Encodes a map with its pairs in stored order.
pub fn encode_map(writer: &mut WriteCursor<'_>, pairs: &[(Value, Value)], depth: usize) -> Result<(), EncodeError> {
    let count = fit_u32("map", pairs.len())?;
    writer.write_u8(Tag::Map as u8);
    writer.write_u32(count);
    for (key, value) in pairs {
        encode_term(writer, key, depth + 1)?;
        encode_term(writer, value, depth + 1)?;
    }
    Ok(())
}
