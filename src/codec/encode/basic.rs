use bytes::Bytes;

use crate::codec::cursor::WriteCursor;
use crate::codec::encode::{fit_u16, fit_u32};
use crate::codec::types::{Atom, BigInt, Tag};
use crate::internal::error::EncodeError;

/// Longest payload the STRING tag can carry.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Writes an integer with the smallest fixed-width tag that holds it.
pub fn encode_integer(writer: &mut WriteCursor<'_>, value: i64) {
    if let Ok(small) = u8::try_from(value) {
        writer.write_u8(Tag::SmallInteger as u8);
        writer.write_u8(small);
    } else if let Ok(int) = i32::try_from(value) {
        writer.write_u8(Tag::Integer as u8);
        writer.write_i32(int);
    } else {
        write_big(writer, &BigInt::from_i128(i128::from(value)));
    }
}

/// Writes a big integer, falling back to the integer tags when it fits an `i32`.
///
/// High zero bytes of the magnitude are dropped.
pub fn encode_bigint(writer: &mut WriteCursor<'_>, big: &BigInt) -> Result<(), EncodeError> {
    if let Some(v) = big.to_i128().and_then(|v| i32::try_from(v).ok()) {
        encode_integer(writer, i64::from(v));
        return Ok(());
    }
    let digits = big.trimmed_magnitude();
    if digits.len() > u8::MAX as usize {
        fit_u32("big integer", digits.len())?;
    }
    write_big(writer, big);
    Ok(())
}

// Callers have checked the magnitude fits a LARGE_BIG length field.
fn write_big(writer: &mut WriteCursor<'_>, big: &BigInt) {
    let digits = big.trimmed_magnitude();
    match u8::try_from(digits.len()) {
        Ok(len) => {
            writer.write_u8(Tag::SmallBig as u8);
            writer.write_u8(len);
        }
        Err(_) => {
            writer.write_u8(Tag::LargeBig as u8);
            writer.write_u32(digits.len() as u32);
        }
    }
    writer.write_u8(big.sign.to_byte());
    writer.write_bytes(digits);
}

pub fn encode_float(writer: &mut WriteCursor<'_>, value: f64) {
    writer.write_u8(Tag::NewFloat as u8);
    writer.write_f64(value);
}

/// Writes an atom as UTF-8, using the one-byte length form when it fits.
pub fn encode_atom(writer: &mut WriteCursor<'_>, atom: &Atom) -> Result<(), EncodeError> {
    let text = atom.as_str().as_bytes();
    match u8::try_from(text.len()) {
        Ok(len) => {
            writer.write_u8(Tag::SmallAtomUtf8 as u8);
            writer.write_u8(len);
        }
        Err(_) => {
            let len = fit_u16("atom", text.len())?;
            writer.write_u8(Tag::AtomUtf8 as u8);
            writer.write_u16(len);
        }
    }
    writer.write_bytes(text);
    Ok(())
}

/// Writes a byte string. Past [`MAX_STRING_LEN`] bytes it becomes an
/// equivalent proper list of small integers.
pub fn encode_string(writer: &mut WriteCursor<'_>, data: &Bytes) -> Result<(), EncodeError> {
    if data.len() <= MAX_STRING_LEN {
        writer.write_u8(Tag::String as u8);
        writer.write_u16(data.len() as u16);
        writer.write_bytes(data);
        return Ok(());
    }
    let count = fit_u32("string", data.len())?;
    writer.write_u8(Tag::List as u8);
    writer.write_u32(count);
    for &byte in data.iter() {
        writer.write_u8(Tag::SmallInteger as u8);
        writer.write_u8(byte);
    }
    encode_nil(writer);
    Ok(())
}

pub fn encode_binary(writer: &mut WriteCursor<'_>, data: &Bytes) -> Result<(), EncodeError> {
    let len = fit_u32("binary", data.len())?;
    writer.write_u8(Tag::Binary as u8);
    writer.write_u32(len);
    writer.write_bytes(data);
    Ok(())
}

pub fn encode_nil(writer: &mut WriteCursor<'_>) {
    writer.write_u8(Tag::Nil as u8);
}
