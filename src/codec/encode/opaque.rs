use bytes::BytesMut;

use crate::codec::cursor::WriteCursor;
use crate::codec::encode::basic::encode_atom;
use crate::codec::encode::{encode_term, fit_u16, fit_u32};
use crate::codec::types::{Export, NewFunction, Pid, Port, Reference, Tag};
use crate::internal::error::EncodeError;

/// PID while the creation fits a byte, NEW_PID otherwise.
pub fn encode_pid(writer: &mut WriteCursor<'_>, pid: &Pid) -> Result<(), EncodeError> {
    let narrow = u8::try_from(pid.creation).ok();
    let tag = if narrow.is_some() { Tag::Pid } else { Tag::NewPid };
    writer.write_u8(tag as u8);
    encode_atom(writer, &pid.node)?;
    writer.write_u32(pid.id);
    writer.write_u32(pid.serial);
    match narrow {
        Some(creation) => writer.write_u8(creation),
        None => writer.write_u32(pid.creation),
    }
    Ok(())
}

pub fn encode_port(writer: &mut WriteCursor<'_>, port: &Port) -> Result<(), EncodeError> {
    match (u32::try_from(port.id), u8::try_from(port.creation)) {
        (Ok(id), Ok(creation)) => {
            writer.write_u8(Tag::Port as u8);
            encode_atom(writer, &port.node)?;
            writer.write_u32(id);
            writer.write_u8(creation);
        }
        (Ok(id), Err(_)) => {
            writer.write_u8(Tag::NewPort as u8);
            encode_atom(writer, &port.node)?;
            writer.write_u32(id);
            writer.write_u32(port.creation);
        }
        (Err(_), _) => {
            writer.write_u8(Tag::V4Port as u8);
            encode_atom(writer, &port.node)?;
            writer.write_u64(port.id);
            writer.write_u32(port.creation);
        }
    }
    Ok(())
}

/// NEW_REFERENCE while the creation fits a byte, NEWER_REFERENCE otherwise.
/// The single-id REFERENCE layout is never written.
pub fn encode_reference(writer: &mut WriteCursor<'_>, reference: &Reference) -> Result<(), EncodeError> {
    let count = fit_u16("reference id", reference.ids.len())?;
    let narrow = u8::try_from(reference.creation).ok();
    let tag = if narrow.is_some() { Tag::NewReference } else { Tag::NewerReference };
    writer.write_u8(tag as u8);
    writer.write_u16(count);
    encode_atom(writer, &reference.node)?;
    match narrow {
        Some(creation) => writer.write_u8(creation),
        None => writer.write_u32(reference.creation),
    }
    for &id in &reference.ids {
        writer.write_u32(id);
    }
    Ok(())
}

pub fn encode_export(writer: &mut WriteCursor<'_>, export: &Export) -> Result<(), EncodeError> {
    writer.write_u8(Tag::Export as u8);
    encode_atom(writer, &export.module)?;
    encode_atom(writer, &export.function)?;
    writer.write_u8(Tag::SmallInteger as u8);
    writer.write_u8(export.arity);
    Ok(())
}

/// Encodes a local fun. The body is staged in its own buffer so the leading
/// size field can be filled in.
pub fn encode_new_function(writer: &mut WriteCursor<'_>, fun: &NewFunction, depth: usize) -> Result<(), EncodeError> {
    let free_count = fit_u32("free variable", fun.free_vars.len())?;

    let mut body = BytesMut::new();
    {
        let mut inner = WriteCursor::new(&mut body);
        inner.write_u8(fun.arity);
        inner.write_bytes(&fun.uniq);
        inner.write_u32(fun.index);
        inner.write_u32(free_count);
        encode_atom(&mut inner, &fun.module)?;
        encode_term(&mut inner, &fun.old_index, depth + 1)?;
        encode_term(&mut inner, &fun.old_uniq, depth + 1)?;
        encode_pid(&mut inner, &fun.pid)?;
        for var in &fun.free_vars {
            encode_term(&mut inner, var, depth + 1)?;
        }
    }

    // The size field counts itself.
    let size = fit_u32("function", body.len() + 4)?;
    writer.write_u8(Tag::NewFunction as u8);
    writer.write_u32(size);
    writer.write_bytes(&body);
    Ok(())
}
