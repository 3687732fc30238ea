// Identifier and function records. Their fields are carried, never interpreted.

use crate::codec::decode::basic_types::atoms::decode_atom;
use crate::codec::decode::complex_types::capacity_hint;
use crate::codec::decode::TermReader;
use crate::codec::types::{Atom, Export, NewFunction, Pid, Port, Reference, Tag, Value};
use crate::internal::error::DecodeError;

impl TermReader<'_> {
    /// Reads a field that must be an atom term (tag byte included).
    fn decode_atom_field(&mut self) -> Result<Atom, DecodeError> {
        let tag_byte = self.cursor.read_u8()?;
        match Tag::from_byte(tag_byte) {
            Some(tag) if tag.is_atom() => decode_atom(&mut self.cursor, tag, self.config.atom_table.as_deref()),
            _ => Err(DecodeError::UnexpectedTag { expected: "atom", tag: tag_byte }),
        }
    }

    /// Reads a PID or NEW_PID payload. The tag has already been consumed.
    pub(crate) fn decode_pid(&mut self, tag: Tag) -> Result<Pid, DecodeError> {
        let node = self.decode_atom_field()?;
        let id = self.cursor.read_u32()?;
        let serial = self.cursor.read_u32()?;
        let creation = match tag {
            Tag::Pid => u32::from(self.cursor.read_u8()?),
            _ => self.cursor.read_u32()?,
        };
        Ok(Pid { node, id, serial, creation })
    }

    pub(crate) fn decode_port(&mut self, tag: Tag) -> Result<Value, DecodeError> {
        let node = self.decode_atom_field()?;
        let (id, creation) = match tag {
            Tag::Port => (u64::from(self.cursor.read_u32()?), u32::from(self.cursor.read_u8()?)),
            Tag::NewPort => (u64::from(self.cursor.read_u32()?), self.cursor.read_u32()?),
            _ => (self.cursor.read_u64()?, self.cursor.read_u32()?),
        };
        Ok(Value::Port(Port { node, id, creation }))
    }

    /// Reads any of the three reference layouts.
    ///
    /// The legacy layout puts its single id before the creation byte; the newer
    /// two lead with an id count and put the ids last.
    pub(crate) fn decode_reference(&mut self, tag: Tag) -> Result<Value, DecodeError> {
        if tag == Tag::Reference {
            let node = self.decode_atom_field()?;
            let id = self.cursor.read_u32()?;
            let creation = u32::from(self.cursor.read_u8()?);
            return Ok(Value::Reference(Reference { node, creation, ids: vec![id] }));
        }

        let count = usize::from(self.cursor.read_u16()?);
        let node = self.decode_atom_field()?;
        let creation = match tag {
            Tag::NewReference => u32::from(self.cursor.read_u8()?),
            _ => self.cursor.read_u32()?,
        };
        let mut ids = Vec::with_capacity(capacity_hint(count, self.cursor.remaining() / 4));
        for _ in 0..count {
            ids.push(self.cursor.read_u32()?);
        }
        Ok(Value::Reference(Reference { node, creation, ids }))
    }

    pub(crate) fn decode_export(&mut self) -> Result<Value, DecodeError> {
        let module = self.decode_atom_field()?;
        let function = self.decode_atom_field()?;
        let tag_byte = self.cursor.read_u8()?;
        if tag_byte != Tag::SmallInteger as u8 {
            return Err(DecodeError::UnexpectedTag { expected: "small integer", tag: tag_byte });
        }
        let arity = self.cursor.read_u8()?;
        Ok(Value::Export(Export { module, function, arity }))
    }

    /// Reads a NEW_FUNCTION payload and checks its declared size.
    ///
    /// The size counts every payload byte including the size field itself.
    pub(crate) fn decode_new_function(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let start = self.cursor.position();
        let declared = self.cursor.read_u32()?;
        let arity = self.cursor.read_u8()?;
        let uniq: [u8; 16] = self.cursor.read_array()?;
        let index = self.cursor.read_u32()?;
        let free_count = self.cursor.read_u32()? as usize;
        let module = self.decode_atom_field()?;
        let old_index = self.decode_term(depth + 1)?;
        let old_uniq = self.decode_term(depth + 1)?;

        let pid_tag = self.cursor.read_u8()?;
        let pid = match Tag::from_byte(pid_tag) {
            Some(tag @ (Tag::Pid | Tag::NewPid)) => self.decode_pid(tag)?,
            _ => return Err(DecodeError::UnexpectedTag { expected: "pid", tag: pid_tag }),
        };

        let mut free_vars = Vec::with_capacity(capacity_hint(free_count, self.cursor.remaining()));
        for _ in 0..free_count {
            free_vars.push(self.decode_term(depth + 1)?);
        }

        let actual = self.cursor.position() - start;
        if actual != declared as usize {
            return Err(DecodeError::InvalidFunctionSize { declared, actual });
        }

        Ok(Value::NewFunction(Box::new(NewFunction {
            arity,
            uniq,
            index,
            module,
            old_index: Box::new(old_index),
            old_uniq: Box::new(old_uniq),
            pid,
            free_vars,
        })))
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::decode::decode;
    use crate::codec::types::{Pid, Port, Reference, Value};
    use crate::internal::error::DecodeError;

    // SMALL_ATOM_UTF8 'n@h'
    const NODE: [u8; 5] = [119, 3, b'n', b'@', b'h'];

    fn term(tag: u8, parts: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![131, tag];
        for part in parts {
            out.extend_from_slice(part);
        }
        out
    }

    fn node() -> crate::codec::types::Atom {
        crate::codec::types::Atom::new("n@h").unwrap()
    }

    #[test]
    fn test_decode_pids() {
        let legacy = term(103, &[&NODE, &[0, 0, 0, 42], &[0, 0, 0, 7], &[3]]);
        assert_eq!(
            decode(&legacy).unwrap(),
            Value::Pid(Pid { node: node(), id: 42, serial: 7, creation: 3 })
        );

        let new = term(88, &[&NODE, &[0, 0, 0, 42], &[0, 0, 0, 7], &[0, 1, 0, 0]]);
        assert_eq!(
            decode(&new).unwrap(),
            Value::Pid(Pid { node: node(), id: 42, serial: 7, creation: 65536 })
        );
    }

    #[test]
    fn test_decode_ports() {
        let legacy = term(102, &[&NODE, &[0, 0, 0, 9], &[1]]);
        assert_eq!(decode(&legacy).unwrap(), Value::Port(Port { node: node(), id: 9, creation: 1 }));

        let new = term(89, &[&NODE, &[0, 0, 0, 9], &[0, 0, 1, 0]]);
        assert_eq!(decode(&new).unwrap(), Value::Port(Port { node: node(), id: 9, creation: 256 }));

        let v4 = term(120, &[&NODE, &[0, 0, 0, 1, 0, 0, 0, 0], &[0, 0, 0, 2]]);
        assert_eq!(
            decode(&v4).unwrap(),
            Value::Port(Port { node: node(), id: 1 << 32, creation: 2 })
        );
    }

    #[test]
    fn test_decode_references() {
        let legacy = term(101, &[&NODE, &[0, 0, 0, 5], &[2]]);
        assert_eq!(
            decode(&legacy).unwrap(),
            Value::Reference(Reference { node: node(), creation: 2, ids: vec![5] })
        );

        let new = term(114, &[&[0, 2], &NODE, &[1], &[0, 0, 0, 1, 0, 0, 0, 2]]);
        assert_eq!(
            decode(&new).unwrap(),
            Value::Reference(Reference { node: node(), creation: 1, ids: vec![1, 2] })
        );

        let newer = term(90, &[&[0, 1], &NODE, &[0, 0, 1, 0], &[0, 0, 0, 3]]);
        assert_eq!(
            decode(&newer).unwrap(),
            Value::Reference(Reference { node: node(), creation: 256, ids: vec![3] })
        );
    }

    #[test]
    fn test_decode_node_must_be_atom() {
        let bad = term(103, &[&[97, 1], &[0, 0, 0, 42], &[0, 0, 0, 7], &[3]]);
        assert_eq!(
            decode(&bad),
            Err(DecodeError::UnexpectedTag { expected: "atom", tag: 97 })
        );
    }

    #[test]
    fn test_decode_export() {
        // fun lists:map/2, with Latin-1 atoms
        let data = term(113, &[&[100, 0, 5], b"lists", &[115, 3], b"map", &[97, 2]]);
        match decode(&data).unwrap() {
            Value::Export(export) => {
                assert_eq!(export.module, "lists");
                assert_eq!(export.function, "map");
                assert_eq!(export.arity, 2);
            }
            other => panic!("expected export, got {:?}", other),
        }

        let bad_arity = term(113, &[&[115, 1, b'm'], &[115, 1, b'f'], &[98, 0, 0, 0, 2]]);
        assert_eq!(
            decode(&bad_arity),
            Err(DecodeError::UnexpectedTag { expected: "small integer", tag: 98 })
        );
    }

    fn new_function_body(free_vars: &[&[u8]]) -> Vec<u8> {
        let mut body = vec![1]; // arity
        body.extend_from_slice(&[0xab; 16]); // uniq
        body.extend_from_slice(&[0, 0, 0, 4]); // index
        body.extend_from_slice(&(free_vars.len() as u32).to_be_bytes());
        body.extend_from_slice(&[119, 1, b'm']); // module
        body.extend_from_slice(&[97, 4]); // old index
        body.extend_from_slice(&[98, 0, 1, 0, 0]); // old uniq
        body.extend_from_slice(&[103]);
        body.extend_from_slice(&NODE);
        body.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0]);
        for var in free_vars {
            body.extend_from_slice(var);
        }
        body
    }

    #[test]
    fn test_decode_new_function() {
        let body = new_function_body(&[&[97, 10], &[106]]);
        let size = (body.len() + 4) as u32;
        let data = term(112, &[&size.to_be_bytes(), &body]);

        match decode(&data).unwrap() {
            Value::NewFunction(fun) => {
                assert_eq!(fun.arity, 1);
                assert_eq!(fun.uniq, [0xab; 16]);
                assert_eq!(fun.index, 4);
                assert_eq!(fun.module, "m");
                assert_eq!(*fun.old_index, Value::SmallInteger(4));
                assert_eq!(*fun.old_uniq, Value::Integer(65536));
                assert_eq!(fun.pid.id, 1);
                assert_eq!(fun.free_vars, vec![Value::SmallInteger(10), Value::Nil]);
            }
            other => panic!("expected fun, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_new_function_size_mismatch() {
        let body = new_function_body(&[]);
        let actual = body.len() + 4;
        let data = term(112, &[&(actual as u32 + 1).to_be_bytes(), &body]);
        assert_eq!(
            decode(&data),
            Err(DecodeError::InvalidFunctionSize { declared: actual as u32 + 1, actual })
        );
    }
}
