// Prints terms the way an Erlang shell would

use std::fmt::{self, Write};

use bytes::Bytes;

use crate::codec::decode::DEFAULT_MAX_DEPTH;
use crate::codec::types::{Atom, BigInt, List, Sign, Value};

// Words that must be quoted to be read back as atoms.
const RESERVED_WORDS: &[&str] = &[
    "after", "and", "andalso", "band", "begin", "bnot", "bor", "bsl", "bsr", "bxor", "case", "catch", "cond", "div",
    "else", "end", "fun", "if", "let", "maybe", "not", "of", "or", "orelse", "receive", "rem", "try", "when", "xor",
];

impl fmt::Display for Value {
    /// Terms nested `DEFAULT_MAX_DEPTH` composites deep print as `...`, the
    /// way the shell elides deep terms.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, depth: usize) -> fmt::Result {
    if depth >= DEFAULT_MAX_DEPTH {
        return f.write_str("...");
    }
    match value {
        Value::SmallInteger(v) => write!(f, "{}", v),
        Value::Integer(v) => write!(f, "{}", v),
        Value::BigInt(big) => write_bigint(f, big),
        Value::Float(v) => write_float(f, *v),
        Value::Atom(atom) => write_atom(f, atom),
        Value::String(data) => write_string(f, data),
        Value::Binary(data) => write_binary(f, data),
        Value::Tuple(elements) => {
            f.write_char('{')?;
            write_separated(f, elements, depth + 1)?;
            f.write_char('}')
        }
        Value::List(list) => write_list(f, list, depth),
        Value::Nil => f.write_str("[]"),
        Value::Map(pairs) => {
            f.write_str("#{")?;
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write_value(f, key, depth + 1)?;
                f.write_str(" => ")?;
                write_value(f, value, depth + 1)?;
            }
            f.write_char('}')
        }
        Value::Pid(pid) => {
            f.write_str("#Pid<")?;
            write_atom(f, &pid.node)?;
            write!(f, ".{}.{}>", pid.id, pid.serial)
        }
        Value::Port(port) => {
            f.write_str("#Port<")?;
            write_atom(f, &port.node)?;
            write!(f, ".{}>", port.id)
        }
        Value::Reference(reference) => {
            f.write_str("#Ref<")?;
            write_atom(f, &reference.node)?;
            for id in &reference.ids {
                write!(f, ".{}", id)?;
            }
            f.write_char('>')
        }
        Value::Export(export) => {
            f.write_str("fun ")?;
            write_atom(f, &export.module)?;
            f.write_char(':')?;
            write_atom(f, &export.function)?;
            write!(f, "/{}", export.arity)
        }
        Value::NewFunction(fun) => {
            f.write_str("#Fun<")?;
            write_atom(f, &fun.module)?;
            write!(f, ".{}.", fun.index)?;
            write_value(f, &fun.old_uniq, depth + 1)?;
            f.write_char('>')
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, values: &[Value], depth: usize) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write_value(f, value, depth)?;
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &List, depth: usize) -> fmt::Result {
    if list.elements.is_empty() {
        return write_value(f, &list.tail, depth);
    }
    f.write_char('[')?;
    write_separated(f, &list.elements, depth + 1)?;
    if !list.is_proper() {
        f.write_char('|')?;
        write_value(f, &list.tail, depth + 1)?;
    }
    f.write_char(']')
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    // Debug output always keeps a fraction or exponent; Erlang wants the dot too.
    let text = format!("{:?}", value);
    match text.find('e') {
        Some(pos) if !text[..pos].contains('.') => write!(f, "{}.0{}", &text[..pos], &text[pos..]),
        _ => f.write_str(&text),
    }
}

fn write_atom(f: &mut fmt::Formatter<'_>, atom: &Atom) -> fmt::Result {
    let text = atom.as_str();
    if is_bare_atom(text) {
        return f.write_str(text);
    }
    f.write_char('\'')?;
    for c in text.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

fn is_bare_atom(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@') && !RESERVED_WORDS.contains(&text)
}

fn is_printable(data: &[u8]) -> bool {
    data.iter().all(|&b| (0x20..0x7f).contains(&b))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, data: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    for &b in data {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b => f.write_char(char::from(b))?,
        }
    }
    f.write_char('"')
}

fn write_byte_list(f: &mut fmt::Formatter<'_>, data: &[u8]) -> fmt::Result {
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{}", b)?;
    }
    Ok(())
}

fn write_string(f: &mut fmt::Formatter<'_>, data: &Bytes) -> fmt::Result {
    if data.is_empty() {
        return f.write_str("[]");
    }
    if is_printable(data) {
        return write_quoted(f, data);
    }
    f.write_char('[')?;
    write_byte_list(f, data)?;
    f.write_char(']')
}

fn write_binary(f: &mut fmt::Formatter<'_>, data: &Bytes) -> fmt::Result {
    f.write_str("<<")?;
    if !data.is_empty() && is_printable(data) {
        write_quoted(f, data)?;
    } else {
        write_byte_list(f, data)?;
    }
    f.write_str(">>")
}

fn write_bigint(f: &mut fmt::Formatter<'_>, big: &BigInt) -> fmt::Result {
    if let Some(v) = big.to_i128() {
        return write!(f, "{}", v);
    }
    if big.sign == Sign::Negative {
        f.write_char('-')?;
    }
    f.write_str(&magnitude_to_decimal(big.trimmed_magnitude()))
}

/// Renders a little-endian magnitude in base 10.
fn magnitude_to_decimal(le_bytes: &[u8]) -> String {
    // Most significant 32-bit limb first.
    let mut limbs: Vec<u32> = le_bytes
        .chunks(4)
        .rev()
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect();

    // Base 10^9 digits, least significant first.
    const CHUNK: u64 = 1_000_000_000;
    let mut digits = Vec::new();
    while limbs.iter().any(|&limb| limb != 0) {
        let mut rem = 0u64;
        for limb in limbs.iter_mut() {
            let current = (rem << 32) | u64::from(*limb);
            *limb = (current / CHUNK) as u32;
            rem = current % CHUNK;
        }
        digits.push(rem as u32);
    }

    match digits.split_last() {
        Some((most, rest)) => {
            let mut out = most.to_string();
            for digit in rest.iter().rev() {
                // Writing to a String cannot fail.
                let _ = write!(out, "{:09}", digit);
            }
            out
        }
        None => "0".to_string(),
    }
}
