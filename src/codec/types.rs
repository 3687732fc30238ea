use bytes::Bytes; // Import Bytes
use std::fmt;
use std::sync::Arc;

use crate::internal::error::EncodeError;

/// The version marker that opens every External Term Format stream.
pub const VERSION: u8 = 131;

/// Defines the byte representation of each term tag on the wire.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Tag {
    NewFloat = 70,
    NewPid = 88,
    NewPort = 89,
    NewerReference = 90,
    SmallInteger = 97,
    Integer = 98,
    Float = 99,
    Atom = 100,
    Reference = 101,
    Port = 102,
    Pid = 103,
    SmallTuple = 104,
    LargeTuple = 105,
    Nil = 106,
    String = 107,
    List = 108,
    Binary = 109,
    SmallBig = 110,
    LargeBig = 111,
    NewFunction = 112,
    Export = 113,
    NewReference = 114,
    SmallAtom = 115,
    Map = 116,
    AtomUtf8 = 118,
    SmallAtomUtf8 = 119,
    V4Port = 120,
}

impl Tag {
    /// Converts a byte into a Tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            70 => Some(Tag::NewFloat),
            88 => Some(Tag::NewPid),
            89 => Some(Tag::NewPort),
            90 => Some(Tag::NewerReference),
            97 => Some(Tag::SmallInteger),
            98 => Some(Tag::Integer),
            99 => Some(Tag::Float),
            100 => Some(Tag::Atom),
            101 => Some(Tag::Reference),
            102 => Some(Tag::Port),
            103 => Some(Tag::Pid),
            104 => Some(Tag::SmallTuple),
            105 => Some(Tag::LargeTuple),
            106 => Some(Tag::Nil),
            107 => Some(Tag::String),
            108 => Some(Tag::List),
            109 => Some(Tag::Binary),
            110 => Some(Tag::SmallBig),
            111 => Some(Tag::LargeBig),
            112 => Some(Tag::NewFunction),
            113 => Some(Tag::Export),
            114 => Some(Tag::NewReference),
            115 => Some(Tag::SmallAtom),
            116 => Some(Tag::Map),
            118 => Some(Tag::AtomUtf8),
            119 => Some(Tag::SmallAtomUtf8),
            120 => Some(Tag::V4Port),
            _ => None, // Unknown tag
        }
    }

    /// True for the four atom tags.
    pub fn is_atom(self) -> bool {
        matches!(self, Tag::Atom | Tag::SmallAtom | Tag::AtomUtf8 | Tag::SmallAtomUtf8)
    }
}

/// An atom: immutable, cheaply cloned UTF-8 text of at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Maximum number of characters in an atom.
    pub const MAX_CHARS: usize = 255;

    /// Creates an atom, rejecting text longer than [`Atom::MAX_CHARS`] characters.
    pub fn new(text: impl AsRef<str>) -> Result<Self, EncodeError> {
        let text = text.as_ref();
        let chars = text.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(EncodeError::AtomTooLong(chars));
        }
        Ok(Atom(Arc::from(text)))
    }

    // Callers guarantee the length invariant.
    pub(crate) fn from_shared(text: Arc<str>) -> Self {
        Atom(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both atoms share the same interned storage.
    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sign of a big integer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Wire sign byte: 0 is positive, anything else negative.
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Sign::Positive => 0,
            Sign::Negative => 1,
        }
    }
}

/// A big integer kept exactly as it travels: a sign and little-endian magnitude bytes.
///
/// No arithmetic is offered. The decoder stores magnitudes untouched, so they
/// may carry high zero bytes; [`BigInt::trimmed_magnitude`] gives the minimal form.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct BigInt {
    pub sign: Sign,
    pub magnitude: Bytes,
}

impl BigInt {
    pub fn new(sign: Sign, magnitude: impl Into<Bytes>) -> Self {
        BigInt { sign, magnitude: magnitude.into() }
    }

    /// Builds the minimal representation of a 128-bit integer.
    pub fn from_i128(value: i128) -> Self {
        let sign = if value < 0 { Sign::Negative } else { Sign::Positive };
        let bytes = value.unsigned_abs().to_le_bytes();
        let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        BigInt::new(sign, Bytes::copy_from_slice(&bytes[..len]))
    }

    /// Magnitude without high (trailing, little-endian) zero bytes.
    pub fn trimmed_magnitude(&self) -> &[u8] {
        let len = self.magnitude.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &self.magnitude[..len]
    }

    pub fn is_zero(&self) -> bool {
        self.trimmed_magnitude().is_empty()
    }

    /// The value as an `i128`, when it fits.
    pub fn to_i128(&self) -> Option<i128> {
        let digits = self.trimmed_magnitude();
        if digits.len() > 16 {
            return None;
        }
        let mut bytes = [0u8; 16];
        bytes[..digits.len()].copy_from_slice(digits);
        let magnitude = u128::from_le_bytes(bytes);
        match self.sign {
            Sign::Positive => i128::try_from(magnitude).ok(),
            Sign::Negative => {
                if magnitude == 1u128 << 127 {
                    Some(i128::MIN)
                } else {
                    i128::try_from(magnitude).ok().map(|m| -m)
                }
            }
        }
    }

    /// The value as an `i64`, when it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Equality of numeric value, ignoring zero padding and the sign of zero.
    pub fn numeric_eq(&self, other: &BigInt) -> bool {
        let (a, b) = (self.trimmed_magnitude(), other.trimmed_magnitude());
        a == b && (a.is_empty() || self.sign == other.sign)
    }
}

/// A list with an explicit tail. A `Nil` tail makes it a proper list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub elements: Vec<Value>,
    pub tail: Box<Value>,
}

impl List {
    pub fn proper(elements: Vec<Value>) -> Self {
        List { elements, tail: Box::new(Value::Nil) }
    }

    pub fn improper(elements: Vec<Value>, tail: Value) -> Self {
        List { elements, tail: Box::new(tail) }
    }

    pub fn is_proper(&self) -> bool {
        matches!(*self.tail, Value::Nil)
    }
}

/// A process identifier, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    pub node: Atom,
    pub id: u32,
    pub serial: u32,
    pub creation: u32,
}

/// A port identifier, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub node: Atom,
    pub id: u64,
    pub creation: u32,
}

/// A reference, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub node: Atom,
    pub creation: u32,
    pub ids: Vec<u32>,
}

/// An external fun (`fun Module:Function/Arity`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Export {
    pub module: Atom,
    pub function: Atom,
    pub arity: u8,
}

/// A local fun with its captured environment, kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFunction {
    pub arity: u8,
    pub uniq: [u8; 16],
    pub index: u32,
    pub module: Atom,
    pub old_index: Box<Value>,
    pub old_uniq: Box<Value>,
    pub pid: Pid,
    pub free_vars: Vec<Value>,
}

/// Any decoded External Term Format term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    SmallInteger(u8),
    Integer(i32),
    Float(f64),
    BigInt(BigInt),
    Atom(Atom),
    String(Bytes), // List of bytes 0-255 carried compactly
    Binary(Bytes),
    Tuple(Vec<Value>),
    List(List),
    Nil,
    Map(Vec<(Value, Value)>), // Stream order, duplicates kept
    Reference(Reference),
    Port(Port),
    Pid(Pid),
    Export(Export),
    NewFunction(Box<NewFunction>),
}

impl Value {
    pub fn atom(text: impl AsRef<str>) -> Result<Self, EncodeError> {
        Atom::new(text).map(Value::Atom)
    }

    /// The atom `nil`, which gateway protocols use as their null.
    pub fn nil_atom() -> Self {
        Value::Atom(Atom::from_shared(Arc::from("nil")))
    }

    pub fn tuple(elements: Vec<Value>) -> Self {
        Value::Tuple(elements)
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(List::proper(elements))
    }

    pub fn improper_list(elements: Vec<Value>, tail: Value) -> Self {
        Value::List(List::improper(elements, tail))
    }

    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(pairs)
    }

    pub fn binary(data: impl Into<Bytes>) -> Self {
        Value::Binary(data.into())
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// Reads the atoms `true` and `false` as booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_atom().map(Atom::as_str) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Any integer variant whose value fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Payload of a `String` or `Binary`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::String(data) | Value::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// True for the empty list and for the atoms `nil` and `null`.
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Atom(atom) => atom == "nil" || atom == "null",
            _ => false,
        }
    }

    pub(crate) fn to_i128(&self) -> Option<i128> {
        match self {
            Value::SmallInteger(v) => Some(i128::from(*v)),
            Value::Integer(v) => Some(i128::from(*v)),
            Value::BigInt(big) => big.to_i128(),
            _ => None,
        }
    }

    fn is_integer(&self) -> bool {
        matches!(self, Value::SmallInteger(_) | Value::Integer(_) | Value::BigInt(_))
    }

    fn is_list_like(&self) -> bool {
        matches!(self, Value::List(_) | Value::String(_) | Value::Nil)
    }

    /// Equality of meaning rather than of wire shape.
    ///
    /// Integers compare by value across `SmallInteger`, `Integer` and `BigInt`;
    /// a `String` equals the list of its bytes; `[1|[2]]` equals `[1,2]`. Map
    /// pairs compare in order.
    pub fn semantic_eq(&self, other: &Value) -> bool {
        if self.is_integer() && other.is_integer() {
            return match (self, other) {
                (Value::BigInt(a), Value::BigInt(b)) => a.numeric_eq(b),
                _ => matches!((self.to_i128(), other.to_i128()), (Some(a), Some(b)) if a == b),
            };
        }
        if self.is_list_like() && other.is_list_like() {
            return list_semantic_eq(self, other);
        }
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b || a.to_bits() == b.to_bits(),
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => all_semantic_eq(a, b),
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, va), (kb, vb))| ka.semantic_eq(kb) && va.semantic_eq(vb))
            }
            (Value::Reference(a), Value::Reference(b)) => a == b,
            (Value::Port(a), Value::Port(b)) => a == b,
            (Value::Pid(a), Value::Pid(b)) => a == b,
            (Value::Export(a), Value::Export(b)) => a == b,
            (Value::NewFunction(a), Value::NewFunction(b)) => {
                a.arity == b.arity
                    && a.uniq == b.uniq
                    && a.index == b.index
                    && a.module == b.module
                    && a.old_index.semantic_eq(&b.old_index)
                    && a.old_uniq.semantic_eq(&b.old_uniq)
                    && a.pid == b.pid
                    && all_semantic_eq(&a.free_vars, &b.free_vars)
            }
            _ => false,
        }
    }
}

fn all_semantic_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.semantic_eq(y))
}

// One element of a flattened list: either a term or a byte from a `String`.
enum ListItem<'a> {
    Term(&'a Value),
    Byte(u8),
}

// Flattens nested list tails and strings; returns the final non-list tail.
fn flatten_list<'a>(mut value: &'a Value, items: &mut Vec<ListItem<'a>>) -> Option<&'a Value> {
    loop {
        match value {
            Value::List(list) => {
                items.extend(list.elements.iter().map(ListItem::Term));
                value = list.tail.as_ref();
            }
            Value::String(data) => {
                items.extend(data.iter().map(|&b| ListItem::Byte(b)));
                return None;
            }
            Value::Nil => return None,
            other => return Some(other),
        }
    }
}

fn list_semantic_eq(a: &Value, b: &Value) -> bool {
    let (mut items_a, mut items_b) = (Vec::new(), Vec::new());
    let tail_a = flatten_list(a, &mut items_a);
    let tail_b = flatten_list(b, &mut items_b);
    if items_a.len() != items_b.len() {
        return false;
    }
    let items_match = items_a.iter().zip(&items_b).all(|pair| match pair {
        (ListItem::Term(x), ListItem::Term(y)) => x.semantic_eq(y),
        (ListItem::Byte(x), ListItem::Byte(y)) => x == y,
        (ListItem::Term(t), ListItem::Byte(byte)) | (ListItem::Byte(byte), ListItem::Term(t)) => {
            t.to_i128() == Some(i128::from(*byte))
        }
    });
    items_match
        && match (tail_a, tail_b) {
            (None, None) => true,
            (Some(x), Some(y)) => x.semantic_eq(y),
            _ => false,
        }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        let text = if value { "true" } else { "false" };
        Value::Atom(Atom::from_shared(Arc::from(text)))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::SmallInteger(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::from(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        if let Ok(small) = u8::try_from(value) {
            Value::SmallInteger(small)
        } else if let Ok(int) = i32::try_from(value) {
            Value::Integer(int)
        } else {
            Value::BigInt(BigInt::from_i128(i128::from(value)))
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::from(v),
            Err(_) => Value::BigInt(BigInt::from_i128(i128::from(value))),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Binary(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Binary(Bytes::from(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(value))
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Binary(value)
    }
}

impl From<Atom> for Value {
    fn from(value: Atom) -> Self {
        Value::Atom(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}
