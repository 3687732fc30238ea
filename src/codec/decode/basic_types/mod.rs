// Leaf terms: numbers, atoms and byte payloads

pub mod atoms;
pub mod bigint;
pub mod bytes_and_string;
pub mod floats;
pub mod integers;
