// Internal support shared by the codec and its tools

pub mod error;
