//! Protocol data types consumed and produced by the fee engine.

mod address;
mod log;
mod sibling;

pub use address::{address_to_word, hex_address, parse_address, Address, Hash};
pub use log::LogEntry;
pub use sibling::{Sibling, SiblingsByHeight};
