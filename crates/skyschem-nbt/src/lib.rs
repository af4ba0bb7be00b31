//! Typed binary tags and their stream encoding.
//!
//! A schematic file is one root tag, normally a [`Compound`], written as a kind
//! byte followed by the bare payload. List elements and compound values carry
//! their kind in the enclosing header instead of repeating it per value.

mod stream;
mod tag;

pub use stream::{
    decode, decode_any, encode, encode_gzip, read_tag, write_tag, MAX_DEPTH,
    MAX_INFLATED,
};
pub use tag::{Compound, Tag, TagKind, TagList};

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum TagError {
    /// The stream does not follow the tag format.
    Malformed(String),
    /// A value cannot be represented in the tag format.
    Encoding(String),
    Io(io::Error),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Malformed(msg) => write!(f, "Malformed tag stream: {}", msg),
            TagError::Encoding(msg) => write!(f, "Cannot encode tag: {}", msg),
            TagError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl Error for TagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TagError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TagError {
    fn from(err: io::Error) -> Self {
        TagError::Io(err)
    }
}
