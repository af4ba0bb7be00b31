use skyschem_nbt::TagError;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SchematicError {
    /// The byte stream violates the tag format.
    Malformed(String),
    /// A value could not be written (over-long string, oversized region).
    Encoding(String),
    /// The file is not in the native format and no fallback loader accepted it.
    FallbackUnavailable(PathBuf),
    /// The tag tree decoded but is missing required schematic keys.
    InvalidSchematic(String),
    IoError(std::io::Error),
    /// A task never completed on the context it was handed to.
    Scheduling(String),
}

impl fmt::Display for SchematicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchematicError::Malformed(msg) => write!(f, "Malformed stream: {}", msg),
            SchematicError::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            SchematicError::FallbackUnavailable(path) => {
                write!(f, "No loader accepted {}", path.display())
            }
            SchematicError::InvalidSchematic(msg) => write!(f, "Invalid schematic: {}", msg),
            SchematicError::IoError(err) => write!(f, "IO error: {}", err),
            SchematicError::Scheduling(msg) => write!(f, "Scheduling error: {}", msg),
        }
    }
}

impl Error for SchematicError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchematicError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SchematicError {
    fn from(err: std::io::Error) -> Self {
        SchematicError::IoError(err)
    }
}

impl From<TagError> for SchematicError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Malformed(msg) => SchematicError::Malformed(msg),
            TagError::Encoding(msg) => SchematicError::Encoding(msg),
            TagError::Io(err) => SchematicError::IoError(err),
        }
    }
}
