use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Display for LogSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Debug => write!(f, "DEBUG"),
            LogSeverity::Info => write!(f, "INFO"),
            LogSeverity::Warning => write!(f, "WARNING"),
            LogSeverity::Error => write!(f, "ERROR"),
            LogSeverity::Fatal => write!(f, "FATAL"),
        }
    }
}

impl FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogSeverity::Debug),
            "INFO" => Ok(LogSeverity::Info),
            "WARN" | "WARNING" => Ok(LogSeverity::Warning),
            "ERROR" => Ok(LogSeverity::Error),
            "FATAL" => Ok(LogSeverity::Fatal),
            other => Err(format!("unknown log severity '{}'", other)),
        }
    }
}
