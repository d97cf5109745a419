use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum UnderlayError {
    Io(std::io::Error),
    Format(String),
    Encode(String),
    EmbedRead(PathBuf),
}

impl fmt::Display for UnderlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnderlayError::Io(err) => write!(f, "io error: {}", err),
            UnderlayError::Format(message) => write!(f, "format error: {}", message),
            UnderlayError::Encode(message) => {
                write!(f, "background image encode failed: {}", message)
            }
            UnderlayError::EmbedRead(path) => {
                write!(f, "cannot read background image {}", path.display())
            }
        }
    }
}

impl std::error::Error for UnderlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnderlayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UnderlayError {
    fn from(value: std::io::Error) -> Self {
        UnderlayError::Io(value)
    }
}
