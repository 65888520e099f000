use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn unknown_term(term: impl Into<String>, position: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnknownTerm {
                term: term.into(),
                position: position.into(),
            }
            .into(),
        )
    }

    pub fn invalid_identifier(id: u32, position: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidIdentifier {
                id,
                position: position.into(),
            }
            .into(),
        )
    }

    pub fn corrupt_store(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::CorruptStore {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Load {
                path: path.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("unknown term '{term}' for position {position}")]
    UnknownTerm { term: String, position: String },

    #[error("identifier {id} is out of range for position {position}")]
    InvalidIdentifier { id: u32, position: String },

    #[error("inconsistent store: {message}")]
    CorruptStore { message: String },

    #[error("failed to load store '{path}': {message}")]
    Load { path: String, message: String },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
