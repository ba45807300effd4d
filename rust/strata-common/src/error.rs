use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

/// Coarse classification of an [`Error`], telling the caller how far the failure
/// reaches: a misconfigured reader, a corrupted file, or a failed release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The reader was constructed with arguments it cannot work with.
    /// It must not be used.
    Configuration,
    /// The file content or metadata is malformed. Reading of the current file
    /// should be aborted.
    Corruption,
    /// One or more owned resources failed to release.
    ResourceRelease,
    /// Protocol misuse, resource limits and I/O failures.
    Other,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    pub fn is_corruption(&self) -> bool {
        self.category() == ErrorCategory::Corruption
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn incompatible_type(
        column: impl Into<String>,
        type_name: impl Into<String>,
        column_kind: impl Into<String>,
    ) -> Error {
        ErrorKind::IncompatibleType {
            column: column.into(),
            type_name: type_name.into(),
            column_kind: column_kind.into(),
        }
        .into()
    }

    pub fn unsupported_encoding(column: impl Into<String>, encoding: impl Into<String>) -> Error {
        ErrorKind::UnsupportedEncoding {
            column: column.into(),
            encoding: encoding.into(),
        }
        .into()
    }

    pub fn corruption(column: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::Corruption {
            column: column.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn block_too_large(column: impl Into<String>, size: u64, limit: u64) -> Error {
        ErrorKind::BlockTooLarge {
            column: column.into(),
            size,
            limit,
        }
        .into()
    }

    pub fn memory_limit_exceeded(context: impl Into<String>, requested: u64, limit: u64) -> Error {
        ErrorKind::MemoryLimitExceeded {
            context: context.into(),
            requested,
            limit,
        }
        .into()
    }

    pub fn resource_release(resource: impl Into<String>, source: Error) -> Error {
        ErrorKind::ResourceRelease {
            resource: resource.into(),
            source: Box::new(source),
        }
        .into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("can not read SQL type {type_name} from stream '{column}' of type {column_kind}")]
    IncompatibleType {
        column: String,
        type_name: String,
        column_kind: String,
    },

    #[error("unsupported encoding {encoding} for column '{column}'")]
    UnsupportedEncoding { column: String, encoding: String },

    #[error("malformed data in column '{column}': {message}")]
    Corruption { column: String, message: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("values in column '{column}' take {size} bytes, exceeding the block limit of {limit}")]
    BlockTooLarge {
        column: String,
        size: u64,
        limit: u64,
    },

    #[error("memory limit exceeded in '{context}': requested {requested}, limit {limit}")]
    MemoryLimitExceeded {
        context: String,
        requested: u64,
        limit: u64,
    },

    #[error("failed to release '{resource}': {source}")]
    ResourceRelease {
        resource: String,
        source: Box<Error>,
    },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::InvalidArgument { .. } => ErrorCategory::Configuration,
            // The file declares a column kind the requested type cannot be read from.
            ErrorKind::IncompatibleType { .. }
            | ErrorKind::UnsupportedEncoding { .. }
            | ErrorKind::Corruption { .. }
            | ErrorKind::InvalidFormat { .. }
            | ErrorKind::BlockTooLarge { .. } => ErrorCategory::Corruption,
            ErrorKind::ResourceRelease { .. } => ErrorCategory::ResourceRelease,
            ErrorKind::InvalidOperation { .. }
            | ErrorKind::MemoryLimitExceeded { .. }
            | ErrorKind::Io { .. } => ErrorCategory::Other,
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(Error::incompatible_type("c", "bigint", "STRING").is_corruption());
        assert_eq!(
            Error::invalid_arg("max_block_bytes", "must be positive").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            Error::unsupported_encoding("c", "DWRF_DIRECT").category(),
            ErrorCategory::Corruption
        );
        assert!(Error::corruption("c", "negative length").is_corruption());
        assert!(Error::invalid_format("lengths", "truncated").is_corruption());
        assert!(!Error::invalid_operation("read_block").is_corruption());
        assert_eq!(
            Error::resource_release("dictionary", Error::invalid_operation("close")).category(),
            ErrorCategory::ResourceRelease
        );
    }

    #[test]
    fn test_messages_name_column_and_encoding() {
        let e = Error::unsupported_encoding("#3 name", "DWRF_DIRECT");
        let message = e.to_string();
        assert!(message.contains("#3 name"));
        assert!(message.contains("DWRF_DIRECT"));

        let e = Error::resource_release("direct", Error::corruption("c", "boom"));
        assert!(e.to_string().contains("boom"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
