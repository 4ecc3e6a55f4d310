use std::borrow::Cow;
use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested tool is not registered.
    UnknownTool,
    /// The input provided to the tool does not match its schema.
    InvalidInput,
    /// The tool backend could not be reached.
    Transport,
    /// The tool backend answered with a non-2xx status.
    BadStatus,
    /// The tool backend answered without a usable `result` field.
    MalformedResponse,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownTool => write!(f, "Unknown tool"),
            ErrorKind::InvalidInput => write!(f, "Invalid input"),
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::BadStatus => write!(f, "Bad status"),
            ErrorKind::MalformedResponse => write!(f, "Malformed response"),
        }
    }
}

/// Describes a tool call error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
    status: Option<u16>,
}

impl Error {
    #[inline]
    fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            reason: None,
            status: None,
        }
    }

    /// Creates a new error with the `UnknownTool` kind.
    #[inline]
    pub fn unknown_tool() -> Self {
        Self::with_kind(ErrorKind::UnknownTool)
    }

    /// Creates a new error with the `InvalidInput` kind.
    #[inline]
    pub fn invalid_input() -> Self {
        Self::with_kind(ErrorKind::InvalidInput)
    }

    /// Creates a new error with the `Transport` kind.
    #[inline]
    pub fn transport() -> Self {
        Self::with_kind(ErrorKind::Transport)
    }

    /// Creates a new error with the `BadStatus` kind.
    #[inline]
    pub fn bad_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::with_kind(ErrorKind::BadStatus)
        }
    }

    /// Creates a new error with the `MalformedResponse` kind.
    #[inline]
    pub fn malformed_response() -> Self {
        Self::with_kind(ErrorKind::MalformedResponse)
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            reason: Some(reason.into()),
            ..self
        }
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status the backend answered with, if any.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, self.status) {
            (Some(reason), Some(status)) => {
                write!(f, "{} ({status}): {reason}", self.kind)
            }
            (Some(reason), None) => write!(f, "{}: {reason}", self.kind),
            (None, Some(status)) => write!(f, "{} ({status})", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

/// An error raised while assembling a [`ToolRegistry`].
///
/// [`ToolRegistry`]: super::ToolRegistry
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors, or two routes, share a name.
    DuplicateName(String),
    /// A descriptor has no matching route.
    MissingRoute(String),
    /// A route has no matching descriptor.
    MissingDescriptor(String),
    /// A descriptor's input schema could not be compiled.
    InvalidSchema {
        /// The tool the schema belongs to.
        name: String,
        /// Why the schema was rejected.
        reason: String,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => {
                write!(f, "tool `{name}` is registered more than once")
            }
            RegistryError::MissingRoute(name) => {
                write!(f, "tool `{name}` has no route")
            }
            RegistryError::MissingDescriptor(name) => {
                write!(f, "route `{name}` has no tool descriptor")
            }
            RegistryError::InvalidSchema { name, reason } => {
                write!(f, "tool `{name}` has an invalid input schema: {reason}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
