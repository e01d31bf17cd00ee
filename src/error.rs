use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The token does not name a stored analysis.
    UnknownToken(String),
    /// The stored analysis exists but cannot be used (unreadable, malformed,
    /// or missing the data a report needs).
    InvalidResult(String),
    /// Font files could not be loaded or parsed.
    Font(String),
    /// A report section failed; the document being built is discarded.
    Section {
        section: &'static str,
        message: String,
    },
    Pdf(String),
}

impl Error {
    /// True for failures caused by the token or the stored result rather
    /// than by the rendering itself.
    pub fn is_input_resolution(&self) -> bool {
        matches!(self, Error::UnknownToken(_) | Error::InvalidResult(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::UnknownToken(token) => write!(f, "unknown analysis token: {token}"),
            Error::InvalidResult(message) => write!(f, "unusable analysis result: {message}"),
            Error::Font(message) => write!(f, "font error: {message}"),
            Error::Section { section, message } => {
                write!(f, "failed to render section '{section}': {message}")
            }
            Error::Pdf(message) => write!(f, "PDF error: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}
