/// Status of every emitter and writer operation that did not succeed.
///
/// `Io` is the only variant a well-behaved caller should expect at runtime: it
/// means the sink refused bytes or an element did not fit the formatting buffer.
/// The other variants report misuse of the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SvgError {
    #[error("missing required argument: {0}")]
    NullArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("write failed: {0}")]
    Io(String),
    #[error("invalid state: {0}")]
    State(&'static str),
}

impl SvgError {
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// True for errors caused by the caller rather than the sink.
    pub fn is_usage(&self) -> bool {
        !self.is_io()
    }
}

pub type SvgResult<T> = std::result::Result<T, SvgError>;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("XML text is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("failed to read XML source: {0}")]
    Source(#[from] std::io::Error),
}
