use thiserror::Error;

/// Errors raised while building or serialising OSC packets.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EncodingError {
    #[error("OSC address pattern must start with '/': {0:?}")]
    InvalidAddress(String),
    #[error("String argument `{argument}` is {len} bytes, limit is {max}")]
    ArgumentTooLarge {
        argument: &'static str,
        len: usize,
        max: usize,
    },
    #[error("OSC strings cannot contain NUL bytes")]
    EmbeddedNul,
    #[error("OSC bundle has no elements")]
    EmptyBundle,
}

/// Errors raised while parsing OSC packets.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DecodeError {
    #[error("Insufficient data to parse OSC packet")]
    InsufficientData,
    #[error("OSC string is not NUL terminated")]
    UnterminatedString,
    #[error("OSC string is not valid UTF-8")]
    InvalidUtf8,
    #[error("Invalid OSC address pattern: {0:?}")]
    InvalidAddress(String),
    #[error("Missing OSC type tag string")]
    MissingTypeTags,
    #[error("Unsupported OSC type tag '{0}'")]
    UnsupportedTypeTag(char),
    #[error("Invalid bundle element size {0}")]
    InvalidElementSize(i32),
    #[error("{0} trailing bytes after OSC message")]
    TrailingBytes(usize),
}
