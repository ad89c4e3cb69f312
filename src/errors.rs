//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for Staccato.
pub type Result<T, E = StaccatoError> = std::result::Result<T, E>;

/// The error type for Staccato.
#[derive(Debug)]
pub enum StaccatoError {
    /// The error variant for [`InvalidArgumentError`].
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`InvalidFormatError`].
    InvalidFormat(InvalidFormatError),

    /// A binary dictionary is broken: bad magic, unexpected version, or an
    /// out-of-range offset.
    CorruptDictionary(String),

    /// A string or description exceeds the limits of the on-disk format.
    Overflow(String),

    /// The lattice is disconnected: no lexicon match and no OOV candidate at
    /// the reported byte offset.
    NoMorpheme(usize),

    /// A plugin misses required configuration.
    Config(String),

    /// An attempt to load more user dictionaries than the word-ID space can
    /// address.
    TooManyDictionaries,

    /// The error variant for [`TryFromIntError`](std::num::TryFromIntError).
    TryFromInt(std::num::TryFromIntError),

    /// The error variant for [`ParseIntError`](std::num::ParseIntError).
    ParseInt(std::num::ParseIntError),

    /// The error variant for [`csv::Error`].
    Csv(csv::Error),

    /// The error variant for [`std::io::Error`].
    StdIo(std::io::Error),
}

impl StaccatoError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(file: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            file,
            msg: msg.into(),
        })
    }

    pub(crate) fn corrupt_dictionary<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::CorruptDictionary(msg.into())
    }

    pub(crate) fn overflow<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Overflow(msg.into())
    }

    pub(crate) fn config<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Config(msg.into())
    }
}

impl fmt::Display for StaccatoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidFormat(e) => e.fmt(f),
            Self::CorruptDictionary(msg) => write!(f, "CorruptDictionary: {msg}"),
            Self::Overflow(msg) => write!(f, "Overflow: {msg}"),
            Self::NoMorpheme(i) => write!(f, "NoMorpheme: there is no morpheme at byte {i}"),
            Self::Config(msg) => write!(f, "ConfigError: {msg}"),
            Self::TooManyDictionaries => write!(f, "TooManyDictionaries"),
            Self::TryFromInt(e) => e.fmt(f),
            Self::ParseInt(e) => e.fmt(f),
            Self::Csv(e) => e.fmt(f),
            Self::StdIo(e) => e.fmt(f),
        }
    }
}

impl Error for StaccatoError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a text resource such as `char.def` or a lexicon CSV is
/// malformed.
#[derive(Debug)]
pub struct InvalidFormatError {
    /// Name of the resource.
    pub(crate) file: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.file, self.msg)
    }
}

impl Error for InvalidFormatError {}

impl From<std::num::TryFromIntError> for StaccatoError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for StaccatoError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<csv::Error> for StaccatoError {
    fn from(error: csv::Error) -> Self {
        Self::Csv(error)
    }
}

impl From<std::io::Error> for StaccatoError {
    fn from(error: std::io::Error) -> Self {
        Self::StdIo(error)
    }
}
