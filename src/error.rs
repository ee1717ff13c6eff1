//! Error types.
//!
//! Two shapes of failure exist in this crate:
//!
//! - Hard failures (bad configuration, unreadable model files, IO) are plain
//!   [`Result`]s carrying an [`Error`].
//! - Arithmetic and access failures degrade: the operation reports the error
//!   *and* hands back a well-defined fallback value. These return
//!   [`Checked<V>`], i.e. `Result<V, Degraded<V>>`, so callers can branch on
//!   success uniformly or collapse the result with [`Fallback::or_fallback`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operand sizes are incompatible.
    DimensionMismatch(String),
    /// A row, column, or element index is out of range.
    IndexOutOfBounds(String),
    InvalidConfig(String),
    /// A persisted model token stream does not match the expected layout.
    MalformedModel(String),
    MalformedMesh(String),
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
            Error::IndexOutOfBounds(msg) => write!(f, "index out of bounds: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::MalformedModel(msg) => write!(f, "malformed model: {msg}"),
            Error::MalformedMesh(msg) => write!(f, "malformed mesh: {msg}"),
            Error::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// A failed operation together with the value it degraded to.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded<V> {
    error: Error,
    fallback: V,
}

/// Result of an operation that degrades to a fallback value on failure.
pub type Checked<V> = std::result::Result<V, Degraded<V>>;

impl<V> Degraded<V> {
    #[inline]
    pub fn new(error: Error, fallback: V) -> Self {
        Self { error, fallback }
    }

    #[inline]
    pub fn error(&self) -> &Error {
        &self.error
    }

    #[inline]
    pub fn fallback(&self) -> &V {
        &self.fallback
    }

    #[inline]
    pub fn into_fallback(self) -> V {
        self.fallback
    }

    #[inline]
    pub fn into_parts(self) -> (Error, V) {
        (self.error, self.fallback)
    }
}

impl<V> fmt::Display for Degraded<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (degraded to fallback value)", self.error)
    }
}

impl<V: fmt::Debug> std::error::Error for Degraded<V> {}

impl<V> From<Degraded<V>> for Error {
    fn from(value: Degraded<V>) -> Self {
        value.error
    }
}

/// Collapse a [`Checked`] value, logging the error if the operation degraded.
pub trait Fallback<V> {
    fn or_fallback(self) -> V;
}

impl<V> Fallback<V> for Checked<V> {
    #[inline]
    fn or_fallback(self) -> V {
        match self {
            Ok(value) => value,
            Err(degraded) => {
                log::error!("{}", degraded.error);
                degraded.fallback
            }
        }
    }
}
