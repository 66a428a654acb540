use std::time::Duration;

use thiserror::Error;

use crate::model::Kind;

/// Failure to convert a single raw token into a field's declared kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert '{token}' to {kind}")]
pub struct ConvertError {
    /// The raw token that did not convert.
    pub token: String,
    /// The kind the token was expected to convert into.
    pub kind: Kind,
}

impl ConvertError {
    /// Create a conversion error for `token` against `kind`.
    pub fn new(token: impl Into<String>, kind: Kind) -> Self {
        Self {
            token: token.into(),
            kind,
        }
    }
}

/// Default scalar conversion: the capability the binder falls back onto for
/// any field without a custom mapper or transform.
///
/// The built-in implementations form a closed set (strings, booleans,
/// integers, floats, durations).  Implement this trait on your own type to
/// plug a custom converter into the binder.
pub trait FromToken: Sized + 'static {
    /// The kind tag reported for this converter in descriptors and error messages.
    const KIND: Kind;

    /// Convert a raw token.
    fn from_token(token: &str) -> Result<Self, ConvertError>;
}

impl FromToken for String {
    const KIND: Kind = Kind::Str;

    fn from_token(token: &str) -> Result<Self, ConvertError> {
        Ok(token.to_string())
    }
}

impl FromToken for bool {
    const KIND: Kind = Kind::Bool;

    // Boolean literals are recognized case-insensitively ("false", "False", "FALSE").
    fn from_token(token: &str) -> Result<Self, ConvertError> {
        token
            .to_ascii_lowercase()
            .parse::<bool>()
            .map_err(|_| ConvertError::new(token, Self::KIND))
    }
}

macro_rules! from_str_impl {
    ($kind:expr => $($t:ty),+) => {
        $(
            impl FromToken for $t {
                const KIND: Kind = $kind;

                fn from_token(token: &str) -> Result<Self, ConvertError> {
                    token
                        .parse::<$t>()
                        .map_err(|_| ConvertError::new(token, Self::KIND))
                }
            }
        )+
    };
}

from_str_impl!(Kind::Int => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
from_str_impl!(Kind::Float => f32, f64);

impl FromToken for Duration {
    const KIND: Kind = Kind::Duration;

    fn from_token(token: &str) -> Result<Self, ConvertError> {
        humantime::parse_duration(token).map_err(|_| ConvertError::new(token, Self::KIND))
    }
}
