/// The conversion kind of a field.
///
/// This is the closed set of built-in conversions; `Other` carries the type
/// name of a custom [`FromToken`](crate::FromToken) implementation.
/// The `Bool` kind additionally drives flag-presence semantics: naming a
/// boolean field on the command line implies `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A plain string field.
    Str,
    /// A boolean field; subject to flag-presence semantics.
    Bool,
    /// A signed or unsigned integer field.
    Int,
    /// A floating point field.
    Float,
    /// A `std::time::Duration` field.
    Duration,
    /// A field converted by a custom `FromToken` implementation.
    Other(&'static str),
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Str => write!(f, "string"),
            Kind::Bool => write!(f, "bool"),
            Kind::Int => write!(f, "integer"),
            Kind::Float => write!(f, "float"),
            Kind::Duration => write!(f, "duration"),
            Kind::Other(name) => write!(f, "{name}"),
        }
    }
}
