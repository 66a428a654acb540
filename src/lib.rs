//! `optbind` is a lenient, schema-driven command line option binder for Rust.
//!
//! Although other crates provide command line parser functionality, they prioritize different concerns than those we are interested in.
//! `optbind` binds a flat token sequence onto the fields of your own configuration type, and it attempts to prioritize the following design concerns:
//! * *Schema over reflection*:
//! You declare an explicit, ordered [`Schema`] of field descriptors once; there is no runtime discovery and no derive machinery.
//! * *Forgiving surface*:
//! `-`, `--`, and `/` prefixes are interchangeable, keys abbreviate down to a unique first letter, and unrecognized keys are dropped rather than rejected.
//! * *Domain sensitive binding*:
//! Per-field [`Mapper`]s take over conversion and validation where the defaults do not fit, including required-field enforcement and transforms applied before assignment.
//! * *Whole-picture diagnostics*:
//! Validation is a batch pass; every failing field is reported in a single aggregated error rather than just the first.
//!
//! # Usage
//! ```
//! use optbind::{Binder, Collection, Field, Schema};
//!
//! #[derive(Debug, Default)]
//! struct Config {
//!     names: Vec<String>,
//!     greet: bool,
//! }
//!
//! let schema = Schema::new()
//!     .field(Field::collection("Names", |config: &mut Config, value: String| {
//!         config.names.push(value);
//!     }))
//!     .field(Field::scalar("Greet", |config: &mut Config, value: bool| {
//!         config.greet = value;
//!     }));
//!
//! let binder = Binder::builder(schema)
//!     .mapper(
//!         Collection::new("Names", |config: &mut Config, value: String| {
//!             config.names.push(value);
//!         })
//!         .required(),
//!     )
//!     .alias("n", "Names")
//!     .alias("name", "Names")
//!     .build()
//!     .unwrap();
//!
//! let config = binder.parse(&["-n", "Max", "-n", "Tom", "-greet"]).unwrap();
//! assert_eq!(config.names, vec!["Max".to_string(), "Tom".to_string()]);
//! assert!(config.greet);
//! ```
//!
//! # Binding Semantics
//! `optbind` binds the token sequence according to the following set of rules.
//! * The maximal leading run of tokens that do not start with `-` or `/` binds positionally, in lockstep with the schema's declaration order.
//! Trailing fields keep their current value; trailing tokens beyond the field count are ignored.
//! * Every other token starting with `-` or `/` names a field, and pairs with the token immediately following it.
//! A key resolves through the alias table first, then by unique first-letter abbreviation, then by capitalize-first exact match; keys that resolve to nothing are dropped without error.
//! * Naming a boolean field implies `true`.
//! Only an explicit boolean literal in the following position overrides the implied value - another option token in that position leaves it at `true`.
//! * A field with a registered mapper always binds through the mapper: scalars are last-write-wins across repeated occurrences, collections accumulate one element per occurrence.
//! All other fields bind through the built-in converters (see [`FromToken`]).
//! * After binding, every mapper validates.
//! A required field that never received a value fails regardless of its validator predicate.
//! Failures abort the parse as one aggregated [`BindError::Validation`].
//!
//! Conversion failures are terminal: the parse aborts immediately with [`BindError::Conversion`] and no partially bound target is returned.
//!
//! # Features
//! * `tracing_debug`: emit `tracing` events when the resolver drops an unresolvable or ambiguous key.
#![deny(missing_docs)]
mod binder;
mod convert;
mod mapper;
mod model;
mod resolve;
mod schema;
mod tokens;

pub use binder::{BindError, Binder, BinderBuilder, ConfigError, ValidationFailure};
pub use convert::{ConvertError, FromToken};
pub use mapper::{BindContext, Collection, Mapper, Scalar, Validation};
pub use model::Kind;
pub use schema::{Field, Schema};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
