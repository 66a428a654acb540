use std::collections::HashMap;

use crate::convert::{ConvertError, FromToken};

/// Per-parse binding state: the has-been-set witnesses and occurrence
/// counts for every field bound through a mapper.
///
/// A fresh context is created for each parse call, which keeps mapper
/// instances stateless and safely reusable across calls.
#[derive(Debug, Default)]
pub struct BindContext {
    occurrences: HashMap<String, usize>,
}

impl BindContext {
    /// Record that `field` received one value.
    pub fn record(&mut self, field: &str) {
        *self.occurrences.entry(field.to_string()).or_insert(0) += 1;
    }

    /// The number of values `field` received during this parse.
    pub fn count(&self, field: &str) -> usize {
        self.occurrences.get(field).copied().unwrap_or(0)
    }

    /// Whether `field` received at least one value during this parse.
    pub fn is_set(&self, field: &str) -> bool {
        self.count(field) > 0
    }
}

/// Outcome of a single mapper's validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// The field validated.
    Pass,
    /// The field is required but never received a value.
    /// Takes precedence over any validator predicate.
    MissingRequired,
    /// The validator predicate rejected the bound value(s).
    Rejected,
}

/// Pluggable per-field binding and validation strategy, overriding default
/// conversion for its field.
///
/// Most uses are covered by the built-in [`Scalar`] and [`Collection`]
/// mappers; implement this trait directly for fully custom behaviour.
pub trait Mapper<T> {
    /// The canonical name of the field this mapper applies to.
    fn name(&self) -> &str;

    /// Bind one raw token onto the target.
    /// Called once per occurrence of the field on the command line.
    fn set(&self, target: &mut T, context: &mut BindContext, token: &str)
        -> Result<(), ConvertError>;

    /// Validate the fully bound target.
    /// Called exactly once per parse, after all binding completes.
    fn validate(&self, target: &T, context: &BindContext) -> Validation;
}

type Transform<V> = Box<dyn Fn(&str) -> Result<V, ConvertError>>;
type Predicate<T> = Box<dyn Fn(&T) -> bool>;

/// A mapper binding exactly one value; later occurrences overwrite earlier
/// ones (last-write-wins).
///
/// ### Example
/// ```
/// use optbind::{Mapper, Scalar};
///
/// #[derive(Default)]
/// struct Config {
///     name: String,
/// }
///
/// let mapper = Scalar::new("Name", |config: &mut Config, value: String| {
///     config.name = value;
/// })
/// .required()
/// .transform(|raw| Ok(raw.to_uppercase()))
/// .validator(|config: &Config| !config.name.is_empty());
/// assert_eq!(mapper.name(), "Name");
/// ```
pub struct Scalar<T, V> {
    name: String,
    required: bool,
    assign: Box<dyn Fn(&mut T, V)>,
    transform: Option<Transform<V>>,
    predicate: Option<Predicate<T>>,
}

impl<T, V: FromToken> Scalar<T, V> {
    /// Create a scalar mapper for the field `name`.
    pub fn new(name: impl Into<String>, assign: impl Fn(&mut T, V) + 'static) -> Self {
        Self {
            name: name.into(),
            required: false,
            assign: Box::new(assign),
            transform: None,
            predicate: None,
        }
    }

    /// Mark the field required: validation fails unless it received a value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Convert raw tokens through `transform` instead of the default
    /// converter.  Applied before assignment.
    pub fn transform(mut self, transform: impl Fn(&str) -> Result<V, ConvertError> + 'static) -> Self {
        self.transform.replace(Box::new(transform));
        self
    }

    /// Validate the bound target with `predicate` once binding completes.
    /// The predicate runs through [`Mapper::validate`]; a required field
    /// that was never set fails before the predicate is consulted.
    pub fn validator(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.predicate.replace(Box::new(predicate));
        self
    }

    fn convert(&self, token: &str) -> Result<V, ConvertError> {
        match &self.transform {
            Some(transform) => transform(token),
            None => V::from_token(token),
        }
    }
}

impl<T, V: FromToken> Mapper<T> for Scalar<T, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set(
        &self,
        target: &mut T,
        context: &mut BindContext,
        token: &str,
    ) -> Result<(), ConvertError> {
        let value = self.convert(token)?;
        (self.assign)(target, value);
        context.record(&self.name);
        Ok(())
    }

    fn validate(&self, target: &T, context: &BindContext) -> Validation {
        if self.required && !context.is_set(&self.name) {
            return Validation::MissingRequired;
        }

        match &self.predicate {
            Some(predicate) if !predicate(target) => Validation::Rejected,
            _ => Validation::Pass,
        }
    }
}

impl<T, V> std::fmt::Debug for Scalar<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scalar")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}

/// A mapper accumulating one element per occurrence of its field,
/// preserving input order.  When required, validation demands at least one
/// element.
pub struct Collection<T, V> {
    name: String,
    required: bool,
    append: Box<dyn Fn(&mut T, V)>,
    transform: Option<Transform<V>>,
    predicate: Option<Predicate<T>>,
}

impl<T, V: FromToken> Collection<T, V> {
    /// Create a collection mapper for the field `name`.
    /// `append` is invoked once per parsed element.
    pub fn new(name: impl Into<String>, append: impl Fn(&mut T, V) + 'static) -> Self {
        Self {
            name: name.into(),
            required: false,
            append: Box::new(append),
            transform: None,
            predicate: None,
        }
    }

    /// Mark the field required: validation fails without at least one element.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Convert raw elements through `transform` instead of the default
    /// converter.  Applied before each append.
    pub fn transform(mut self, transform: impl Fn(&str) -> Result<V, ConvertError> + 'static) -> Self {
        self.transform.replace(Box::new(transform));
        self
    }

    /// Validate the bound target with `predicate` once binding completes.
    /// The predicate runs through [`Mapper::validate`]; a required field
    /// with no elements fails before the predicate is consulted.
    pub fn validator(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.predicate.replace(Box::new(predicate));
        self
    }
}

impl<T, V: FromToken> Mapper<T> for Collection<T, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set(
        &self,
        target: &mut T,
        context: &mut BindContext,
        token: &str,
    ) -> Result<(), ConvertError> {
        let value = match &self.transform {
            Some(transform) => transform(token)?,
            None => V::from_token(token)?,
        };
        (self.append)(target, value);
        context.record(&self.name);
        Ok(())
    }

    fn validate(&self, target: &T, context: &BindContext) -> Validation {
        if self.required && context.count(&self.name) == 0 {
            return Validation::MissingRequired;
        }

        match &self.predicate {
            Some(predicate) if !predicate(target) => Validation::Rejected,
            _ => Validation::Pass,
        }
    }
}

impl<T, V> std::fmt::Debug for Collection<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}
