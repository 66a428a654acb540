use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::convert::ConvertError;
use crate::mapper::{BindContext, Mapper, Validation};
use crate::model::Kind;
use crate::resolve::{canonicalize, Resolver};
use crate::schema::{Field, Schema};
use crate::tokens::{classify, Parameter};

/// Configuration error raised while building a [`Binder`].
#[derive(Debug, Error)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// A single mapper's validation failure, naming the offending field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    /// A mapper marked required never received a value.
    #[error("required field never set: '{0}'")]
    MissingRequired(String),
    /// The mapper's validator predicate rejected the bound value(s).
    #[error("field rejected by its validator: '{0}'")]
    Rejected(String),
}

impl ValidationFailure {
    /// The canonical name of the failing field.
    pub fn field(&self) -> &str {
        match self {
            ValidationFailure::MissingRequired(field) | ValidationFailure::Rejected(field) => field,
        }
    }
}

/// Terminal parse failure.  No partially bound target is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    /// A raw token could not convert into its field's declared kind.
    /// Raised during binding; aborts the parse immediately.
    #[error("field '{field}': {error}")]
    Conversion {
        /// The canonical name of the field being bound.
        field: String,
        /// The underlying conversion failure.
        error: ConvertError,
    },
    /// One or more mappers failed to validate.
    /// Batch-collected after every mapper has validated; lists every
    /// offender in mapper registration order.
    #[error("the following field(s) failed to validate: {}", .0.iter().map(ValidationFailure::field).collect::<Vec<&str>>().join(", "))]
    Validation(Vec<ValidationFailure>),
}

/// Assembles a [`Binder`] from a schema, custom mappers, and explicit
/// aliases.
pub struct BinderBuilder<T> {
    schema: Schema<T>,
    mappers: Vec<Box<dyn Mapper<T>>>,
    aliases: Vec<(String, String)>,
}

impl<T> BinderBuilder<T> {
    fn new(schema: Schema<T>) -> Self {
        Self {
            schema,
            mappers: Vec::default(),
            aliases: Vec::default(),
        }
    }

    /// Register a custom mapper.  At most one mapper may be registered per
    /// canonical field name; the binding engine consults the mapper before
    /// falling back to default conversion.
    pub fn mapper(mut self, mapper: impl Mapper<T> + 'static) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Register an explicit alias (ex: `"n"`) for a canonical field name
    /// (ex: `"Names"`).  Explicit aliases take precedence over
    /// field-declared aliases when both define the same alias string.
    pub fn alias(mut self, alias: impl Into<String>, field: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), field.into()));
        self
    }

    /// Finalize the configuration, checking for repeated mappers and
    /// repeated aliases.
    pub fn build(self) -> Result<Binder<T>, ConfigError> {
        let mut mapper_index: HashMap<String, usize> = HashMap::default();

        for (index, mapper) in self.mappers.iter().enumerate() {
            if mapper_index
                .insert(mapper.name().to_string(), index)
                .is_some()
            {
                return Err(ConfigError(format!(
                    "Cannot register multiple mappers for the field '{}'.",
                    mapper.name()
                )));
            }
        }

        // Field-declared aliases merge first..
        let mut aliases: HashMap<String, String> = HashMap::default();

        for field in self.schema.fields() {
            for alias in field.aliases() {
                if aliases
                    .insert(alias.clone(), canonicalize(field.name()))
                    .is_some()
                {
                    return Err(ConfigError(format!(
                        "Cannot declare the alias '{alias}' on multiple fields."
                    )));
                }
            }
        }

        // ..then explicit aliases, which win over declared ones but may not repeat.
        let mut explicit: HashSet<&str> = HashSet::default();

        for (alias, field) in &self.aliases {
            if !explicit.insert(alias.as_str()) {
                return Err(ConfigError(format!(
                    "Cannot register the alias '{alias}' twice."
                )));
            }

            aliases.insert(alias.clone(), canonicalize(field));
        }

        let field_names = self
            .schema
            .fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect();

        Ok(Binder {
            schema: self.schema,
            mappers: self.mappers,
            mapper_index,
            resolver: Resolver::new(aliases, field_names),
        })
    }
}

impl<T> std::fmt::Debug for BinderBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderBuilder{..}").finish()
    }
}

/// The configured binder.
///
/// Immutable after [`BinderBuilder::build`]; a single binder may serve any
/// number of parse calls against independent targets.
///
/// ### Example
/// ```
/// use optbind::{Binder, Field, Schema};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Options {
///     name: String,
///     true_false: bool,
/// }
///
/// let schema = Schema::new()
///     .field(Field::scalar("Name", |options: &mut Options, value: String| {
///         options.name = value;
///     }))
///     .field(Field::scalar("TrueFalse", |options: &mut Options, value: bool| {
///         options.true_false = value;
///     }));
/// let binder = Binder::new(schema).unwrap();
///
/// let options = binder.parse(&["Bob", "false"]).unwrap();
/// assert_eq!(
///     options,
///     Options {
///         name: "Bob".to_string(),
///         true_false: false,
///     }
/// );
/// ```
pub struct Binder<T> {
    schema: Schema<T>,
    mappers: Vec<Box<dyn Mapper<T>>>,
    mapper_index: HashMap<String, usize>,
    resolver: Resolver,
}

impl<T> Binder<T> {
    /// A binder over `schema` with no mappers and no explicit aliases.
    pub fn new(schema: Schema<T>) -> Result<Self, ConfigError> {
        Self::builder(schema).build()
    }

    /// Configure a binder over `schema` with mappers and explicit aliases.
    pub fn builder(schema: Schema<T>) -> BinderBuilder<T> {
        BinderBuilder::new(schema)
    }

    /// Bind the token sequence onto a default-constructed target.
    ///
    /// The tokens are conventionally the command line arguments, excluding
    /// the program name.
    pub fn parse(&self, tokens: &[&str]) -> Result<T, BindError>
    where
        T: Default,
    {
        self.parse_into(T::default(), tokens)
    }

    /// Bind the token sequence onto `target`, mutating it in place.
    ///
    /// Binding happens in three phases:
    /// 1. The positional prefix binds in lockstep with the schema's
    ///    declaration order.
    /// 2. Each named parameter resolves through the alias table and binds
    ///    via its field's mapper or default conversion.  Unresolvable keys
    ///    are dropped without error.
    /// 3. Every registered mapper validates; failures are aggregated.
    pub fn parse_into(&self, mut target: T, tokens: &[&str]) -> Result<T, BindError> {
        let mut context = BindContext::default();
        let (positionals, parameters) = classify(tokens);

        // Trailing fields keep their current value; trailing tokens beyond
        // the field count are silently ignored.
        for (token, field) in positionals.iter().zip(self.schema.fields()) {
            self.bind_value(&mut target, &mut context, field, token)?;
        }

        for parameter in &parameters {
            self.bind_parameter(&mut target, &mut context, parameter)?;
        }

        self.validate(&target, &context)?;
        Ok(target)
    }

    fn mapper_for(&self, field: &str) -> Option<&dyn Mapper<T>> {
        self.mapper_index
            .get(field)
            .map(|index| self.mappers[*index].as_ref())
    }

    fn bind_value(
        &self,
        target: &mut T,
        context: &mut BindContext,
        field: &Field<T>,
        token: &str,
    ) -> Result<(), BindError> {
        match self.mapper_for(field.name()) {
            Some(mapper) => mapper.set(target, context, token),
            None => field.assign(target, token),
        }
        .map_err(|error| BindError::Conversion {
            field: field.name().to_string(),
            error,
        })
    }

    fn bind_parameter(
        &self,
        target: &mut T,
        context: &mut BindContext,
        parameter: &Parameter,
    ) -> Result<(), BindError> {
        let Some(name) = self.resolver.resolve(&parameter.key) else {
            // Unknown keys are dropped without error - deliberate leniency.
            return Ok(());
        };
        let Some(field) = self.schema.get(&name) else {
            // An alias may point outside the schema; same leniency.
            return Ok(());
        };

        if field.kind() == Kind::Bool {
            // Presence alone implies true.  An explicit boolean literal
            // afterwards overrides the preset; a mapper may also override.
            field
                .assign(target, "true")
                .map_err(|error| BindError::Conversion {
                    field: field.name().to_string(),
                    error,
                })?;
        }

        let Some(value) = &parameter.value else {
            // The key had no value token: nothing further to bind.
            return Ok(());
        };

        self.bind_value(target, context, field, value)
    }

    fn validate(&self, target: &T, context: &BindContext) -> Result<(), BindError> {
        let mut failures = Vec::default();

        for mapper in &self.mappers {
            match mapper.validate(target, context) {
                Validation::Pass => {}
                Validation::MissingRequired => {
                    failures.push(ValidationFailure::MissingRequired(mapper.name().to_string()));
                }
                Validation::Rejected => {
                    failures.push(ValidationFailure::Rejected(mapper.name().to_string()));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BindError::Validation(failures))
        }
    }
}

impl<T> std::fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder{..}").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{Collection, Scalar};
    use crate::test::assert_contains;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[derive(Debug, Default, PartialEq)]
    struct Options {
        name: String,
        true_false: bool,
        optional_value: u32,
    }

    fn options_schema() -> Schema<Options> {
        Schema::new()
            .field(Field::scalar("Name", |options: &mut Options, value: String| {
                options.name = value;
            }))
            .field(Field::scalar(
                "TrueFalse",
                |options: &mut Options, value: bool| {
                    options.true_false = value;
                },
            ))
            .field(Field::scalar(
                "OptionalValue",
                |options: &mut Options, value: u32| {
                    options.optional_value = value;
                },
            ))
    }

    #[derive(Debug, Default, PartialEq)]
    struct HelloOptions {
        names: Vec<String>,
        greet: bool,
    }

    fn hello_schema() -> Schema<HelloOptions> {
        Schema::new()
            .field(Field::collection(
                "Names",
                |options: &mut HelloOptions, value: String| {
                    options.names.push(value);
                },
            ))
            .field(Field::scalar(
                "Greet",
                |options: &mut HelloOptions, value: bool| {
                    options.greet = value;
                },
            ))
    }

    #[test]
    fn parse_positionals() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(&["Bob", "false"]).unwrap();

        // Verify
        assert_eq!(
            options,
            Options {
                name: "Bob".to_string(),
                true_false: false,
                optional_value: 0,
            }
        );
    }

    #[test]
    fn parse_empty() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(empty::slice()).unwrap();

        // Verify
        assert_eq!(options, Options::default());
    }

    #[test]
    fn parse_trailing_positionals_ignored() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();
        let trailing = thread_rng().gen_range(1..20);
        let mut tokens = vec!["Bob", "true", "16"];
        tokens.extend(std::iter::repeat("extra").take(trailing));

        // Execute
        let options = binder.parse(tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(
            options,
            Options {
                name: "Bob".to_string(),
                true_false: true,
                optional_value: 16,
            }
        );
    }

    #[rstest]
    #[case(vec!["-name", "Bob"])]
    #[case(vec!["--name", "Bob"])]
    #[case(vec!["/name", "Bob"])]
    #[case(vec!["-n", "Bob"])]
    #[case(vec!["-Name", "Bob"])]
    fn parse_named(#[case] tokens: Vec<&str>) {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(options.name, "Bob".to_string());
    }

    #[test]
    fn parse_named_overwrites_positional() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(&["Bob", "-name", "Max"]).unwrap();

        // Verify
        assert_eq!(options.name, "Max".to_string());
    }

    #[rstest]
    #[case(vec!["-trueFalse"], true)]
    #[case(vec!["-trueFalse", "true"], true)]
    #[case(vec!["-trueFalse", "false"], false)]
    #[case(vec!["-trueFalse", "-name", "Bob"], true)]
    fn parse_bool_presence(#[case] tokens: Vec<&str>, #[case] expected: bool) {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(options.true_false, expected);
    }

    #[test]
    fn parse_bool_inconvertable() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let error = binder.parse(&["-trueFalse", "maybe"]).unwrap_err();

        // Verify
        assert_eq!(
            error,
            BindError::Conversion {
                field: "TrueFalse".to_string(),
                error: ConvertError::new("maybe", Kind::Bool),
            }
        );
    }

    #[test]
    fn parse_unknown_key_dropped() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let options = binder.parse(&["-x", "whatever", "-name", "Bob"]).unwrap();

        // Verify
        assert_eq!(options.name, "Bob".to_string());
        assert_eq!(options.optional_value, 0);
    }

    #[test]
    fn parse_conversion_failure_is_terminal() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();

        // Execute
        let error = binder
            .parse(&["-optionalValue", "sixteen", "-name", "Bob"])
            .unwrap_err();

        // Verify
        assert_eq!(
            error,
            BindError::Conversion {
                field: "OptionalValue".to_string(),
                error: ConvertError::new("sixteen", Kind::Int),
            }
        );
    }

    #[test]
    fn parse_into_caller_target() {
        // Setup
        let binder = Binder::new(options_schema()).unwrap();
        let seed = Options {
            name: "Seed".to_string(),
            true_false: true,
            optional_value: 7,
        };

        // Execute
        let options = binder.parse_into(seed, &["-name", "Bob"]).unwrap();

        // Verify: untouched fields keep their caller-supplied values.
        assert_eq!(
            options,
            Options {
                name: "Bob".to_string(),
                true_false: true,
                optional_value: 7,
            }
        );
    }

    #[test]
    fn parse_mapper_overrides_default_binding() {
        // Setup
        let binder = Binder::builder(options_schema())
            .mapper(
                Scalar::new("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .transform(|raw| Ok(raw.to_uppercase())),
            )
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["-name", "Bob"]).unwrap();

        // Verify
        assert_eq!(options.name, "BOB".to_string());
    }

    #[test]
    fn parse_mapper_applies_to_positionals() {
        // Setup
        let binder = Binder::builder(options_schema())
            .mapper(
                Scalar::new("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .transform(|raw| Ok(raw.to_uppercase())),
            )
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["Bob", "false"]).unwrap();

        // Verify
        assert_eq!(options.name, "BOB".to_string());
        assert!(!options.true_false);
    }

    #[test]
    fn parse_required_missing() {
        // Setup
        let binder = Binder::builder(options_schema())
            .mapper(
                Scalar::new("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .required(),
            )
            .build()
            .unwrap();

        // Execute
        let error = binder.parse(&["-trueFalse", "false"]).unwrap_err();

        // Verify
        assert_eq!(
            error,
            BindError::Validation(vec![ValidationFailure::MissingRequired(
                "Name".to_string()
            )])
        );
    }

    #[test]
    fn parse_explicit_empty_value_binds() {
        // Setup
        let binder = Binder::builder(options_schema())
            .mapper(
                Scalar::new("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .required(),
            )
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["-name", ""]).unwrap();

        // Verify: the empty string is a consumed value, so the required
        // check is satisfied.
        assert_eq!(options.name, String::default());
    }

    #[test]
    fn parse_validation_aggregates_every_failure() {
        // Setup
        let binder = Binder::builder(options_schema())
            .mapper(
                Scalar::new("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .validator(|options: &Options| options.name.len() > 3),
            )
            .mapper(
                Scalar::new("OptionalValue", |options: &mut Options, value: u32| {
                    options.optional_value = value;
                })
                .required(),
            )
            .build()
            .unwrap();

        // Execute
        let error = binder.parse(&["-name", "Bob"]).unwrap_err();

        // Verify: both failures reported at once, in registration order.
        assert_eq!(
            error,
            BindError::Validation(vec![
                ValidationFailure::Rejected("Name".to_string()),
                ValidationFailure::MissingRequired("OptionalValue".to_string()),
            ])
        );
        assert_contains!(error.to_string(), "Name");
        assert_contains!(error.to_string(), "OptionalValue");
    }

    #[test]
    fn parse_collection_accumulates() {
        // Setup
        let binder = Binder::builder(hello_schema())
            .mapper(Collection::new(
                "Names",
                |options: &mut HelloOptions, value: String| {
                    options.names.push(value);
                },
            ))
            .alias("n", "names")
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["-n", "Max", "-n", "Tom", "-greet"]).unwrap();

        // Verify
        assert_eq!(options.names, vec!["Max".to_string(), "Tom".to_string()]);
        assert!(options.greet);
    }

    #[test]
    fn explicit_alias_wins_over_declared() {
        // Setup: the schema declares "n" on Greet; the builder points "n" at Names.
        let schema = Schema::new()
            .field(Field::collection(
                "Names",
                |options: &mut HelloOptions, value: String| {
                    options.names.push(value);
                },
            ))
            .field(
                Field::scalar("Greet", |options: &mut HelloOptions, value: bool| {
                    options.greet = value;
                })
                .alias("n"),
            );
        let binder = Binder::builder(schema)
            .alias("n", "Names")
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["-n", "Max"]).unwrap();

        // Verify
        assert_eq!(options.names, vec!["Max".to_string()]);
        assert!(!options.greet);
    }

    #[test]
    fn declared_alias_resolves() {
        // Setup
        let schema = Schema::new()
            .field(
                Field::scalar("Greet", |options: &mut HelloOptions, value: bool| {
                    options.greet = value;
                })
                .alias("Groot"),
            )
            .field(Field::collection(
                "Names",
                |options: &mut HelloOptions, value: String| {
                    options.names.push(value);
                },
            ));
        let binder = Binder::new(schema).unwrap();

        // Execute
        let options = binder.parse(&["-Groot"]).unwrap();

        // Verify
        assert!(options.greet);
    }

    #[test]
    fn build_duplicate_mapper() {
        // Setup
        let result = Binder::builder(options_schema())
            .mapper(Scalar::new("Name", |options: &mut Options, value: String| {
                options.name = value;
            }))
            .mapper(Scalar::new("Name", |options: &mut Options, value: String| {
                options.name = value;
            }))
            .build();

        // Verify
        assert_matches!(result, Err(ConfigError(_)));
    }

    #[test]
    fn build_duplicate_declared_alias() {
        // Setup
        let schema = Schema::new()
            .field(
                Field::scalar("Name", |options: &mut Options, value: String| {
                    options.name = value;
                })
                .alias("x"),
            )
            .field(
                Field::scalar("OptionalValue", |options: &mut Options, value: u32| {
                    options.optional_value = value;
                })
                .alias("x"),
            );

        // Execute & Verify
        assert_matches!(Binder::new(schema), Err(ConfigError(_)));
    }

    #[test]
    fn build_duplicate_explicit_alias() {
        // Setup
        let result = Binder::builder(options_schema())
            .alias("x", "Name")
            .alias("x", "OptionalValue")
            .build();

        // Verify
        assert_matches!(result, Err(ConfigError(_)));
    }

    #[test]
    fn parse_alias_outside_schema_dropped() {
        // Setup
        let binder = Binder::builder(options_schema())
            .alias("z", "Zebra")
            .build()
            .unwrap();

        // Execute
        let options = binder.parse(&["-z", "stripes"]).unwrap();

        // Verify
        assert_eq!(options, Options::default());
    }
}
