use crate::convert::{ConvertError, FromToken};
use crate::model::Kind;

// The (dyn ..) bridges the stringly-typed binding engine to the typed target;
// the closure is where the compiler still knows the field's type V.
type Assign<T> = Box<dyn Fn(&mut T, &str) -> Result<(), ConvertError>>;

/// A single field descriptor: canonical name, conversion kind, declared
/// aliases, and the typed assignment used for default binding.
///
/// Descriptors are immutable once added to a [`Schema`].
pub struct Field<T> {
    name: String,
    kind: Kind,
    aliases: Vec<String>,
    assign: Assign<T>,
}

impl<T> Field<T> {
    /// A field holding a single value; later assignments overwrite earlier ones.
    ///
    /// ### Example
    /// ```
    /// use optbind::Field;
    ///
    /// struct Config {
    ///     name: String,
    /// }
    ///
    /// let field = Field::scalar("Name", |config: &mut Config, value: String| {
    ///     config.name = value;
    /// });
    /// assert_eq!(field.name(), "Name");
    /// ```
    pub fn scalar<V: FromToken>(
        name: impl Into<String>,
        set: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: V::KIND,
            aliases: Vec::default(),
            assign: Box::new(move |target, token| {
                set(target, V::from_token(token)?);
                Ok(())
            }),
        }
    }

    /// A field accumulating one element per assignment, preserving input
    /// order across repeated occurrences of the same key.
    pub fn collection<V: FromToken>(
        name: impl Into<String>,
        add: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: V::KIND,
            aliases: Vec::default(),
            assign: Box::new(move |target, token| {
                add(target, V::from_token(token)?);
                Ok(())
            }),
        }
    }

    /// Declare an alias for this field.
    /// May be repeated; explicit aliases registered on the binder take
    /// precedence when both define the same alias string.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// The canonical field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn assign(&self, target: &mut T, token: &str) -> Result<(), ConvertError> {
        (self.assign)(target, token)
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// The ordered field descriptors of a target type `T`.
///
/// Declaration order is the positional binding order.
///
/// ### Example
/// ```
/// use optbind::{Field, Schema};
///
/// #[derive(Default)]
/// struct Config {
///     name: String,
///     true_false: bool,
/// }
///
/// let schema = Schema::new()
///     .field(Field::scalar("Name", |config: &mut Config, value: String| {
///         config.name = value;
///     }))
///     .field(Field::scalar("TrueFalse", |config: &mut Config, value: bool| {
///         config.true_false = value;
///     }));
/// ```
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Schema<T> {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self {
            fields: Vec::default(),
        }
    }

    /// Add a field descriptor.
    /// The order of `field` calls is the positional binding order.
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub(crate) fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|field| field.name() == name)
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}
