//! Splits the raw token sequence into the positional prefix and the named
//! parameters.  Pure over its input; all field knowledge lives downstream.

/// The recognized option prefixes, interchangeable and not semantically
/// distinguished.
const OPTION_PREFIXES: &[char] = &['-', '/'];

/// A transient `(key, value)` pair for a named token.
/// The key is stripped of all leading prefix characters.
/// `None` marks a key with no following value token; an explicit empty
/// string on the command line survives as `Some("")`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Parameter {
    pub(crate) key: String,
    pub(crate) value: Option<String>,
}

impl Parameter {
    #[cfg(test)]
    pub(crate) fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    #[cfg(test)]
    pub(crate) fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

pub(crate) fn is_option(token: &str) -> bool {
    token.starts_with(OPTION_PREFIXES)
}

fn strip(token: &str) -> &str {
    token.trim_start_matches(OPTION_PREFIXES)
}

/// Classify the token sequence into the positional prefix (the maximal
/// leading run of non-option tokens) and the named parameters.
///
/// Each option token is paired with the token immediately following it in
/// the original sequence.  When the following token is absent, or is itself
/// an option token, the key carries no value and the following token is
/// not consumed.
pub(crate) fn classify<'t>(tokens: &'t [&'t str]) -> (&'t [&'t str], Vec<Parameter>) {
    let split = tokens
        .iter()
        .position(|token| is_option(token))
        .unwrap_or(tokens.len());
    let (positionals, rest) = tokens.split_at(split);

    let mut parameters = Vec::default();
    let mut index = 0;

    while index < rest.len() {
        let token = rest[index];

        if is_option(token) {
            let value = match rest.get(index + 1) {
                Some(next) if !is_option(next) => {
                    index += 1;
                    Some((*next).to_string())
                }
                _ => None,
            };
            parameters.push(Parameter {
                key: strip(token).to_string(),
                value,
            });
        }

        index += 1;
    }

    (positionals, parameters)
}
