use thiserror::Error;

/// Unified error type for the options container.
///
/// Every failure is raised synchronously by the call that detects it. The
/// per-prototype `throwException` flag only suppresses [`Error::AbsentRequiredOption`],
/// [`Error::NullOption`], [`Error::InvalidType`] and [`Error::InvalidValue`];
/// the structural variants always fail.
#[derive(Error, Debug)]
pub enum Error {
    /// An empty key was passed to a validated read.
    #[error("No key supplied.")]
    NoKeySupplied,

    /// The key is not declared in a non-empty schema.
    #[error("Invalid option '{option}'{}", valid_suffix(.valid))]
    InvalidOption { option: String, valid: String },

    /// A schema entry is not a key/value mapping.
    #[error("Invalid prototype for option '{option}'.")]
    InvalidPrototype { option: String },

    /// A schema entry names a field that prototypes do not have.
    #[error("Invalid prototype key '{key}' for option '{option}'.")]
    InvalidPrototypeKey { option: String, key: String },

    /// A required option is missing from the data.
    #[error("Absent required option: {option}")]
    AbsentRequiredOption { option: String },

    /// A non-nullable option resolved to null.
    #[error("Option '{option}' cannot be null.")]
    NullOption { option: String },

    /// The resolved value matches none of the declared types.
    #[error(
        "The type of option '{option}' must be '{expected}', but '{got}' was gotten{}",
        value_suffix(.value)
    )]
    InvalidType {
        option: String,
        expected: String,
        got: String,
        /// Printed form of the offending value, scalars only.
        value: Option<String>,
    },

    /// The resolved value is not one of the allowed values.
    #[error("The value '{value}' for option '{option}' is invalid, possible value(s) '{allowed}'")]
    InvalidValue {
        option: String,
        allowed: String,
        value: String,
    },

    /// Explicit prototype lookup for a key the schema does not declare.
    #[error("Prototype for option '{option}' not found.")]
    OptionPrototypeNotFound { option: String },

    /// Data or schema root supplied in a non-mapping shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Failure while producing the serialized snapshot.
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized `Result` type for options operations.
pub type Result<T> = std::result::Result<T, Error>;

fn valid_suffix(valid: &str) -> String {
    if valid.is_empty() {
        String::new()
    } else {
        format!(", valid option(s) '{}'", valid)
    }
}

fn value_suffix(value: &Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!(", with the value '{}'", v),
        _ => String::new(),
    }
}
