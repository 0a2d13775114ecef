// Option prototypes
//
// A prototype describes one option: whether it is required or nullable, its
// default, the types and values it accepts, and whether violations raise.
// Raw schema entries are parsed by reading each field back through the
// validated-get engine against the meta-prototype of that field.

use crate::internal::error::{Error, Result};
use crate::options::container::{Options, OptionsConfig};
use crate::options::path::OptionMap;
use crate::options::types::OptionType;
use crate::options::value::OptionValue;

/// The fields a prototype may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrototypeField {
    Required,
    Nullable,
    Default,
    Values,
    Types,
    ThrowException,
}

impl PrototypeField {
    pub const ALL: [PrototypeField; 6] = [
        PrototypeField::Required,
        PrototypeField::Nullable,
        PrototypeField::Default,
        PrototypeField::Values,
        PrototypeField::Types,
        PrototypeField::ThrowException,
    ];

    /// The key naming this field in a raw schema entry.
    pub fn name(self) -> &'static str {
        match self {
            PrototypeField::Required => "required",
            PrototypeField::Nullable => "nullable",
            PrototypeField::Default => "default",
            PrototypeField::Values => "values",
            PrototypeField::Types => "types",
            PrototypeField::ThrowException => "throwException",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    fn declared_types(self) -> &'static str {
        match self {
            PrototypeField::Required | PrototypeField::Nullable | PrototypeField::ThrowException => {
                "boolean"
            }
            PrototypeField::Default => "mixed",
            PrototypeField::Values => "array",
            PrototypeField::Types => "string|array",
        }
    }

    /// The value a prototype takes for this field when it is not declared.
    pub fn default_value(self) -> OptionValue {
        match self {
            PrototypeField::Required => OptionValue::Bool(false),
            PrototypeField::Nullable => OptionValue::Bool(true),
            PrototypeField::Default => OptionValue::Null,
            PrototypeField::Values => OptionValue::Array(Vec::new()),
            PrototypeField::Types => OptionValue::from("mixed"),
            PrototypeField::ThrowException => OptionValue::Bool(true),
        }
    }

    /// The meta-prototype row for this field.
    pub fn meta(self) -> Prototype {
        Prototype {
            types: OptionType::parse_list(self.declared_types()),
            default: self.default_value(),
            ..Prototype::default()
        }
    }
}

/// Validation rules for a single option.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    /// A read fails when the option is absent from the data
    pub required: bool,
    /// A read fails when the option resolves to null
    pub nullable: bool,
    /// Substituted when the option is absent
    pub default: OptionValue,
    /// Allowed values; empty means unrestricted
    pub values: Vec<OptionValue>,
    /// Accepted types, scanned in order
    pub types: Vec<OptionType>,
    /// When false, violations are tolerated and the value is returned as is
    pub throw_exception: bool,
}

impl Default for Prototype {
    fn default() -> Self {
        Self {
            required: false,
            nullable: true,
            default: OptionValue::Null,
            values: Vec::new(),
            types: vec![OptionType::Mixed],
            throw_exception: true,
        }
    }
}

impl Prototype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted types from a `|`-separated declaration.
    pub fn with_types(mut self, declaration: &str) -> Self {
        self.types = types_or_mixed(OptionType::parse_list(declaration));
        self
    }

    pub fn with_default(mut self, default: impl Into<OptionValue>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_values<V: Into<OptionValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Tolerates violations instead of raising them.
    pub fn permissive(mut self) -> Self {
        self.throw_exception = false;
        self
    }

    /// Parses a raw schema entry declared for `option`.
    ///
    /// Every key must name a [`PrototypeField`]. Each field is then read
    /// through [`Options::get_with`] using its meta-prototype, so declared
    /// fields are type checked and coerced exactly like option values.
    pub fn from_map(option: &str, entry: &OptionMap) -> Result<Prototype> {
        // Reject unknown fields before reading any of them
        if let Some(key) = entry.keys().find(|key| PrototypeField::from_name(key).is_none()) {
            return Err(Error::InvalidPrototypeKey {
                option: option.to_string(),
                key: key.clone(),
            });
        }

        // Read each field back through its meta-prototype
        let reader = Options::with_data(entry.clone(), OptionsConfig::flat());
        let read = |field: PrototypeField| {
            reader
                .get_with(field.name(), Some(&field.meta()))
                .map_err(|err| qualify(err, option))
        };
        let read_bool = |field: PrototypeField| -> Result<bool> {
            let value = read(field)?;
            Ok(value
                .as_bool()
                .or_else(|| field.default_value().as_bool())
                .unwrap_or_default())
        };

        // Absent fields resolve to their meta defaults
        let required = read_bool(PrototypeField::Required)?;
        let nullable = read_bool(PrototypeField::Nullable)?;
        let default = read(PrototypeField::Default)?;
        let values = read(PrototypeField::Values)?
            .elements()
            .map(|items| items.into_iter().cloned().collect())
            .unwrap_or_default();
        let types = parse_types(option, read(PrototypeField::Types)?)?;
        let throw_exception = read_bool(PrototypeField::ThrowException)?;

        Ok(Prototype {
            required,
            nullable,
            default,
            values,
            types,
            throw_exception,
        })
    }
}

/// Parses a `types` declaration given as a string or a list of strings.
fn parse_types(option: &str, declaration: OptionValue) -> Result<Vec<OptionType>> {
    let types = match &declaration {
        OptionValue::Null => Vec::new(),
        OptionValue::String(s) => OptionType::parse_list(s),
        other => {
            let mut types = Vec::new();
            for item in other.elements().unwrap_or_default() {
                match item {
                    OptionValue::String(s) => types.extend(OptionType::parse_list(s)),
                    _ => {
                        return Err(Error::InvalidType {
                            option: format!("{}.{}", option, PrototypeField::Types.name()),
                            expected: OptionType::String.to_string(),
                            got: item.type_name(),
                            value: (!item.is_compound()).then(|| item.to_string()),
                        })
                    }
                }
            }
            types
        }
    };
    Ok(types_or_mixed(types))
}

fn types_or_mixed(types: Vec<OptionType>) -> Vec<OptionType> {
    if types.is_empty() {
        vec![OptionType::Mixed]
    } else {
        types
    }
}

/// Prefixes the prototype field in a meta validation error with its option.
fn qualify(err: Error, option: &str) -> Error {
    let prefix = |field: String| format!("{}.{}", option, field);
    match err {
        Error::NullOption { option: field } => Error::NullOption { option: prefix(field) },
        Error::InvalidType {
            option: field,
            expected,
            got,
            value,
        } => Error::InvalidType {
            option: prefix(field),
            expected,
            got,
            value,
        },
        other => other,
    }
}
