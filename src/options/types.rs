// Option type tokens
//
// This module defines the closed set of type names a prototype may declare,
// plus class tokens for named object types, and the coercion-and-match
// procedure used by validated reads.

use std::fmt;

use crate::options::value::OptionValue;

/// A type token accepted in a prototype's `types` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Lists and maps
    Array,
    Boolean,
    /// Floating point; `float` is parsed as a synonym
    Double,
    Integer,
    /// Matches any value
    Mixed,
    /// The strings `on` or `off`, in any case
    OnOff,
    /// Any object
    Object,
    String,
    /// A named object type, matched through [`OptionObject::conforms_to`](crate::options::OptionObject::conforms_to)
    Class(String),
}

impl OptionType {
    /// Returns true for every variant except [`OptionType::Class`].
    pub fn is_builtin(&self) -> bool {
        !matches!(self, OptionType::Class(_))
    }

    pub fn name(&self) -> &str {
        match self {
            OptionType::Array => "array",
            OptionType::Boolean => "boolean",
            OptionType::Double => "double",
            OptionType::Integer => "integer",
            OptionType::Mixed => "mixed",
            OptionType::OnOff => "on/off",
            OptionType::Object => "object",
            OptionType::String => "string",
            OptionType::Class(name) => name,
        }
    }

    /// Parses a declaration that may hold several `|`-separated names.
    pub fn parse_list(declaration: &str) -> Vec<OptionType> {
        declaration
            .split('|')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(OptionType::from_name)
            .collect()
    }

    /// Parses one type name; unknown names become class tokens.
    pub fn from_name(name: &str) -> OptionType {
        match name.to_ascii_lowercase().as_str() {
            "array" => OptionType::Array,
            "boolean" => OptionType::Boolean,
            "double" | "float" => OptionType::Double,
            "integer" => OptionType::Integer,
            "mixed" => OptionType::Mixed,
            "on/off" => OptionType::OnOff,
            "object" => OptionType::Object,
            "string" => OptionType::String,
            _ => OptionType::Class(name.to_string()),
        }
    }

    /// Returns true if this declared type accepts a value tagged `tag`.
    fn accepts(&self, tag: &OptionType) -> bool {
        match (self, tag) {
            (OptionType::Mixed, _) => true,
            (OptionType::Class(a), OptionType::Class(b)) => a.eq_ignore_ascii_case(b),
            (declared, tag) => declared == tag,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Joins declared types with `|` for diagnostics.
pub fn join_types(types: &[OptionType]) -> String {
    types
        .iter()
        .map(OptionType::name)
        .collect::<Vec<_>>()
        .join("|")
}

/// Runs the coercion-and-match procedure over the declared types.
///
/// Declarations are scanned in order. A string tagged value is coerced to a
/// boolean when `boolean` is declared and it reads `true` or `false`, and is
/// re-tagged `on/off` when that type is declared and it reads `on` or `off`.
/// An object is re-tagged with a declared class token it conforms to. The
/// first declaration equal to `mixed` or to the current tag accepts the value.
///
/// Both `value` and `tag` are updated in place; coercions are not undone.
pub fn coerce_and_match(value: &mut OptionValue, tag: &mut OptionType, declared: &[OptionType]) -> bool {
    for valid in declared {
        if *tag == OptionType::String {
            let text = value.as_str().map(str::to_ascii_lowercase);
            match (valid, text.as_deref()) {
                (OptionType::Boolean, Some(t @ ("true" | "false"))) => {
                    // "false" reads as false, not as a non-empty string cast.
                    *value = OptionValue::Bool(t == "true");
                    *tag = OptionType::Boolean;
                }
                (OptionType::OnOff, Some("on" | "off")) => *tag = OptionType::OnOff,
                _ => {}
            }
        }

        if *tag == OptionType::Object {
            if let (OptionType::Class(name), OptionValue::Object(obj)) = (valid, &*value) {
                if obj.conforms_to(name) {
                    *tag = valid.clone();
                }
            }
        }

        if valid.accepts(tag) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::value::OptionObject;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Engine;

    impl OptionObject for Engine {
        fn class_name(&self) -> &str {
            "Engine"
        }

        fn conforms_to(&self, name: &str) -> bool {
            ["Engine", "Startable"]
                .iter()
                .any(|n| n.eq_ignore_ascii_case(name))
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    fn run(value: OptionValue, declared: &str) -> (bool, OptionValue, OptionType) {
        let mut value = value;
        let mut tag = value.value_type().unwrap();
        let ok = coerce_and_match(&mut value, &mut tag, &OptionType::parse_list(declared));
        (ok, value, tag)
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            OptionType::parse_list("string|Array| float"),
            vec![OptionType::String, OptionType::Array, OptionType::Double]
        );
        assert_eq!(
            OptionType::parse_list("Engine"),
            vec![OptionType::Class("Engine".to_string())]
        );
        assert!(OptionType::parse_list("").is_empty());
        assert!(OptionType::from_name("ON/OFF").is_builtin());
        assert!(!OptionType::from_name("Engine").is_builtin());
    }

    #[test]
    fn test_boolean_coercion() {
        let (ok, value, tag) = run(OptionValue::from("TRUE"), "boolean");
        assert!(ok);
        assert_eq!(value, OptionValue::Bool(true));
        assert_eq!(tag, OptionType::Boolean);

        let (ok, value, _) = run(OptionValue::from("False"), "boolean");
        assert!(ok);
        assert_eq!(value, OptionValue::Bool(false));
    }

    #[test]
    fn test_coercion_is_eager() {
        // `boolean` is scanned first, so the string is coerced even though
        // `string` would have accepted it unchanged.
        let (ok, value, _) = run(OptionValue::from("true"), "boolean|string");
        assert!(ok);
        assert_eq!(value, OptionValue::Bool(true));

        let (ok, value, _) = run(OptionValue::from("true"), "string|boolean");
        assert!(ok);
        assert_eq!(value, OptionValue::from("true"));
    }

    #[test]
    fn test_on_off_keeps_string() {
        let (ok, value, tag) = run(OptionValue::from("On"), "on/off");
        assert!(ok);
        assert_eq!(value, OptionValue::from("On"));
        assert_eq!(tag, OptionType::OnOff);

        let (ok, _, _) = run(OptionValue::from("yes"), "on/off");
        assert!(!ok);
    }

    #[test]
    fn test_class_tokens() {
        let engine = OptionValue::Object(Arc::new(Engine));
        assert!(run(engine.clone(), "startable").0);
        assert!(run(engine.clone(), "object").0);
        assert!(!run(engine.clone(), "Wheel").0);
        assert!(!run(engine, "array").0);
    }

    #[test]
    fn test_float_and_double_are_synonyms() {
        assert!(run(OptionValue::from(0.5), "float").0);
        assert!(run(OptionValue::from(0.5), "double").0);
        assert!(!run(OptionValue::from(5), "float").0);
    }
}
