// Options container
//
// Holds option data together with an optional schema of prototypes. Reads go
// through the validated-get path; writes are raw and unchecked.

use std::ops::Index;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::internal::error::{Error, Result};
use crate::options::path::{self, OptionMap};
use crate::options::prototype::Prototype;
use crate::options::validator::{self, OptionValidator};
use crate::options::value::{OptionObject, OptionValue};

/// Prototypes keyed by option name.
pub type Schema = IndexMap<String, Prototype>;

static NULL: OptionValue = OptionValue::Null;

/// Configuration for an options container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsConfig {
    /// Separator for nested key paths; `None` makes every key flat
    pub path_separator: Option<char>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            path_separator: Some('.'),
        }
    }
}

impl OptionsConfig {
    /// Configuration with nested path addressing disabled.
    pub fn flat() -> Self {
        Self {
            path_separator: None,
        }
    }
}

/// A key/value options container validated by per-key prototypes.
///
/// An empty schema accepts any key. Once a schema declares at least one
/// option, reading an undeclared key fails with [`Error::InvalidOption`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    data: OptionMap,
    schema: Schema,
    config: OptionsConfig,
}

impl Options {
    /// Creates an empty container with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container with a custom configuration.
    pub fn with_config(config: OptionsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a schema-less container over `data`.
    pub fn with_data(data: OptionMap, config: OptionsConfig) -> Self {
        Self {
            data,
            schema: Schema::new(),
            config,
        }
    }

    /// Builds a container from raw data and a raw schema.
    ///
    /// The schema is validated immediately; the data is stored as given and
    /// only checked when read.
    pub fn make(data: OptionMap, schema: OptionMap) -> Result<Self> {
        let mut options = Self::with_data(data, OptionsConfig::default());
        options.set_schema(schema)?;
        Ok(options)
    }

    /// Builds a container from JSON objects; `null` stands for an empty map.
    pub fn from_json(data: serde_json::Value, schema: serde_json::Value) -> Result<Self> {
        Self::make(json_map(data, "data")?, json_map(schema, "schema")?)
    }

    pub fn config(&self) -> &OptionsConfig {
        &self.config
    }

    /// Returns true if `key` is present in the data, nested paths included.
    pub fn has(&self, key: &str) -> bool {
        path::has(&self.data, key, self.config.path_separator)
    }

    /// Returns true if `key` is present in the data or declared in the schema.
    pub fn defines(&self, key: &str) -> bool {
        self.has(key) || self.schema.contains_key(key)
    }

    /// Reads `key` through its schema prototype.
    pub fn get(&self, key: &str) -> Result<OptionValue> {
        self.get_with(key, None)
    }

    /// Reads `key`, validating it against `prototype` instead of the schema
    /// entry when one is supplied.
    ///
    /// The key must still be declared when the schema is non-empty.
    pub fn get_with(&self, key: &str, prototype: Option<&Prototype>) -> Result<OptionValue> {
        if key.is_empty() {
            return Err(Error::NoKeySupplied);
        }

        if !self.schema.is_empty() && !self.schema.contains_key(key) {
            return Err(Error::InvalidOption {
                option: key.to_string(),
                valid: self.schema.keys().map(String::as_str).collect::<Vec<_>>().join(" | "),
            });
        }

        let fallback;
        let prototype = match prototype.or_else(|| self.schema.get(key)) {
            Some(prototype) => prototype,
            None => {
                fallback = Prototype::default();
                &fallback
            }
        };

        let stored = path::lookup(&self.data, key, self.config.path_separator);
        OptionValidator::new(key, prototype).resolve(stored)
    }

    /// Writes `value` at `key` without validation.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) {
        path::set(&mut self.data, key, value.into(), self.config.path_separator);
    }

    /// Removes `key` from the data, returning the removed value.
    pub fn forget(&mut self, key: &str) -> Option<OptionValue> {
        path::forget(&mut self.data, key, self.config.path_separator)
    }

    /// Replaces all data.
    pub fn reset(&mut self, data: OptionMap) {
        self.data = data;
    }

    pub fn all(&self) -> &OptionMap {
        &self.data
    }

    /// Owned snapshot of the data.
    pub fn to_array(&self) -> OptionMap {
        self.data.clone()
    }

    /// JSON snapshot of the data, identical in content to [`Options::to_array`].
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of top-level entries.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, OptionValue> {
        self.data.iter()
    }

    /// Content hash of the data: empty for empty data, otherwise the hex
    /// SHA-256 digest of its JSON serialization.
    pub fn hash(&self) -> Result<String> {
        if self.data.is_empty() {
            return Ok(String::new());
        }
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the prototype declared for `key`.
    pub fn prototype(&self, key: &str) -> Result<&Prototype> {
        self.schema
            .get(key)
            .ok_or_else(|| Error::OptionPrototypeNotFound {
                option: key.to_string(),
            })
    }

    /// Replaces the schema after validating every entry.
    ///
    /// Each entry must be a mapping whose keys are prototype fields, and
    /// each field must satisfy its meta-prototype. The first violation
    /// aborts the call and leaves the current schema in place.
    pub fn set_schema(&mut self, schema: OptionMap) -> Result<()> {
        let mut parsed = Schema::with_capacity(schema.len());
        for (option, candidate) in &schema {
            let prototype = match candidate {
                OptionValue::Map(entry) => Prototype::from_map(option, entry)?,
                OptionValue::Array(items) if items.is_empty() => Prototype::default(),
                // List positions are keys, and never prototype fields.
                OptionValue::Array(_) => {
                    return Err(Error::InvalidPrototypeKey {
                        option: option.clone(),
                        key: "0".to_string(),
                    })
                }
                _ => {
                    return Err(Error::InvalidPrototype {
                        option: option.clone(),
                    })
                }
            };
            parsed.insert(option.clone(), prototype);
        }

        debug!(options = parsed.len(), "installed schema");
        self.schema = parsed;
        Ok(())
    }

    /// Declares or replaces the prototype of a single option.
    pub fn define(&mut self, key: impl Into<String>, prototype: Prototype) {
        self.schema.insert(key.into(), prototype);
    }

    /// Reads every top-level key through the schema.
    ///
    /// Does nothing when either the data or the schema is empty.
    pub fn validate(&self) -> Result<&Self> {
        if !self.is_empty() && !self.schema.is_empty() {
            for key in self.data.keys() {
                self.get(key)?;
            }
            debug!(options = self.data.len(), "validated options");
        }
        Ok(self)
    }

    /// Returns true if `value` loosely equals one of `allowed`.
    pub fn is_valid_value(&self, value: &OptionValue, allowed: &[OptionValue]) -> bool {
        validator::is_valid_value(value, allowed)
    }
}

fn json_map(value: serde_json::Value, what: &str) -> Result<OptionMap> {
    match OptionValue::from(value) {
        OptionValue::Null => Ok(OptionMap::new()),
        OptionValue::Map(map) => Ok(map),
        other => Err(Error::InvalidData(format!(
            "{} must be an object, got {}",
            what,
            other.type_name()
        ))),
    }
}

impl Index<&str> for Options {
    type Output = OptionValue;

    /// Raw lookup without validation; missing keys read as null.
    fn index(&self, key: &str) -> &OptionValue {
        path::lookup(&self.data, key, self.config.path_separator).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = indexmap::map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.data)
    }
}

impl OptionObject for Options {
    fn class_name(&self) -> &str {
        "Options"
    }

    fn to_json(&self) -> serde_json::Value {
        Options::to_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn work_options() -> Options {
        Options::from_json(
            json!({
                "project": "options",
                "secondOption": "second",
                "trueOption": true,
                "falseOption": false,
                "fruits": ["apple", "banana", "mango"],
            }),
            json!({
                "project": {"types": "string"},
                "firstOption": {"nullable": true, "default": "first", "types": "string"},
                "secondOption": {"types": "string"},
                "trueOption": {"types": "boolean"},
                "falseOption": {"types": "boolean"},
                "fruits": {"types": "array"},
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_get_declared_options() {
        let options = work_options();
        assert_eq!(options.get("firstOption").unwrap(), OptionValue::from("first"));
        assert_eq!(options.get("secondOption").unwrap(), OptionValue::from("second"));
        assert_eq!(options.get("trueOption").unwrap(), OptionValue::Bool(true));
        assert_eq!(options.get("falseOption").unwrap(), OptionValue::Bool(false));
    }

    #[test]
    fn test_get_rejects_empty_and_undeclared_keys() {
        let options = work_options();
        assert!(matches!(options.get(""), Err(Error::NoKeySupplied)));
        match options.get("cars") {
            Err(Error::InvalidOption { option, valid }) => {
                assert_eq!(option, "cars");
                assert!(valid.starts_with("project | firstOption"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_schema_less_reads() {
        let mut options = Options::new();
        options.set("anything", 3);
        assert_eq!(options.get("anything").unwrap(), OptionValue::from(3));
        assert_eq!(options.get("missing").unwrap(), OptionValue::Null);
    }

    #[test]
    fn test_override_prototype() {
        let options = work_options();
        let strict = Prototype::new().with_types("integer");
        assert!(matches!(
            options.get_with("project", Some(&strict)),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            options.get_with("undeclared", Some(&strict)),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_set_forget_and_count() {
        let mut options = work_options();
        assert_eq!(options.count(), 5);

        options.set("newFruit", "melon");
        assert!(options.has("newFruit"));
        assert_eq!(options["newFruit"], OptionValue::from("melon"));
        assert_eq!(options.count(), 6);

        assert_eq!(options.forget("newFruit"), Some(OptionValue::from("melon")));
        assert!(!options.has("newFruit"));
        assert_eq!(options["newFruit"], OptionValue::Null);
        assert_eq!(options.count(), 5);

        options.reset(OptionMap::new());
        assert!(options.is_empty());
        assert_eq!(options.len(), 0);
    }

    #[test]
    fn test_nested_paths() {
        let mut options = Options::new();
        options.set("database.host", "localhost");
        assert_eq!(options.count(), 1);
        assert!(options.has("database.host"));
        assert_eq!(options.get("database.host").unwrap(), OptionValue::from("localhost"));

        let mut flat = Options::with_config(OptionsConfig::flat());
        flat.set("database.host", "localhost");
        assert!(flat.has("database.host"));
        assert!(!flat.has("database"));
    }

    #[test]
    fn test_hash() {
        assert_eq!(Options::new().hash().unwrap(), "");

        let a = work_options();
        let b = work_options();
        let hash = a.hash().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, b.hash().unwrap());

        let mut c = work_options();
        c.set("project", "other");
        assert_ne!(hash, c.hash().unwrap());
    }

    #[test]
    fn test_prototype_lookup() {
        let options = work_options();
        assert_eq!(options.schema().len(), 6);
        assert_eq!(
            options.prototype("firstOption").unwrap().default,
            OptionValue::from("first")
        );
        assert!(matches!(
            options.prototype("cars"),
            Err(Error::OptionPrototypeNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_set_schema_keeps_previous_schema() {
        let mut options = work_options();
        let bad = json_map(json!({"ok": {"types": "string"}, "bad": "string"}), "schema").unwrap();
        assert!(matches!(
            options.set_schema(bad),
            Err(Error::InvalidPrototype { ref option }) if option == "bad"
        ));
        assert_eq!(options.schema().len(), 6);

        options.set_schema(OptionMap::new()).unwrap();
        assert!(options.schema().is_empty());
        assert_eq!(options.get("cars").unwrap(), OptionValue::Null);
    }

    #[test]
    fn test_list_prototype_reports_first_position() {
        let mut options = Options::new();
        let schema = json_map(json!({"mode": ["string"], "empty": []}), "schema").unwrap();
        match options.set_schema(schema) {
            Err(Error::InvalidPrototypeKey { option, key }) => {
                assert_eq!(option, "mode");
                assert_eq!(key, "0");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let schema = json_map(json!({"empty": []}), "schema").unwrap();
        options.set_schema(schema).unwrap();
        assert_eq!(options.prototype("empty").unwrap(), &Prototype::default());
    }

    #[test]
    fn test_validate() {
        let mut options = work_options();
        assert!(options.validate().is_ok());

        options.set("trueOption", "maybe");
        assert!(matches!(options.validate(), Err(Error::InvalidType { .. })));

        options.forget("trueOption");
        options.set("stray", 1);
        assert!(matches!(options.validate(), Err(Error::InvalidOption { .. })));
    }

    #[test]
    fn test_defines() {
        let options = work_options();
        assert!(options.defines("firstOption"));
        assert!(options.defines("project"));
        assert!(!options.defines("cars"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(matches!(
            Options::from_json(json!([1, 2]), json!(null)),
            Err(Error::InvalidData(_))
        ));
    }
}
