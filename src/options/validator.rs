// Option value resolution
//
// This module applies a prototype to the stored value of one option:
// required and null checks, default substitution, type coercion and
// matching, and allowed-value membership.

use tracing::{debug, trace};

use crate::internal::error::{Error, Result};
use crate::options::prototype::Prototype;
use crate::options::types::{coerce_and_match, join_types};
use crate::options::value::OptionValue;

/// Applies one prototype to one option.
#[derive(Debug)]
pub struct OptionValidator<'a> {
    option: &'a str,
    prototype: &'a Prototype,
}

impl<'a> OptionValidator<'a> {
    pub fn new(option: &'a str, prototype: &'a Prototype) -> Self {
        Self { option, prototype }
    }

    /// Resolves the option from `stored`, the entry found in the data.
    ///
    /// Returns the stored value, possibly coerced, or the prototype default
    /// when nothing is stored. When the prototype does not throw, violations
    /// are logged and the best-effort value is returned.
    pub fn resolve(&self, stored: Option<&OptionValue>) -> Result<OptionValue> {
        let prototype = self.prototype;

        // Check required-ness before substituting the default
        if prototype.required && stored.is_none() {
            self.violation(Error::AbsentRequiredOption {
                option: self.option.to_string(),
            })?;
        }

        let mut value = stored.cloned().unwrap_or_else(|| prototype.default.clone());

        match value.value_type() {
            // Null only answers to `nullable`
            None => {
                if !prototype.nullable {
                    self.violation(Error::NullOption {
                        option: self.option.to_string(),
                    })?;
                }
            }
            Some(mut tag) => {
                // Match declared types, coercing in place
                let original = value.clone();
                if !coerce_and_match(&mut value, &mut tag, &prototype.types) {
                    self.violation(Error::InvalidType {
                        option: self.option.to_string(),
                        expected: join_types(&prototype.types),
                        got: original.type_name(),
                        value: (!original.is_compound()).then(|| original.to_string()),
                    })?;
                }

                // Check membership against the coerced value
                if !prototype.values.is_empty() && !is_valid_value(&value, &prototype.values) {
                    self.violation(Error::InvalidValue {
                        option: self.option.to_string(),
                        allowed: join_values(&prototype.values),
                        value: value.to_string(),
                    })?;
                }
            }
        }

        trace!(option = self.option, value = %value, "resolved option");
        Ok(value)
    }

    /// Raises `err` unless the prototype tolerates violations.
    fn violation(&self, err: Error) -> Result<()> {
        if self.prototype.throw_exception {
            return Err(err);
        }
        debug!(option = self.option, error = %err, "tolerated option violation");
        Ok(())
    }
}

/// Returns true if `value` loosely equals one of `allowed`.
pub fn is_valid_value(value: &OptionValue, allowed: &[OptionValue]) -> bool {
    allowed.iter().any(|candidate| value.loosely_equals(candidate))
}

fn join_values(values: &[OptionValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
