// Options module
//
// This module provides the runtime options container and its validation
// rules. It includes:
//
// 1. Dynamic option values and named object types
// 2. The type token system and coercion-and-match procedure
// 3. Prototypes and the meta-schema used to validate them
// 4. Validated reads of a single option
// 5. Nested key path addressing
// 6. The options container itself

// Re-export public types and functions
pub use self::container::{Options, OptionsConfig, Schema};
pub use self::path::OptionMap;
pub use self::prototype::{Prototype, PrototypeField};
pub use self::types::OptionType;
pub use self::validator::{is_valid_value, OptionValidator};
pub use self::value::{OptionObject, OptionValue};

// Sub-modules
pub mod container;
pub mod path;
pub mod prototype;
pub mod types;
pub mod validator;
pub mod value;
