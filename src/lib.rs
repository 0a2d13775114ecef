// proto-options library entry point
//
// A runtime options container: string keys mapped to dynamic values, with an
// optional per-key prototype describing required-ness, nullability, default,
// accepted types and accepted values.

pub mod internal;
pub mod options;

pub use crate::internal::error::{Error, Result};
pub use crate::options::{
    OptionMap, OptionObject, OptionType, OptionValue, Options, OptionsConfig, Prototype,
    PrototypeField, Schema,
};
