pub mod identifier;
pub mod normalization;
pub mod validation;

pub use validation::{
    is_valid_birth_date, validate_email, validate_person, Field, FieldErrorKind, FieldErrors,
    ValidationOptions,
};
