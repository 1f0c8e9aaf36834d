//! Identifier checks applied before a descriptor is built.
//!
//! Names end up inside metadata identifiers, so the identifier delimiters
//! (`#`, `?`, `@`) are never allowed in any of them.

use crate::{MAX_NAME_LEN, SchemaError};

const ID_DELIMITERS: [char; 3] = ['#', '?', '@'];

/// Ensure a field name is a plain identifier.
pub fn validate_field_name(name: &str) -> Result<(), SchemaError> {
    validate_common(name)?;

    let mut chars = name.chars();
    if chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(SchemaError::invalid_name(name, "must not start with a digit"));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(SchemaError::invalid_name(
            name,
            "field names may only contain letters, digits, '_' and '$'",
        ));
    }

    Ok(())
}

/// Ensure a (possibly qualified) type name can be embedded in an identifier.
pub fn validate_type_name(name: &str) -> Result<(), SchemaError> {
    validate_common(name)?;

    if name.starts_with('.') || name.ends_with('.') {
        return Err(SchemaError::invalid_name(
            name,
            "qualified names must not start or end with '.'",
        ));
    }

    Ok(())
}

/// Ensure a source path can be embedded in an identifier.
pub fn validate_source_path(path: &str) -> Result<(), SchemaError> {
    validate_common(path)
}

fn validate_common(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::invalid_name(name, "name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(SchemaError::invalid_name(
            name,
            format!("exceeds max length {MAX_NAME_LEN}"),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(SchemaError::invalid_name(name, "contains whitespace"));
    }
    if let Some(c) = name.chars().find(|c| ID_DELIMITERS.contains(c)) {
        return Err(SchemaError::invalid_name(
            name,
            format!("contains reserved character '{c}'"),
        ));
    }

    Ok(())
}
