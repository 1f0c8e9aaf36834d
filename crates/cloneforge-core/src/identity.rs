//! Metadata identifiers.
//!
//! Every unit the engine tracks is addressed by a string identifier:
//!
//! - class:    `MID:<kind>`
//! - instance: `MID:<kind>#<source-path>?<type>`
//! - member:   `MID:<kind>#<source-path>?<type>@<member>`
//!
//! Names are validated so that none of the delimiters can occur inside a
//! component, which makes creation and parsing an exact inverse pair.

use cloneforge_schema::{
    SchemaError,
    types::{TypeKey, TypeName},
    validate::{validate_field_name, validate_source_path, validate_type_name},
};
use derive_more::Display;
use serde::Serialize;
use std::{borrow::Borrow, borrow::Cow};
use thiserror::Error as ThisError;

pub const ID_PREFIX: &str = "MID:";

/// Source path of name-scoped identifiers, which match any declaring path.
pub const ANY_PATH: &str = "*";

///
/// IdentityError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IdentityError {
    #[error("invalid identifier component: {0}")]
    InvalidComponent(#[from] SchemaError),

    #[error("identifier '{id}' is not valid: {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },

    #[error("identifier '{id}' belongs to kind '{found}', expected '{expected}'")]
    KindMismatch {
        id: String,
        expected: ProducedKind,
        found: String,
    },
}

impl IdentityError {
    fn invalid(id: &str, reason: &'static str) -> Self {
        Self::InvalidIdentifier {
            id: id.to_string(),
            reason,
        }
    }
}

///
/// ProducedKind
///
/// Names the kind of metadata an identifier refers to.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProducedKind(Cow<'static, str>);

impl ProducedKind {
    /// Physical type descriptors maintained by the host.
    pub const PHYSICAL_TYPE: Self = Self::from_static("physical-type");

    /// Individual fields of a physical type.
    pub const FIELD: Self = Self::from_static("field");

    /// Generated copy-method units.
    pub const COPY: Self = Self::from_static("copy");

    /// Every type sharing a simple name, wherever it is declared.
    pub const TYPE_NAME: Self = Self::from_static("type-name");

    const fn from_static(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    pub fn new(kind: impl Into<String>) -> Result<Self, IdentityError> {
        let kind = kind.into();
        if !is_valid_kind(&kind) {
            return Err(IdentityError::invalid(&kind, "kind must be a non-empty word"));
        }

        Ok(Self(Cow::Owned(kind)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProducedKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

fn is_valid_kind(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

///
/// MetadataId
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MetadataId(String);

///
/// IdParts
///
/// Borrowed components of a parsed identifier.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IdParts<'a> {
    pub kind: &'a str,
    pub path: Option<&'a str>,
    pub type_name: Option<&'a str>,
    pub member: Option<&'a str>,
}

impl MetadataId {
    /// Identifier naming a whole kind rather than one instance of it.
    #[must_use]
    pub fn class(kind: &ProducedKind) -> Self {
        Self(format!("{ID_PREFIX}{kind}"))
    }

    /// Parse and validate an identifier string.
    pub fn parse(id: &str) -> Result<Self, IdentityError> {
        split(id)?;

        Ok(Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn parts(&self) -> IdParts<'_> {
        // identifiers are validated on construction
        split(&self.0).unwrap_or(IdParts {
            kind: "",
            path: None,
            type_name: None,
            member: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        self.parts().kind
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        self.parts().path.is_none()
    }

    #[must_use]
    pub fn member(&self) -> Option<&str> {
        self.parts().member
    }

    /// Type addressed by an instance or member identifier.
    #[must_use]
    pub fn type_key(&self) -> Option<TypeKey> {
        let parts = self.parts();

        Some(TypeKey::new(TypeName::new(parts.type_name?), parts.path?))
    }

    /// The instance of another kind addressing the same type and source path.
    /// Class and member identifiers have no such counterpart.
    #[must_use]
    pub fn with_kind(&self, kind: &ProducedKind) -> Option<Self> {
        let parts = self.parts();
        if parts.member.is_some() {
            return None;
        }

        Some(Self(format!(
            "{ID_PREFIX}{kind}#{}?{}",
            parts.path?, parts.type_name?
        )))
    }
}

fn split(id: &str) -> Result<IdParts<'_>, IdentityError> {
    let rest = id
        .strip_prefix(ID_PREFIX)
        .ok_or_else(|| IdentityError::invalid(id, "missing 'MID:' prefix"))?;

    let Some((kind, instance)) = rest.split_once('#') else {
        if !is_valid_kind(rest) {
            return Err(IdentityError::invalid(id, "invalid kind"));
        }
        return Ok(IdParts {
            kind: rest,
            path: None,
            type_name: None,
            member: None,
        });
    };
    if !is_valid_kind(kind) {
        return Err(IdentityError::invalid(id, "invalid kind"));
    }

    let (path, tail) = instance
        .split_once('?')
        .ok_or_else(|| IdentityError::invalid(id, "missing '?' before the type name"))?;
    let (type_name, member) = match tail.split_once('@') {
        Some((type_name, member)) => (type_name, Some(member)),
        None => (tail, None),
    };

    if validate_source_path(path).is_err() {
        return Err(IdentityError::invalid(id, "invalid source path"));
    }
    if validate_type_name(type_name).is_err() {
        return Err(IdentityError::invalid(id, "invalid type name"));
    }
    if member.is_some_and(|m| validate_field_name(m).is_err()) {
        return Err(IdentityError::invalid(id, "invalid member name"));
    }

    Ok(IdParts {
        kind,
        path: Some(path),
        type_name: Some(type_name),
        member,
    })
}

///
/// IdScheme
///
/// Creates and parses the instance identifiers of one produced kind.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdScheme {
    kind: ProducedKind,
}

impl IdScheme {
    #[must_use]
    pub const fn new(kind: ProducedKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub const fn kind(&self) -> &ProducedKind {
        &self.kind
    }

    #[must_use]
    pub fn class_id(&self) -> MetadataId {
        MetadataId::class(&self.kind)
    }

    pub fn create(&self, key: &TypeKey) -> Result<MetadataId, IdentityError> {
        validate_type_name(&key.name)?;
        validate_source_path(&key.path)?;

        Ok(MetadataId(format!(
            "{ID_PREFIX}{}#{}?{}",
            self.kind, key.path, key.name
        )))
    }

    pub fn create_member(&self, key: &TypeKey, member: &str) -> Result<MetadataId, IdentityError> {
        validate_field_name(member)?;
        let instance = self.create(key)?;

        Ok(MetadataId(format!("{instance}@{member}")))
    }

    /// Recover the type and source path of an instance identifier.
    pub fn parse(&self, id: &MetadataId) -> Result<TypeKey, IdentityError> {
        let parts = split(id.as_str())?;
        if parts.kind != self.kind.as_str() {
            return Err(IdentityError::KindMismatch {
                id: id.to_string(),
                expected: self.kind.clone(),
                found: parts.kind.to_string(),
            });
        }
        if parts.member.is_some() {
            return Err(IdentityError::invalid(
                id.as_str(),
                "member identifiers do not name an instance",
            ));
        }

        id.type_key().ok_or_else(|| {
            IdentityError::invalid(id.as_str(), "class identifiers do not name an instance")
        })
    }

    #[must_use]
    pub fn is_valid(&self, id: &str) -> bool {
        split(id).is_ok_and(|parts| {
            parts.kind == self.kind.as_str() && parts.path.is_some() && parts.member.is_none()
        })
    }
}

/// Identifier of a physical type descriptor.
pub fn type_id(key: &TypeKey) -> Result<MetadataId, IdentityError> {
    IdScheme::new(ProducedKind::PHYSICAL_TYPE).create(key)
}

/// Identifier of one field of a physical type.
pub fn field_id(key: &TypeKey, field: &str) -> Result<MetadataId, IdentityError> {
    IdScheme::new(ProducedKind::FIELD).create_member(key, field)
}

/// Identifier standing for every type that shares the simple name of `name`.
/// Resolving a name reads this identifier whether or not a type was found,
/// so a type appearing later under that name still notifies the reader.
pub fn type_name_id(name: &TypeName) -> Result<MetadataId, IdentityError> {
    let raw = TypeName::new(name.raw());

    IdScheme::new(ProducedKind::TYPE_NAME).create(&TypeKey::new(raw.simple_name(), ANY_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key() -> TypeKey {
        TypeKey::new("com.example.Person", "src/main/java")
    }

    #[test]
    fn instance_identifiers_have_stable_shape() {
        let scheme = IdScheme::new(ProducedKind::COPY);
        let id = scheme.create(&key()).expect("identifier should be created");

        assert_eq!(id.as_str(), "MID:copy#src/main/java?com.example.Person");
        assert_eq!(scheme.parse(&id).expect("identifier should parse"), key());
        assert!(scheme.is_valid(id.as_str()));
        assert!(!id.is_class());
    }

    #[test]
    fn identifiers_are_scoped_by_kind() {
        let copy = IdScheme::new(ProducedKind::COPY);
        let id = type_id(&key()).expect("identifier should be created");

        assert!(!copy.is_valid(id.as_str()), "foreign kinds are not valid");
        assert!(matches!(
            copy.parse(&id),
            Err(IdentityError::KindMismatch { .. })
        ));

        let mapped = id
            .with_kind(&ProducedKind::COPY)
            .expect("instance identifiers map across kinds");
        assert_eq!(mapped, copy.create(&key()).expect("identifier"));
    }

    #[test]
    fn member_identifiers_carry_the_field() {
        let id = field_id(&key(), "age").expect("identifier should be created");

        assert_eq!(id.as_str(), "MID:field#src/main/java?com.example.Person@age");
        assert_eq!(id.member(), Some("age"));
        assert_eq!(id.type_key(), Some(key()));
        assert!(id.with_kind(&ProducedKind::COPY).is_none());
    }

    #[test]
    fn name_identifiers_ignore_package_and_generics() {
        let qualified = type_name_id(&TypeName::new("com.example.Customer"))
            .expect("identifier should be created");
        let simple = type_name_id(&TypeName::new("Customer")).expect("identifier");
        let generic =
            type_name_id(&TypeName::new("crate::model::Customer<T>")).expect("identifier");

        assert_eq!(qualified.as_str(), "MID:type-name#*?Customer");
        assert_eq!(qualified, simple);
        assert_eq!(qualified, generic);
    }

    #[test]
    fn class_identifiers_have_no_instance() {
        let id = MetadataId::class(&ProducedKind::COPY);

        assert_eq!(id.as_str(), "MID:copy");
        assert!(id.is_class());
        assert!(id.type_key().is_none());
        assert!(!IdScheme::new(ProducedKind::COPY).is_valid(id.as_str()));
    }

    #[test]
    fn rejects_components_containing_delimiters() {
        let scheme = IdScheme::new(ProducedKind::COPY);

        assert!(scheme.create(&TypeKey::new("a?b", "src")).is_err());
        assert!(scheme.create(&TypeKey::new("A", "src#main")).is_err());
        assert!(ProducedKind::new("bad kind").is_err());
        assert!(MetadataId::parse("copy#src?A").is_err());
        assert!(MetadataId::parse("MID:copy#src").is_err());
    }

    proptest! {
        #[test]
        fn create_and_parse_are_inverse(
            segments in prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,8}", 1..4),
            path in "[a-z][a-z0-9/_.-]{0,16}",
        ) {
            let key = TypeKey::new(segments.join("."), path.as_str());
            let scheme = IdScheme::new(ProducedKind::COPY);

            let id = scheme.create(&key).expect("generated names are valid");
            prop_assert!(scheme.is_valid(id.as_str()));
            prop_assert_eq!(scheme.parse(&id).expect("identifier parses"), key);
            prop_assert_eq!(MetadataId::parse(id.as_str()).expect("identifier parses"), id);
        }
    }
}
