use crate::{DEFAULT_SOURCE_PATH, SchemaError};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// Raw names (last path segment) treated as single-parameter collections.
const COMMON_COLLECTIONS: [&str; 17] = [
    "ArrayList",
    "BTreeSet",
    "BinaryHeap",
    "Collection",
    "HashSet",
    "LinkedHashSet",
    "LinkedList",
    "List",
    "NavigableSet",
    "PriorityQueue",
    "Queue",
    "Set",
    "SortedSet",
    "TreeSet",
    "Vec",
    "VecDeque",
    "Vector",
];

///
/// TypeName
///
/// Declared name of a type, qualified or not (`com.example.Person`,
/// `crate::model::Person`, `Person`).
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without generic arguments.
    #[must_use]
    pub fn raw(&self) -> &str {
        self.0.split_once('<').map_or(self.0.as_str(), |(raw, _)| raw)
    }

    /// Last path segment, keeping any generic arguments verbatim.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let raw = self.raw();
        let start = raw
            .rfind("::")
            .map(|i| i + 2)
            .or_else(|| raw.rfind('.').map(|i| i + 1))
            .unwrap_or(0);

        &self.0[start..]
    }

    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.raw().contains('.') || self.raw().contains("::")
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

///
/// SourcePath
///
/// Logical location of the physical source that declares a type.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct SourcePath(String);

impl SourcePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SourcePath {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_PATH)
    }
}

impl From<&str> for SourcePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourcePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

///
/// TypeKey
///
/// Identity of a type: its name plus the source path declaring it.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeKey {
    pub name: TypeName,
    pub path: SourcePath,
}

impl TypeKey {
    pub fn new(name: impl Into<TypeName>, path: impl Into<SourcePath>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

///
/// AnnotationName
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct AnnotationName(String);

impl AnnotationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Two fully qualified names must be equal; otherwise simple names are compared.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        if self.0.contains('.') && other.0.contains('.') {
            self.0 == other.0
        } else {
            self.simple_name() == other.simple_name()
        }
    }
}

impl From<&str> for AnnotationName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

///
/// Primitive
///
/// Value types copied by plain assignment. Covers the JVM primitives and the
/// Rust scalar types.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Primitive {
    #[display("bool")]
    Bool,
    #[display("boolean")]
    Boolean,
    #[display("byte")]
    Byte,
    #[display("char")]
    Char,
    #[display("double")]
    Double,
    #[display("f32")]
    F32,
    #[display("f64")]
    F64,
    #[display("float")]
    Float,
    #[display("i8")]
    I8,
    #[display("i16")]
    I16,
    #[display("i32")]
    I32,
    #[display("i64")]
    I64,
    #[display("i128")]
    I128,
    #[display("int")]
    Int,
    #[display("isize")]
    Isize,
    #[display("long")]
    Long,
    #[display("short")]
    Short,
    #[display("u8")]
    U8,
    #[display("u16")]
    U16,
    #[display("u32")]
    U32,
    #[display("u64")]
    U64,
    #[display("u128")]
    U128,
    #[display("usize")]
    Usize,
}

impl Primitive {
    /// Look up a primitive by its declared spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "double" => Self::Double,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "float" => Self::Float,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "int" => Self::Int,
            "isize" => Self::Isize,
            "long" => Self::Long,
            "short" => Self::Short,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "usize" => Self::Usize,
            _ => return None,
        };

        Some(primitive)
    }
}

///
/// FieldType
///
/// Declared type of a field. Generic types are only modelled structurally when
/// they are a common collection with exactly one element parameter; any other
/// generic type is kept as an opaque named reference.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FieldType {
    Primitive(Primitive),
    Named(TypeName),
    Collection {
        container: TypeName,
        element: Box<Self>,
    },
    Array(Box<Self>),
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(TypeName::new(name))
    }

    pub fn collection(container: impl Into<String>, element: Self) -> Self {
        Self::Collection {
            container: TypeName::new(container),
            element: Box::new(element),
        }
    }

    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    /// Element type of a single-parameter collection.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::Collection { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Named type referenced directly by this declaration, if any.
    #[must_use]
    pub const fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Render using simple (unqualified) names, as written inside a type body.
    #[must_use]
    pub fn simple_display(&self) -> String {
        match self {
            Self::Primitive(p) => p.to_string(),
            Self::Named(name) => name.simple_name().to_string(),
            Self::Collection { container, element } => {
                format!("{}<{}>", container.simple_name(), element.simple_display())
            }
            Self::Array(element) => format!("{}[]", element.simple_display()),
        }
    }

    fn parse(text: &str) -> Result<Self, SchemaError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SchemaError::invalid_type(text, "type is empty"));
        }

        // java arrays
        if let Some(inner) = text.strip_suffix("[]") {
            return Ok(Self::array(Self::parse(inner)?));
        }

        // rust arrays and slices
        if let Some(inner) = text.strip_prefix('[') {
            let Some(inner) = inner.strip_suffix(']') else {
                return Err(SchemaError::invalid_type(text, "unterminated array type"));
            };
            let element = inner.split(';').next().unwrap_or_default();

            return Ok(Self::array(Self::parse(element)?));
        }

        if let Some(open) = text.find('<') {
            let Some(args) = text[open + 1..].strip_suffix('>') else {
                return Err(SchemaError::invalid_type(text, "unterminated generic arguments"));
            };
            let raw = text[..open].trim();
            if raw.is_empty() {
                return Err(SchemaError::invalid_type(text, "generic type has no name"));
            }

            let args = split_top_level(text, args)?;
            if args.len() == 1 && is_common_collection(raw) {
                return Ok(Self::collection(raw, Self::parse(args[0])?));
            }

            let args = args.iter().map(|a| a.trim()).collect::<Vec<_>>().join(", ");

            return Ok(Self::named(format!("{raw}<{args}>")));
        }

        Ok(Primitive::from_name(text).map_or_else(|| Self::named(text), Self::Primitive))
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Collection { container, element } => write!(f, "{container}<{element}>"),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether a raw (argument-free) type name is a known single-parameter collection.
#[must_use]
pub fn is_common_collection(raw: &str) -> bool {
    let simple = raw
        .rsplit("::")
        .next()
        .and_then(|s| s.rsplit('.').next())
        .unwrap_or(raw)
        .trim();

    COMMON_COLLECTIONS.contains(&simple)
}

// split generic arguments on commas that are not nested inside <>
fn split_top_level<'a>(text: &str, args: &'a str) -> Result<Vec<&'a str>, SchemaError> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = Vec::new();

    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SchemaError::invalid_type(text, "unbalanced '>'"))?;
            }
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SchemaError::invalid_type(text, "unbalanced '<'"));
    }
    parts.push(&args[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(SchemaError::invalid_type(text, "empty generic argument"));
    }

    Ok(parts)
}
