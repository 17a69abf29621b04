use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a species class as reported by the service.
///
/// The service is free to key classes by integer index or by name, so both
/// forms are accepted and compared as opaque keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassId {
    Index(i64),
    Key(String),
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassId::Index(idx) => write!(f, "{idx}"),
            ClassId::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for ClassId {
    fn from(value: i64) -> Self {
        ClassId::Index(value)
    }
}

impl From<&str> for ClassId {
    fn from(value: &str) -> Self {
        ClassId::Key(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class_id: ClassId,
    pub species: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesClass {
    pub id: ClassId,
    pub name: String,
}
