/// Types for catalog course records
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Separator between the primary room and a secondary location in `classroom`.
const ROOM_DELIMITER: &str = " - ";

/// Leading numeric prefix of a free-text credit value (e.g. "3", "2.5學分", "1e2").
static CREDIT_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").unwrap());

/// One catalog offering (a class section).
///
/// Field names follow the static catalog JSON. Fields the engine does not
/// interpret are kept in `extra` so persisted snapshots hold the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "course_code", deserialize_with = "lenient_string")]
    pub code: String,

    #[serde(rename = "course_name_zh", default, deserialize_with = "lenient_string")]
    pub name_local: String,

    #[serde(rename = "course_name_en", default, deserialize_with = "lenient_string")]
    pub name_foreign: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub department: String,

    /// e.g. "必修", "選修"; matched by substring
    #[serde(rename = "course_type", default, deserialize_with = "lenient_string")]
    pub category: String,

    #[serde(default)]
    pub credits: Credits,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub instructor: Option<String>,

    /// May embed a secondary location after `" - "`
    #[serde(rename = "classroom", default, deserialize_with = "lenient_opt_string")]
    pub room: Option<String>,

    /// Free text that may embed a grade token (一..六)
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub offering_unit: Option<String>,

    /// Primary time encoding, e.g. "13,14"
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub class_time: Option<String>,

    /// Fallback time encoding, used when `class_time` is absent or invalid
    #[serde(rename = "enrollment", default, deserialize_with = "lenient_opt_string")]
    pub alt_class_time: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Course {
    /// Creates a course with only a code and local name set.
    pub fn new(code: impl Into<String>, name_local: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name_local: name_local.into(),
            name_foreign: String::new(),
            department: String::new(),
            category: String::new(),
            credits: Credits::default(),
            instructor: None,
            room: None,
            offering_unit: None,
            class_time: None,
            alt_class_time: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The room without any secondary location suffix.
    pub fn primary_room(&self) -> Option<&str> {
        self.room
            .as_deref()
            .and_then(|room| room.split(ROOM_DELIMITER).next())
            .map(str::trim)
            .filter(|room| !room.is_empty())
    }

    pub fn instructor_name(&self) -> &str {
        self.instructor.as_deref().unwrap_or_default()
    }

    pub fn offering_unit(&self) -> &str {
        self.offering_unit.as_deref().unwrap_or_default()
    }
}

/// Scalar JSON value as text. `null` and structured values give `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accepts any JSON value for a text field; non-text values become empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Credit value as it appears in the catalog: a number, free text, or
/// anything else (counted as zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credits {
    Number(f64),
    Text(String),
    /// `null`, booleans or structured values; counts as zero
    Other(Value),
}

impl Credits {
    /// Numeric value of the credits. Anything unparseable counts as zero.
    pub fn value(&self) -> f64 {
        match self {
            Credits::Number(n) if n.is_finite() => *n,
            Credits::Number(_) => 0.0,
            Credits::Text(text) => CREDIT_PREFIX_REGEX
                .find(text)
                .and_then(|m| m.as_str().trim().parse::<f64>().ok())
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            Credits::Other(_) => 0.0,
        }
    }
}

impl Default for Credits {
    fn default() -> Self {
        Credits::Number(0.0)
    }
}

impl From<f64> for Credits {
    fn from(value: f64) -> Self {
        Credits::Number(value)
    }
}

impl From<&str> for Credits {
    fn from(value: &str) -> Self {
        Credits::Text(value.to_string())
    }
}
