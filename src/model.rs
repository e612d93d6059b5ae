use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// A single submitted value. Upstream stores loosely-typed JSON-like data, so
/// every shape a form widget can produce has a variant here.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A native date value (callers building records in Rust).
    Date(NaiveDateTime),
    Array(Vec<Value>),
    Object(SubmissionRecord),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&SubmissionRecord> {
        match self {
            Value::Object(rec) => Some(rec),
            _ => None,
        }
    }

    /// Null, empty string or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<SubmissionRecord> for Value {
    fn from(rec: SubmissionRecord) -> Self {
        Value::Object(rec)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Key → value mapping of one form submission. Insertion order is preserved
/// because synthesized blueprints and sub-blocks render in record order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmissionRecord {
    entries: IndexMap<String, Value>,
}

impl SubmissionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Non-blank string/number value of `key`, as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(crate::format::format_number(*n)),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a JSON document whose top level must be an object.
    pub fn from_json_str(input: &str) -> Result<Self, crate::Error> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        match Value::from(json) {
            Value::Object(rec) => Ok(rec),
            _ => Err(crate::Error::Record(
                "top-level JSON value must be an object".to_string(),
            )),
        }
    }
}

impl FromIterator<(String, Value)> for SubmissionRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Date,
    Email,
    Url,
    Array,
    Object,
    Boolean,
    Number,
    Currency,
    Textarea,
    File,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    pub depends_on: String,
    pub required_value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub section_title: String,
    pub conditional: Option<Conditional>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpec {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpecialHandling {
    pub rent_assurance_note: bool,
    pub director_handling: bool,
}

/// Structure of one rendered document. Resolved once per render.
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub title: String,
    pub sections: Vec<SectionSpec>,
    pub special_handling: SpecialHandling,
}

impl Blueprint {
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }
}

/// Output of one render: the serialized document plus pagination facts.
#[derive(Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub page_breaks: usize,
    pub filename: String,
}
