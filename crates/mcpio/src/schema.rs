//! Structural JSON schema construction.
//!
//! Three paths produce the same [`Schema`] shape:
//!
//! - [`generate_schema`] reflects over a type deriving
//!   [`schemars::JsonSchema`].
//! - [`dynamic_schema`] assembles an object schema from a runtime list of
//!   [`FieldDef`]s, for shapes only known at runtime (script inspection and
//!   the like).
//! - [`object_schema`] builds a flat object whose properties are all strings.
//!
//! Nothing here validates values against a schema.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rmcp::model::JsonObject;
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Primitive JSON type of a dynamically described field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// A JSON string
    String,
    /// A JSON number
    Number,
    /// `true` or `false`
    Boolean,
    /// A nested JSON object
    Object,
    /// A JSON array
    Array,
}

impl FieldType {
    /// The JSON schema `type` keyword for this field type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            other => Err(Error::schema(format!("unknown field type '{other}'"))),
        }
    }
}

/// Describes one property of a dynamically built object schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Property name
    pub name: String,
    /// JSON type of the property
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Whether the property appears in `required`
    #[serde(default)]
    pub required: bool,
    /// Allowed values; empty means unconstrained
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<String>,
}

impl FieldDef {
    /// Creates an optional, undescribed field.
    pub fn new<S: Into<String>>(name: S, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
            enum_values: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the field to the given values.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Derives an object schema from a statically declared type.
///
/// Fails when the type does not describe a JSON object, since tool inputs
/// must be objects.
pub fn generate_schema<T: JsonSchema>() -> Result<Schema> {
    let schema = schemars::schema_for!(T);
    match schema.as_object().and_then(|o| o.get("type")) {
        Some(Value::String(kind)) if kind == "object" => Ok(schema),
        Some(other) => Err(Error::schema(format!(
            "{} is not an object type (type: {other})",
            T::schema_name()
        ))),
        None => Err(Error::schema(format!(
            "{} has no single object type",
            T::schema_name()
        ))),
    }
}

/// Builds an object schema from field definitions.
///
/// Properties are keyed by name; a repeated name replaces the earlier
/// definition, including its entry in `required`. Required names keep the
/// position where they were first marked required.
pub fn dynamic_schema(fields: &[FieldDef]) -> Schema {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    for field in fields {
        properties.insert(
            field.name.clone(),
            property(field.kind.as_str(), &field.description, &field.enum_values),
        );

        if !field.required {
            required.retain(|name| name != &field.name);
        } else if !required.contains(&field.name) {
            required.push(field.name.clone());
        }
    }

    Schema::from(object(None, properties, required))
}

/// Builds a string schema with an optional enumeration.
pub fn string_schema<I, S>(description: &str, enum_values: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = enum_values.into_iter().map(Into::into).collect();
    match property("string", description, &values) {
        Value::Object(map) => Schema::from(map),
        _ => Schema::default(),
    }
}

/// Builds a flat object schema whose properties are all strings.
///
/// `properties` maps each name to its description. Names in `required`
/// that have no matching property are dropped.
pub fn object_schema<P, K, V, R>(description: &str, properties: P, required: R) -> Schema
where
    P: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let mut props = Map::new();
    for (name, desc) in properties {
        props.insert(name.into(), property("string", desc.as_ref(), &[]));
    }

    let mut names: Vec<String> = Vec::new();
    for name in required {
        let name = name.as_ref();
        if props.contains_key(name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    Schema::from(object(Some(description), props, names))
}

/// Schema for inputs that accept any JSON object.
pub fn open_object_schema() -> Schema {
    let mut map = Map::new();
    map.insert("type".into(), Value::from("object"));
    map.insert("additionalProperties".into(), Value::Bool(true));
    Schema::from(map)
}

/// Converts a schema into the object form carried by `rmcp::model::Tool`.
///
/// Boolean schemas become an empty object.
pub fn json_schema(schema: Schema) -> Arc<JsonObject> {
    match Value::from(schema) {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

fn property(kind: &str, description: &str, enum_values: &[String]) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::from(kind));
    if !description.is_empty() {
        map.insert("description".into(), Value::from(description));
    }
    if !enum_values.is_empty() {
        let values = enum_values.iter().cloned().map(Value::from).collect();
        map.insert("enum".into(), Value::Array(values));
    }
    Value::Object(map)
}

fn object(
    description: Option<&str>,
    properties: Map<String, Value>,
    required: Vec<String>,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::from("object"));
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        map.insert("description".into(), Value::from(description));
    }
    map.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        map.insert("required".into(), Value::from(required));
    }
    map
}
