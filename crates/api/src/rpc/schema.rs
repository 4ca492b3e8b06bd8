//! Declarative value schemas.
//!
//! One [`Schema`] value drives three things: input validation at the adapter
//! boundary, string coercion for query-string inputs, and the JSON Schema
//! emitted into the OpenAPI document. Keeping them in one type is what stops
//! the validator and the docs from drifting apart.

use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    DateTime,
    Uuid,
}

impl StringFormat {
    fn as_str(self) -> &'static str {
        match self {
            StringFormat::DateTime => "date-time",
            StringFormat::Uuid => "uuid",
        }
    }

    fn accepts(self, s: &str) -> bool {
        match self {
            StringFormat::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            StringFormat::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub required: bool,
}

pub fn field(name: &'static str, schema: Schema) -> Field {
    Field {
        name,
        schema,
        required: true,
    }
}

pub fn optional(name: &'static str, schema: Schema) -> Field {
    Field {
        name,
        schema,
        required: false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String(StringSchema),
    Boolean,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Array(Box<Schema>),
    Object(Vec<Field>),
    /// A reusable schema, emitted once under `components.schemas`.
    Named(&'static str, Box<Schema>),
}

/// A single validation failure, located by its path into the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String(StringSchema::default())
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn integer() -> Self {
        Schema::Integer {
            minimum: None,
            maximum: None,
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Schema::Object(fields.into_iter().collect())
    }

    pub fn named(name: &'static str, schema: Schema) -> Self {
        Schema::Named(name, Box::new(schema))
    }

    pub fn min_length(mut self, n: usize) -> Self {
        if let Schema::String(s) = &mut self {
            s.min_length = Some(n);
        }
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        if let Schema::String(s) = &mut self {
            s.max_length = Some(n);
        }
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        if let Schema::String(s) = &mut self {
            s.format = Some(format);
        }
        self
    }

    /// Object fields, looking through named wrappers.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Schema::Object(fields) => Some(fields),
            Schema::Named(_, inner) => inner.fields(),
            _ => None,
        }
    }

    /// JSON Schema for this schema. Named schemas are recorded in `defs` and
    /// referenced via `$ref`.
    pub fn to_json_schema(&self, defs: &mut Map<String, Value>) -> Value {
        match self {
            Schema::String(s) => {
                let mut out = json!({ "type": "string" });
                if let Some(n) = s.min_length {
                    out["minLength"] = json!(n);
                }
                if let Some(n) = s.max_length {
                    out["maxLength"] = json!(n);
                }
                if let Some(f) = s.format {
                    out["format"] = json!(f.as_str());
                }
                out
            }
            Schema::Boolean => json!({ "type": "boolean" }),
            Schema::Integer { minimum, maximum } => {
                let mut out = json!({ "type": "integer" });
                if let Some(n) = minimum {
                    out["minimum"] = json!(n);
                }
                if let Some(n) = maximum {
                    out["maximum"] = json!(n);
                }
                out
            }
            Schema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_schema(defs),
            }),
            Schema::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for f in fields {
                    properties.insert(f.name.to_string(), f.schema.to_json_schema(defs));
                    if f.required {
                        required.push(json!(f.name));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
            Schema::Named(name, inner) => {
                if !defs.contains_key(*name) {
                    let rendered = inner.to_json_schema(defs);
                    defs.insert(name.to_string(), rendered);
                }
                json!({ "$ref": format!("#/components/schemas/{name}") })
            }
        }
    }

    /// Validate `value`, returning it with unknown object keys stripped.
    pub fn parse(&self, value: Value) -> Result<Value, Vec<Issue>> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let parsed = self.parse_at(value, &mut path, &mut issues);
        if issues.is_empty() {
            Ok(parsed)
        } else {
            Err(issues)
        }
    }

    fn parse_at(&self, value: Value, path: &mut Vec<String>, issues: &mut Vec<Issue>) -> Value {
        match self {
            Schema::String(s) => {
                let Value::String(text) = &value else {
                    issues.push(Issue::new(path.clone(), format!("Expected string, received {}", type_name(&value))));
                    return value;
                };
                // UTF-16 code units, as JSON Schema validators in browsers count them.
                let len = text.encode_utf16().count();
                if let Some(min) = s.min_length {
                    if len < min {
                        issues.push(Issue::new(
                            path.clone(),
                            format!("String must contain at least {min} character(s)"),
                        ));
                    }
                }
                if let Some(max) = s.max_length {
                    if len > max {
                        issues.push(Issue::new(
                            path.clone(),
                            format!("String must contain at most {max} character(s)"),
                        ));
                    }
                }
                if let Some(f) = s.format {
                    if !f.accepts(text) {
                        issues.push(Issue::new(path.clone(), format!("Invalid {}", f.as_str())));
                    }
                }
                value
            }
            Schema::Boolean => {
                if !value.is_boolean() {
                    issues.push(Issue::new(path.clone(), format!("Expected boolean, received {}", type_name(&value))));
                }
                value
            }
            Schema::Integer { minimum, maximum } => {
                let Some(n) = value.as_i64() else {
                    issues.push(Issue::new(path.clone(), format!("Expected integer, received {}", type_name(&value))));
                    return value;
                };
                if minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max) {
                    issues.push(Issue::new(path.clone(), "Number out of range"));
                }
                value
            }
            Schema::Array(items) => {
                let Value::Array(elements) = value else {
                    issues.push(Issue::new(path.clone(), format!("Expected array, received {}", type_name(&value))));
                    return value;
                };
                let parsed = elements
                    .into_iter()
                    .enumerate()
                    .map(|(i, element)| {
                        path.push(i.to_string());
                        let parsed = items.parse_at(element, path, issues);
                        path.pop();
                        parsed
                    })
                    .collect();
                Value::Array(parsed)
            }
            Schema::Object(fields) => {
                let Value::Object(mut map) = value else {
                    issues.push(Issue::new(path.clone(), format!("Expected object, received {}", type_name(&value))));
                    return value;
                };
                let mut out = Map::new();
                for f in fields {
                    path.push(f.name.to_string());
                    match map.remove(f.name) {
                        Some(v) => {
                            let parsed = f.schema.parse_at(v, path, issues);
                            out.insert(f.name.to_string(), parsed);
                        }
                        None if f.required => issues.push(Issue::new(path.clone(), "Required")),
                        None => {}
                    }
                    path.pop();
                }
                Value::Object(out)
            }
            Schema::Named(_, inner) => inner.parse_at(value, path, issues),
        }
    }

    /// Best-effort conversion of string leaves (as found in query strings) to
    /// the types the schema expects. Anything unconvertible is left as-is for
    /// [`Schema::parse`] to report.
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (Schema::Boolean, Value::String(s)) => {
                let parsed = match s.as_str() {
                    "true" | "on" | "1" => Some(true),
                    "false" | "off" | "0" => Some(false),
                    _ => None,
                };
                parsed.map_or(Value::String(s), Value::Bool)
            }
            (Schema::Integer { .. }, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => Value::String(s),
            },
            (Schema::Array(items), Value::Array(elements)) => {
                Value::Array(elements.into_iter().map(|e| items.coerce(e)).collect())
            }
            (Schema::Array(items), other) if !other.is_null() => {
                Value::Array(vec![items.coerce(other)])
            }
            (Schema::Object(fields), Value::Object(mut map)) => {
                for f in fields {
                    if let Some(v) = map.remove(f.name) {
                        map.insert(f.name.to_string(), f.schema.coerce(v));
                    }
                }
                Value::Object(map)
            }
            (Schema::Named(_, inner), value) => inner.coerce(value),
            (_, value) => value,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
