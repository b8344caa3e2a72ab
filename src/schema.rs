// src/schema.rs
//! Output-shape contract for the analysis response.
//!
//! The schema is described once, independent of any provider, then rendered
//! into the provider's dialect for the request and used again to check the
//! response structurally.

use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Object,
    Array,
    Integer,
    String,
}

impl FieldKind {
    fn provider_name(&self) -> &'static str {
        match self {
            FieldKind::Object => "OBJECT",
            FieldKind::Array => "ARRAY",
            FieldKind::Integer => "INTEGER",
            FieldKind::String => "STRING",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::String => value.is_string(),
        }
    }

    fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: &'static str,
    pub required: bool,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: FieldKind,
    pub description: Option<&'static str>,
    pub properties: Vec<Property>,
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    fn leaf(kind: FieldKind, description: &'static str) -> Self {
        Self {
            kind,
            description: Some(description),
            properties: Vec::new(),
            items: None,
        }
    }

    pub fn integer(description: &'static str) -> Self {
        Self::leaf(FieldKind::Integer, description)
    }

    pub fn string(description: &'static str) -> Self {
        Self::leaf(FieldKind::String, description)
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: FieldKind::Array,
            description: None,
            properties: Vec::new(),
            items: Some(Box::new(items)),
        }
    }

    /// An object whose properties are all required.
    pub fn object(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        Self {
            kind: FieldKind::Object,
            description: None,
            properties: properties
                .into_iter()
                .map(|(name, schema)| Property {
                    name,
                    required: true,
                    schema,
                })
                .collect(),
            items: None,
        }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().filter(|p| p.required).map(|p| p.name)
    }

    /// Renders the OpenAPI subset Gemini accepts as `responseSchema`.
    pub fn to_provider_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".into(), json!(self.kind.provider_name()));
        if let Some(description) = self.description {
            node.insert("description".into(), json!(description));
        }
        if self.kind == FieldKind::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|p| (p.name.to_string(), p.schema.to_provider_json()))
                .collect();
            node.insert("properties".into(), Value::Object(properties));
            node.insert(
                "required".into(),
                json!(self.required_fields().collect::<Vec<_>>()),
            );
        }
        if let Some(items) = &self.items {
            node.insert("items".into(), items.to_provider_json());
        }
        Value::Object(node)
    }

    /// Structural check of `value`; the error names the offending path.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), String> {
        if !self.kind.matches(value) {
            return Err(format!(
                "{}: expected {:?}, found {}",
                path,
                self.kind,
                FieldKind::describe(value)
            ));
        }

        if let Some(object) = value.as_object() {
            for property in &self.properties {
                let child_path = format!("{}.{}", path, property.name);
                match object.get(property.name) {
                    Some(child) => property.schema.validate_at(&child_path, child)?,
                    None if property.required => {
                        return Err(format!("{}: required field is missing", child_path));
                    }
                    None => {}
                }
            }
        }

        if let (Some(items), Some(elements)) = (&self.items, value.as_array()) {
            for (index, element) in elements.iter().enumerate() {
                items.validate_at(&format!("{}[{}]", path, index), element)?;
            }
        }

        Ok(())
    }
}

pub fn metric_schema() -> SchemaNode {
    SchemaNode::object(vec![
        (
            "name",
            SchemaNode::string("The name of the metric being evaluated (e.g., 'Message Clarity')."),
        ),
        (
            "score",
            SchemaNode::integer("A score from 0 to 10 for this specific metric."),
        ),
        (
            "diagnostic",
            SchemaNode::string("A brief, objective diagnosis of why this score was given."),
        ),
        (
            "improvement",
            SchemaNode::string("A concrete, actionable suggestion for how to improve this metric."),
        ),
    ])
}

pub fn analysis_schema() -> SchemaNode {
    SchemaNode::object(vec![
        (
            "overallScore",
            SchemaNode::integer(
                "A score from 0 to 100 representing the overall effectiveness of the ad creative.",
            ),
        ),
        ("metrics", SchemaNode::array(metric_schema())),
        (
            "aiSuggestion",
            SchemaNode::string(
                "A comprehensive summary of the analysis, written in a helpful and constructive tone.",
            ),
        ),
        (
            "suggestedTitle",
            SchemaNode::string("A suggested, improved headline for the ad."),
        ),
        (
            "suggestedSubtitle",
            SchemaNode::string("A suggested, improved subtitle or body text for the ad."),
        ),
        (
            "suggestedCTA",
            SchemaNode::string("A suggested, improved Call to Action for the ad."),
        ),
        (
            "finalObservations",
            SchemaNode::string(
                "Final thoughts or strategic observations about the creative's potential and how to unlock it.",
            ),
        ),
    ])
}
