//! Generation schemas: the JSON shapes a constrained Gemini call must emit.
//!
//! A `GenerationSchema` serializes straight into Gemini's `responseSchema`
//! wire format. Every schema the service sends comes out of `schema_for`,
//! so the prompt templates and the response shapes stay in one place.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Primitive kinds understood by the backend's schema dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
}

impl SchemaType {
    fn wire_name(self) -> &'static str {
        match self {
            SchemaType::Object => "OBJECT",
            SchemaType::Array => "ARRAY",
            SchemaType::String => "STRING",
            SchemaType::Integer => "INTEGER",
            SchemaType::Number => "NUMBER",
        }
    }
}

/// A node of the schema tree. Property order is preserved on the wire
/// through `propertyOrdering`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSchema {
    kind: SchemaType,
    properties: Vec<(String, GenerationSchema)>,
    items: Option<Box<GenerationSchema>>,
    required: Vec<String>,
}

impl GenerationSchema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn array(items: GenerationSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    pub fn object() -> Self {
        Self::leaf(SchemaType::Object)
    }

    /// Adds an optional property. Re-adding a name replaces it in place.
    pub fn property(mut self, name: &str, schema: GenerationSchema) -> Self {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = schema,
            None => self.properties.push((name.to_string(), schema)),
        }
        self
    }

    /// Adds a property and marks it required.
    pub fn required_property(self, name: &str, schema: GenerationSchema) -> Self {
        let mut schema = self.property(name, schema);
        if !schema.required.iter().any(|r| r == name) {
            schema.required.push(name.to_string());
        }
        schema
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
impl GenerationSchema {
    pub fn kind(&self) -> SchemaType {
        self.kind
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl Serialize for GenerationSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.wire_name())?;

        if !self.properties.is_empty() {
            map.serialize_entry("properties", &OrderedProperties(&self.properties))?;
            let ordering: Vec<&str> = self.property_names().collect();
            map.serialize_entry("propertyOrdering", &ordering)?;
        }
        if let Some(items) = &self.items {
            map.serialize_entry("items", items.as_ref())?;
        }
        if !self.required.is_empty() {
            map.serialize_entry("required", &self.required)?;
        }
        map.end()
    }
}

struct OrderedProperties<'a>(&'a [(String, GenerationSchema)]);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Every constrained response shape the service asks the backend for.
/// Resume analysis is deliberately absent: it runs unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    InterviewQuestions,
    GradingResult,
    JobMatch,
}

pub fn schema_for(kind: SchemaKind) -> GenerationSchema {
    match kind {
        SchemaKind::InterviewQuestions => GenerationSchema::array(
            GenerationSchema::object()
                .required_property("questionId", GenerationSchema::integer())
                .required_property("questionText", GenerationSchema::string())
                .required_property("hint", GenerationSchema::string()),
        ),
        SchemaKind::GradingResult => GenerationSchema::object()
            .required_property("totalScore", GenerationSchema::integer())
            .required_property(
                "questionScores",
                GenerationSchema::array(
                    GenerationSchema::object()
                        .required_property("questionId", GenerationSchema::integer())
                        .required_property("score", GenerationSchema::integer())
                        .required_property("feedback", GenerationSchema::string()),
                ),
            )
            .required_property("generalFeedback", GenerationSchema::string())
            .required_property("improvementSuggestions", GenerationSchema::string()),
        SchemaKind::JobMatch => GenerationSchema::object()
            .required_property("score", GenerationSchema::number())
            .required_property("analysis", GenerationSchema::string())
            .required_property("strengths", GenerationSchema::string())
            .required_property("improvements", GenerationSchema::string()),
    }
}
