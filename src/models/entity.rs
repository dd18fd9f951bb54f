//! Data-model definitions discovered in module sources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Field kinds recognized in a model definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Char,
    Text,
    Html,
    Integer,
    Float,
    Monetary,
    Boolean,
    Date,
    Datetime,
    Binary,
    Image,
    Selection,
    Reference,
    Many2one,
    One2many,
    Many2many,
}

impl FieldType {
    /// Look up a field constructor name such as `Many2one`
    pub fn from_name(name: &str) -> Option<Self> {
        let field_type = match name {
            "Char" => FieldType::Char,
            "Text" => FieldType::Text,
            "Html" => FieldType::Html,
            "Integer" => FieldType::Integer,
            "Float" => FieldType::Float,
            "Monetary" => FieldType::Monetary,
            "Boolean" => FieldType::Boolean,
            "Date" => FieldType::Date,
            "Datetime" => FieldType::Datetime,
            "Binary" => FieldType::Binary,
            "Image" => FieldType::Image,
            "Selection" => FieldType::Selection,
            "Reference" => FieldType::Reference,
            "Many2one" => FieldType::Many2one,
            "One2many" => FieldType::One2many,
            "Many2many" => FieldType::Many2many,
            _ => return None,
        };
        Some(field_type)
    }

    /// Relational kinds that point at a target model
    pub fn is_relational(&self) -> bool {
        matches!(self, FieldType::Many2one | FieldType::One2many | FieldType::Many2many)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Char => "Char",
            FieldType::Text => "Text",
            FieldType::Html => "Html",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Monetary => "Monetary",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::Datetime => "Datetime",
            FieldType::Binary => "Binary",
            FieldType::Image => "Image",
            FieldType::Selection => "Selection",
            FieldType::Reference => "Reference",
            FieldType::Many2one => "Many2one",
            FieldType::One2many => "One2many",
            FieldType::Many2many => "Many2many",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field declared on a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Target model of a relational field
    pub comodel_name: Option<String>,
    pub related: Option<String>,
    /// Name of the method computing this field
    pub compute: Option<String>,
    pub store: bool,
    pub required: bool,
    pub readonly: bool,
    /// Human label
    pub string: String,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            comodel_name: None,
            related: None,
            compute: None,
            store: true,
            required: false,
            readonly: false,
            string: String::new(),
        }
    }
}

/// A model definition found in a module's sources
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    /// Declared or resolved model name; empty when it could not be resolved
    pub name: String,
    pub inherit: Vec<String>,
    /// Delegated parent model -> link field
    pub inherits: BTreeMap<String, String>,
    pub description: String,
    pub fields: BTreeMap<String, Field>,
    pub methods: Vec<String>,
    /// Name of the module that defines it
    pub module: String,
    pub file_path: PathBuf,
}

/// A relational link from one model to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub target: String,
}

/// Aggregate counts over a set of models
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub total_models: usize,
    pub total_fields: usize,
    pub relation_fields: usize,
    pub computed_fields: usize,
    pub avg_fields_per_model: f64,
}
