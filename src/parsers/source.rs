//! Model definition parser for module sources
//!
//! Recognizes a fixed set of shapes inside class bodies and ignores
//! everything else:
//!
//! - `_name = '...'`, `_inherit = '...'` or a list/tuple of names,
//!   `_inherits = {...}`, `_description = '...'`
//! - field declarations `attr = ns.Type(...)` where `Type` is a known field type
//! - method definitions (`def` and `async def`)

use super::literal::{literal_value, Value};
use super::python::node_kinds::{
    ARGUMENT_LIST, ASSIGNMENT, ATTRIBUTE, CALL, CLASS_DEFINITION, DECORATED_DEFINITION,
    EXPRESSION_STATEMENT, FUNCTION_DEFINITION, IDENTIFIER, KEYWORD_ARGUMENT,
};
use super::python::{named_children, node_text, parse_python, strip_bom, SyntaxError};
use crate::models::entity::{Field, FieldType, Model};
use std::path::Path;
use tree_sitter::Node;

/// A class recognized as a model definition
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub class_name: String,
    pub model: Model,
}

impl ModelDefinition {
    /// Mapping key: the model name, or the class name when it could not be resolved
    pub fn key(&self) -> &str {
        if self.model.name.is_empty() {
            &self.class_name
        } else {
            &self.model.name
        }
    }
}

/// Parse a source file and return its model definitions in source order
pub fn parse_models(
    source: &str,
    module: &str,
    file_path: &Path,
) -> Result<Vec<ModelDefinition>, SyntaxError> {
    let source = strip_bom(source);
    let tree = parse_python(source)?;
    let mut definitions = Vec::new();
    collect_classes(&tree.root_node(), source, module, file_path, &mut definitions);
    Ok(definitions)
}

/// Visit every class definition, nested ones included, in source order
fn collect_classes(
    node: &Node,
    source: &str,
    module: &str,
    file_path: &Path,
    definitions: &mut Vec<ModelDefinition>,
) {
    if node.kind() == CLASS_DEFINITION {
        if let Some(definition) = read_class(node, source, module, file_path) {
            definitions.push(definition);
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_classes(&child, source, module, file_path, definitions);
    }
}

fn read_class(node: &Node, source: &str, module: &str, file_path: &Path) -> Option<ModelDefinition> {
    let class_name = node_text(&node.child_by_field_name("name")?, source);
    let body = node.child_by_field_name("body")?;

    let mut model = Model {
        module: module.to_string(),
        file_path: file_path.to_path_buf(),
        ..Default::default()
    };
    read_class_body(&named_children(&body), source, &mut model).then(|| ModelDefinition {
        class_name: class_name.to_string(),
        model,
    })
}

/// Fill `model` from direct class body statements; returns whether the class is a model
fn read_class_body(body: &[Node], source: &str, model: &mut Model) -> bool {
    let mut is_model = false;

    for statement in body {
        if let Some(method) = method_name(statement, source) {
            model.methods.push(method.to_string());
            continue;
        }

        let Some((targets, value)) = split_assignment(statement, source) else {
            continue;
        };

        for target in targets {
            match target {
                "_name" => {
                    model.name = string_value(&value, source);
                    is_model = true;
                }
                "_inherit" => {
                    if let Some(inherit) = inherit_value(&value, source) {
                        model.inherit = inherit;
                        is_model = true;
                    }
                }
                "_inherits" => {
                    if let Ok(Value::Dict(entries)) = literal_value(&value, source) {
                        model.inherits = entries
                            .iter()
                            .filter_map(|(k, v)| {
                                let key = constant_string(k);
                                (!key.is_empty()).then(|| (key, constant_string(v)))
                            })
                            .collect();
                    }
                }
                "_description" => model.description = string_value(&value, source),
                attr => {
                    if let Some(field) = parse_field(attr, &value, source) {
                        model.fields.insert(attr.to_string(), field);
                        is_model = true;
                    }
                }
            }
        }
    }

    if model.name.is_empty() && !model.inherit.is_empty() {
        // Extending a single model keeps its name; several parents leave it unresolved
        if let [only] = model.inherit.as_slice() {
            model.name = only.clone();
        }
        is_model = true;
    }

    is_model
}

/// Name of a method defined by this statement, decorated or not
fn method_name<'s>(statement: &Node, source: &'s str) -> Option<&'s str> {
    let function = match statement.kind() {
        FUNCTION_DEFINITION => *statement,
        DECORATED_DEFINITION => statement
            .child_by_field_name("definition")
            .filter(|definition| definition.kind() == FUNCTION_DEFINITION)?,
        _ => return None,
    };
    Some(node_text(&function.child_by_field_name("name")?, source))
}

/// Split `a = b = value` into its plain-name targets and the value node
fn split_assignment<'t, 's>(statement: &Node<'t>, source: &'s str) -> Option<(Vec<&'s str>, Node<'t>)> {
    if statement.kind() != EXPRESSION_STATEMENT {
        return None;
    }
    let mut current = match named_children(statement).as_slice() {
        [only] if only.kind() == ASSIGNMENT => *only,
        _ => return None,
    };

    let mut targets = Vec::new();
    loop {
        let left = current.child_by_field_name("left")?;
        if left.kind() != IDENTIFIER {
            return None;
        }
        targets.push(node_text(&left, source));

        let right = current.child_by_field_name("right")?;
        if right.kind() == ASSIGNMENT {
            current = right;
        } else {
            return Some((targets, right));
        }
    }
}

/// String rendering of a constant; empty for falsy or non-constant values
fn constant_string(value: &Value) -> String {
    match value {
        Value::List(_) | Value::Tuple(_) | Value::Set(_) | Value::Dict(_) => String::new(),
        v if v.is_truthy() => v.to_python_str(),
        _ => String::new(),
    }
}

fn string_value(node: &Node, source: &str) -> String {
    literal_value(node, source)
        .map(|value| constant_string(&value))
        .unwrap_or_default()
}

fn inherit_value(node: &Node, source: &str) -> Option<Vec<String>> {
    match literal_value(node, source).ok()? {
        Value::Str(name) => Some(vec![name]),
        Value::List(items) | Value::Tuple(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Parse `ns.Type(args...)` into a field when `Type` is a known field type
fn parse_field(name: &str, value: &Node, source: &str) -> Option<Field> {
    if value.kind() != CALL {
        return None;
    }
    let function = value.child_by_field_name("function")?;
    if function.kind() != ATTRIBUTE {
        return None;
    }
    let namespace = function.child_by_field_name("object")?;
    let type_name = function.child_by_field_name("attribute")?;
    if namespace.kind() != IDENTIFIER {
        return None;
    }
    let field_type = FieldType::from_name(node_text(&type_name, source))?;

    let mut field = Field::new(name, field_type);
    let mut keyword_target = false;
    let mut first_positional = None;

    let arguments = value
        .child_by_field_name("arguments")
        .filter(|arguments| arguments.kind() == ARGUMENT_LIST)
        .map(|arguments| named_children(&arguments))
        .unwrap_or_default();

    for argument in &arguments {
        if argument.kind() != KEYWORD_ARGUMENT {
            first_positional.get_or_insert(*argument);
            continue;
        }
        let (Some(keyword), Some(argument_value)) = (
            argument.child_by_field_name("name"),
            argument.child_by_field_name("value"),
        ) else {
            continue;
        };

        let text = || Some(string_value(&argument_value, source)).filter(|s| !s.is_empty());
        let flag = || {
            literal_value(&argument_value, source)
                .map(|v| v.is_truthy())
                .unwrap_or(false)
        };
        match node_text(&keyword, source) {
            "comodel_name" => {
                field.comodel_name = text();
                keyword_target = true;
            }
            "related" => field.related = text(),
            "compute" => field.compute = text(),
            "store" => field.store = flag(),
            "required" => field.required = flag(),
            "readonly" => field.readonly = flag(),
            "string" => field.string = string_value(&argument_value, source),
            _ => {}
        }
    }

    if field_type.is_relational() && !keyword_target {
        if let Some(Ok(Value::Str(target))) = first_positional.map(|node| literal_value(&node, source)) {
            field.comodel_name = Some(target);
        }
    }

    Some(field)
}
