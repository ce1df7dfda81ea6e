//! Graph interchange: a JSON dump of a finished element graph.
//!
//! Links between elements and TypeInfo are written as arena indices, so the
//! dump of a recursive schema stays finite.
//!
//! ```json
//! {
//!   "elements": [
//!     { "id": 1, "kind": "compound", "name": "Node", "parent": 0,
//!       "type_info": 1, "children": [2], "bases": [], "derived": [] }
//!   ],
//!   "type_infos": [
//!     { "id": 1, "arity": "[1,1]", "shape": "class", "fields": { "children": 2 } }
//!   ]
//! }
//! ```

use serde_json::{Map, Value as Json, json};

use crate::element::{Element, ElementData, ElementGraph, ElementId};
use crate::item::Value;
use crate::types::{Shape, TypeInfo, TypeInfoId};

impl ElementGraph {
    /// Dump every element and every TypeInfo as a JSON document.
    pub fn to_json(&self) -> Json {
        let elements: Vec<Json> = self
            .elements()
            .map(|(id, element)| element_json(id, element))
            .collect();
        let type_infos: Vec<Json> = self
            .type_infos()
            .iter()
            .map(|(id, info)| type_info_json(id, info))
            .collect();
        json!({
            "elements": elements,
            "type_infos": type_infos,
        })
    }
}

fn element_json(id: ElementId, element: &Element) -> Json {
    let mut obj = Map::new();
    obj.insert("id".to_string(), json!(id.index()));
    obj.insert("kind".to_string(), json!(element.kind().as_str()));
    if let Some(name) = element.name() {
        obj.insert("name".to_string(), json!(name));
    }
    if let Some(parent) = element.parent() {
        obj.insert("parent".to_string(), json!(parent.index()));
    }
    obj.insert("type_info".to_string(), json!(element.type_info().index()));
    if element.is_definition() {
        obj.insert("is_definition".to_string(), json!(true));
    }

    if !element.metadata().is_empty() {
        let metadata: Map<String, Json> = element
            .metadata()
            .iter()
            .map(|(key, value)| (key.to_string(), value_json(value)))
            .collect();
        obj.insert("metadata".to_string(), Json::Object(metadata));
    }
    if !element.attribute_names().is_empty() {
        obj.insert(
            "attribute_names".to_string(),
            json!(element.attribute_names().iter().map(|n| n.as_str()).collect::<Vec<_>>()),
        );
    }
    if !element.extensions().is_empty() {
        obj.insert("extensions".to_string(), ids(element.extensions()));
    }

    match element.data() {
        ElementData::Fundamental { fundamental } => {
            obj.insert("fundamental".to_string(), json!(fundamental.keyword()));
        }
        ElementData::Compound {
            children,
            definitions,
            bases,
            derived,
        } => {
            obj.insert("children".to_string(), ids(children));
            obj.insert("definitions".to_string(), ids(definitions));
            obj.insert("bases".to_string(), ids(bases));
            obj.insert("derived".to_string(), ids(derived));
        }
        ElementData::Simple {
            attributes,
            fundamental_attribute_name,
        } => {
            obj.insert("attributes".to_string(), ids(attributes));
            obj.insert(
                "fundamental_attribute_name".to_string(),
                json!(fundamental_attribute_name.as_str()),
            );
        }
        ElementData::Variant { variations } => {
            obj.insert("variations".to_string(), ids(variations));
        }
        ElementData::Reference { reference } | ElementData::List { reference } => {
            obj.insert("reference".to_string(), json!(reference.index()));
        }
        ElementData::Extension { arguments } => {
            obj.insert(
                "arguments".to_string(),
                Json::Array(arguments.iter().map(value_json).collect()),
            );
        }
        ElementData::Any | ElementData::Custom => {}
    }
    Json::Object(obj)
}

fn type_info_json(id: TypeInfoId, info: &TypeInfo) -> Json {
    let mut obj = Map::new();
    obj.insert("id".to_string(), json!(id.index()));
    obj.insert("arity".to_string(), json!(info.arity.to_string()));
    match &info.shape {
        Shape::Fundamental(fundamental) => {
            obj.insert("shape".to_string(), json!("fundamental"));
            obj.insert("type".to_string(), json!(fundamental.ty.keyword()));
            let constraints: Map<String, Json> = fundamental
                .constraints
                .iter()
                .map(|(key, value)| (key.to_string(), value_json(value)))
                .collect();
            obj.insert("constraints".to_string(), Json::Object(constraints));
        }
        Shape::Class(class) => {
            obj.insert("shape".to_string(), json!("class"));
            obj.insert(
                "bases".to_string(),
                json!(class.bases.iter().map(|b| b.index()).collect::<Vec<_>>()),
            );
            let fields: Map<String, Json> = class
                .fields
                .iter()
                .map(|(name, field)| (name.to_string(), json!(field.index())))
                .collect();
            obj.insert("fields".to_string(), Json::Object(fields));
        }
        Shape::AnyOf(alternatives) => {
            obj.insert("shape".to_string(), json!("any_of"));
            obj.insert(
                "alternatives".to_string(),
                json!(alternatives.iter().map(|a| a.index()).collect::<Vec<_>>()),
            );
        }
        Shape::Ref(target) => {
            obj.insert("shape".to_string(), json!("ref"));
            obj.insert("target".to_string(), json!(target.index()));
        }
        Shape::Any => {
            obj.insert("shape".to_string(), json!("any"));
        }
        Shape::Custom => {
            obj.insert("shape".to_string(), json!("custom"));
        }
        Shape::Extension => {
            obj.insert("shape".to_string(), json!("extension"));
        }
    }
    Json::Object(obj)
}

fn ids(ids: &[ElementId]) -> Json {
    json!(ids.iter().map(|id| id.index()).collect::<Vec<_>>())
}

fn value_json(value: &Value) -> Json {
    json!(value)
}
