//! Composite validator shapes: arrays and objects.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::constraints::ItemBounds;
use super::{type_mismatch, Validator};
use crate::error::{Issue, IssueKind};
use crate::schema_utils::build_path;

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ArrayShape {
    pub items: Box<Validator>,
    pub bounds: ItemBounds,
}

impl ArrayShape {
    pub(crate) fn parse_at(&self, value: &Value, path: &str) -> Result<Value, Vec<Issue>> {
        let Some(items) = value.as_array() else {
            return Err(vec![type_mismatch("array", value, path)]);
        };

        let mut issues = Vec::new();
        self.bounds.check(items.len(), path, &mut issues);

        let mut parsed = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = build_path(path, &[&i.to_string()]);
            match self.items.parse_at(item, &item_path) {
                Ok(v) => parsed.push(v),
                Err(mut item_issues) => issues.append(&mut item_issues),
            }
        }

        if issues.is_empty() {
            Ok(Value::Array(parsed))
        } else {
            Err(issues)
        }
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// One declared property of an object validator.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub validator: Validator,
    /// Named in the schema's `required` list.
    pub required: bool,
}

/// What happens to keys not declared in `properties`.
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    /// Unchecked and left out of the parsed value (no `additionalProperties`).
    #[default]
    Ignore,
    /// Rejected (`additionalProperties: false`).
    Reject,
    /// Validated against a catch-all schema and kept.
    Schema(Box<Validator>),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    properties: Vec<Property>,
    /// Property name → position in `properties`.
    index: HashMap<String, usize>,
    additional: AdditionalProperties,
}

impl ObjectShape {
    pub fn new(properties: Vec<Property>, additional: AdditionalProperties) -> Self {
        let index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            properties,
            index,
            additional,
        }
    }

    /// Declared properties, in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    pub fn additional(&self) -> &AdditionalProperties {
        &self.additional
    }

    pub(crate) fn parse_at(&self, value: &Value, path: &str) -> Result<Value, Vec<Issue>> {
        let Some(obj) = value.as_object() else {
            return Err(vec![type_mismatch("object", value, path)]);
        };

        let mut issues = Vec::new();
        let mut parsed = Map::new();

        for prop in &self.properties {
            let prop_path = build_path(path, &[&prop.name]);
            match obj.get(&prop.name) {
                Some(v) => match prop.validator.parse_at(v, &prop_path) {
                    Ok(p) => {
                        parsed.insert(prop.name.clone(), p);
                    }
                    Err(mut prop_issues) => issues.append(&mut prop_issues),
                },
                None if prop.required && !prop.validator.accepts_absent() => {
                    issues.push(Issue::new(
                        &prop_path,
                        IssueKind::Missing,
                        format!("required property '{}' is missing", prop.name),
                    ));
                }
                None => {}
            }
        }

        for (key, v) in obj {
            if self.index.contains_key(key) {
                continue;
            }
            match &self.additional {
                AdditionalProperties::Ignore => {}
                AdditionalProperties::Reject => {
                    issues.push(Issue::new(
                        &build_path(path, &[key]),
                        IssueKind::UnknownProperty { name: key.clone() },
                        format!("unrecognized property '{}'", key),
                    ));
                }
                AdditionalProperties::Schema(catch_all) => {
                    match catch_all.parse_at(v, &build_path(path, &[key])) {
                        Ok(p) => {
                            parsed.insert(key.clone(), p);
                        }
                        Err(mut extra_issues) => issues.append(&mut extra_issues),
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(parsed))
        } else {
            Err(issues)
        }
    }
}
