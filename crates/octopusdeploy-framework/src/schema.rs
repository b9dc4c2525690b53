//! Resource schemas
//!
//! A [`Schema`] declares the attributes and nested blocks of a resource,
//! data source or provider configuration, and validates configuration
//! values against them.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};

use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use crate::plan::PlanModifier;
use crate::validators::{ValidationRequest, Validator};
use crate::value::Value;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrType {
    String,
    Number,
    /// Whole number (a `number` to Terraform)
    Int64,
    Bool,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    Map(Box<AttrType>),
    Object(BTreeMap<String, AttrType>),
}

impl AttrType {
    pub fn list_of(element: AttrType) -> Self {
        AttrType::List(Box::new(element))
    }

    pub fn set_of(element: AttrType) -> Self {
        AttrType::Set(Box::new(element))
    }

    pub fn map_of(element: AttrType) -> Self {
        AttrType::Map(Box::new(element))
    }

    /// Terraform JSON type notation
    pub fn to_json(&self) -> JsonValue {
        match self {
            AttrType::String => json!("string"),
            AttrType::Number | AttrType::Int64 => json!("number"),
            AttrType::Bool => json!("bool"),
            AttrType::List(element) => json!(["list", element.to_json()]),
            AttrType::Set(element) => json!(["set", element.to_json()]),
            AttrType::Map(element) => json!(["map", element.to_json()]),
            AttrType::Object(fields) => {
                let fields: serde_json::Map<String, JsonValue> = fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", fields])
            }
        }
    }

    /// Whether a value fits this type; null and unknown always fit
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null | Value::Unknown) => true,
            (AttrType::String, Value::String(_)) => true,
            (AttrType::Number, Value::Number(_)) => true,
            (AttrType::Int64, Value::Number(n)) => n.as_i64().is_some(),
            (AttrType::Bool, Value::Bool(_)) => true,
            (AttrType::List(element) | AttrType::Set(element), Value::List(items) | Value::Set(items)) => {
                items.iter().all(|item| element.conforms(item))
            }
            (AttrType::Map(element), Value::Map(entries) | Value::Object(entries)) => {
                entries.values().all(|item| element.conforms(item))
            }
            (AttrType::Object(fields), Value::Object(entries)) => {
                entries.keys().all(|k| fields.contains_key(k))
                    && fields
                        .iter()
                        .all(|(name, ty)| ty.conforms(entries.get(name).unwrap_or(&Value::Null)))
            }
            _ => false,
        }
    }

    /// Reshape a conforming value into this type's canonical form
    pub fn normalize(&self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (_, Value::Unknown) => Value::Unknown,
            (AttrType::List(element), Value::List(items) | Value::Set(items)) => {
                Value::List(items.into_iter().map(|i| element.normalize(i)).collect())
            }
            (AttrType::Set(element), Value::List(items) | Value::Set(items)) => {
                Value::Set(items.into_iter().map(|i| element.normalize(i)).collect())
            }
            (AttrType::Map(element), Value::Map(entries) | Value::Object(entries)) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, element.normalize(v)))
                    .collect(),
            ),
            (AttrType::Object(fields), Value::Object(mut entries)) => Value::Object(
                fields
                    .iter()
                    .map(|(name, ty)| {
                        let v = entries.remove(name).unwrap_or(Value::Null);
                        (name.clone(), ty.normalize(v))
                    })
                    .collect(),
            ),
            (_, other) => other,
        }
    }
}

/// A single attribute
#[derive(Clone)]
pub struct Attribute {
    pub ty: AttrType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Planned when the configuration leaves the attribute null
    pub default: Option<Value>,
    pub deprecation_message: Option<String>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("ty", &self.ty)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .finish()
    }
}

impl Attribute {
    fn with_flags(ty: AttrType, required: bool, optional: bool, computed: bool) -> Self {
        Self {
            ty,
            description: String::new(),
            required,
            optional,
            computed,
            sensitive: false,
            default: None,
            deprecation_message: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    pub fn required(ty: AttrType) -> Self {
        Self::with_flags(ty, true, false, false)
    }

    pub fn optional(ty: AttrType) -> Self {
        Self::with_flags(ty, false, true, false)
    }

    pub fn computed(ty: AttrType) -> Self {
        Self::with_flags(ty, false, false, true)
    }

    pub fn optional_computed(ty: AttrType) -> Self {
        Self::with_flags(ty, false, true, true)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Default value; implies computed
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.computed = true;
        self
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = Some(message.into());
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.plan_modifiers.push(Arc::new(modifier));
        self
    }

    /// Set only by the provider
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn to_json(&self) -> JsonValue {
        let mut out = serde_json::Map::new();
        out.insert("type".into(), self.ty.to_json());
        if !self.description.is_empty() {
            out.insert("description".into(), json!(self.description));
        }
        for (flag, set) in [
            ("required", self.required),
            ("optional", self.optional),
            ("computed", self.computed),
            ("sensitive", self.sensitive),
        ] {
            if set {
                out.insert(flag.into(), json!(true));
            }
        }
        if self.deprecation_message.is_some() {
            out.insert("deprecated".into(), json!(true));
        }
        JsonValue::Object(out)
    }
}

/// How nested block elements are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingMode {
    List,
    Set,
}

/// A nested block (`phase { ... }`)
#[derive(Debug, Clone)]
pub struct Block {
    pub nesting: NestingMode,
    pub min_items: usize,
    pub max_items: Option<usize>,
    pub schema: Schema,
}

impl Block {
    pub fn list(schema: Schema) -> Self {
        Self {
            nesting: NestingMode::List,
            min_items: 0,
            max_items: None,
            schema,
        }
    }

    pub fn set(schema: Schema) -> Self {
        Self {
            nesting: NestingMode::Set,
            min_items: 0,
            max_items: None,
            schema,
        }
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = min;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    fn empty(&self) -> Value {
        match self.nesting {
            NestingMode::List => Value::List(Vec::new()),
            NestingMode::Set => Value::Set(Vec::new()),
        }
    }
}

/// Attributes, nested blocks and object-level validators
#[derive(Clone, Default)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub deprecation_message: Option<String>,
    pub attributes: IndexMap<String, Attribute>,
    pub blocks: IndexMap<String, Block>,
    pub validators: Vec<Arc<dyn Validator>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("version", &self.version)
            .field("attributes", &self.attributes)
            .field("blocks", &self.blocks)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = Some(message.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn block(mut self, name: impl Into<String>, block: Block) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Object-level validator, run after attribute validation
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Terraform JSON schema notation (`terraform providers schema -json`)
    pub fn to_json(&self) -> JsonValue {
        let mut out = serde_json::Map::new();
        out.insert("version".into(), json!(self.version));
        out.insert("block".into(), self.block_json());
        JsonValue::Object(out)
    }

    fn block_json(&self) -> JsonValue {
        let mut block = serde_json::Map::new();
        if !self.attributes.is_empty() {
            let attributes: serde_json::Map<String, JsonValue> = self
                .attributes
                .iter()
                .map(|(name, attr)| (name.clone(), attr.to_json()))
                .collect();
            block.insert("attributes".into(), JsonValue::Object(attributes));
        }
        if !self.blocks.is_empty() {
            let block_types: serde_json::Map<String, JsonValue> = self
                .blocks
                .iter()
                .map(|(name, nested)| {
                    let mut entry = serde_json::Map::new();
                    entry.insert(
                        "nesting_mode".into(),
                        json!(match nested.nesting {
                            NestingMode::List => "list",
                            NestingMode::Set => "set",
                        }),
                    );
                    entry.insert("block".into(), nested.schema.block_json());
                    if nested.min_items > 0 {
                        entry.insert("min_items".into(), json!(nested.min_items));
                    }
                    if let Some(max) = nested.max_items {
                        entry.insert("max_items".into(), json!(max));
                    }
                    (name.clone(), JsonValue::Object(entry))
                })
                .collect();
            block.insert("block_types".into(), JsonValue::Object(block_types));
        }
        if !self.description.is_empty() {
            block.insert("description".into(), json!(self.description));
        }
        if self.deprecation_message.is_some() {
            block.insert("deprecated".into(), json!(true));
        }
        JsonValue::Object(block)
    }

    /// Validate a configuration object
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match config {
            Value::Object(_) => {
                self.validate_object(config, &AttributePath::root(), config, &mut diags);
            }
            Value::Unknown => {}
            _ => diags.add_error(
                "Invalid configuration",
                "The configuration must be an object of attribute values.",
            ),
        }
        diags
    }

    fn validate_object(
        &self,
        value: &Value,
        path: &AttributePath,
        root: &Value,
        diags: &mut Diagnostics,
    ) {
        let Some(entries) = value.as_entries() else {
            if !value.is_unknown() {
                diags.add_attribute_error(
                    path.clone(),
                    "Incorrect attribute value type",
                    "Expected a block.",
                );
            }
            return;
        };

        for name in entries.keys() {
            if !self.attributes.contains_key(name) && !self.blocks.contains_key(name) {
                let detail = match self.suggest(name) {
                    Some(suggestion) => format!(
                        "An argument named \"{}\" is not expected here. Did you mean \"{}\"?",
                        name, suggestion
                    ),
                    None => format!("An argument named \"{}\" is not expected here.", name),
                };
                diags.add_attribute_error(path.clone().attr(name), "Unsupported argument", detail);
            }
        }

        for (name, attr) in &self.attributes {
            let attr_path = path.clone().attr(name);
            let attr_value = value.get(name);

            if attr.is_read_only() && !attr_value.is_null() {
                diags.add_attribute_error(
                    attr_path.clone(),
                    "Invalid Configuration for Read-Only Attribute",
                    format!(
                        "Cannot set value for this attribute as the provider has marked it as read-only. Remove the configuration line setting the value.\n\nRefer to the provider documentation or contact the provider developers for additional information about configurable and read-only attributes that are supported. ({})",
                        name
                    ),
                );
                continue;
            }

            if attr.required && attr_value.is_null() {
                diags.add_attribute_error(
                    attr_path.clone(),
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", name),
                );
                continue;
            }

            if !attr.ty.conforms(attr_value) {
                diags.add_attribute_error(
                    attr_path.clone(),
                    "Incorrect attribute value type",
                    format!("Inappropriate value for attribute \"{}\".", name),
                );
                continue;
            }

            if let Some(message) = &attr.deprecation_message {
                if !attr_value.is_null() {
                    diags.add_attribute_warning(attr_path.clone(), "Argument is deprecated", message.clone());
                }
            }

            let request = ValidationRequest {
                path: &attr_path,
                value: attr_value,
                config: root,
            };
            for validator in &attr.validators {
                validator.validate(&request, diags);
            }
        }

        for (name, block) in &self.blocks {
            let block_path = path.clone().attr(name);
            let block_value = value.get(name);
            if block_value.is_unknown() {
                continue;
            }
            let elements = match block_value {
                Value::Null => &[][..],
                other => match other.as_elements() {
                    Some(elements) => elements,
                    None => {
                        diags.add_attribute_error(
                            block_path,
                            "Incorrect attribute value type",
                            format!("Expected a list of \"{}\" blocks.", name),
                        );
                        continue;
                    }
                },
            };

            if elements.len() < block.min_items {
                diags.add_attribute_error(
                    block_path.clone(),
                    "Insufficient blocks",
                    format!(
                        "At least {} \"{}\" blocks are required.",
                        block.min_items, name
                    ),
                );
            }
            if let Some(max) = block.max_items {
                if elements.len() > max {
                    diags.add_attribute_error(
                        block_path.clone(),
                        "Too many blocks",
                        format!("No more than {} \"{}\" blocks are allowed.", max, name),
                    );
                }
            }

            for (i, element) in elements.iter().enumerate() {
                block
                    .schema
                    .validate_object(element, &block_path.clone().index(i), root, diags);
            }
        }

        let request = ValidationRequest {
            path,
            value,
            config: root,
        };
        for validator in &self.validators {
            validator.validate(&request, diags);
        }
    }

    fn suggest(&self, name: &str) -> Option<&str> {
        self.attributes
            .keys()
            .chain(self.blocks.keys())
            .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(candidate, _)| candidate.as_str())
    }

    /// Canonical form: every attribute present, blocks as (possibly empty)
    /// collections, sets as sets, unknown keys dropped
    pub fn normalize(&self, value: &Value) -> Value {
        if value.is_unknown() {
            return Value::Unknown;
        }
        let mut out = BTreeMap::new();
        for (name, attr) in &self.attributes {
            out.insert(name.clone(), attr.ty.normalize(value.get(name).clone()));
        }
        for (name, block) in &self.blocks {
            let normalized = match value.get(name) {
                Value::Unknown => Value::Unknown,
                other => {
                    let elements: Vec<Value> = other
                        .as_elements()
                        .unwrap_or(&[])
                        .iter()
                        .map(|element| block.schema.normalize(element))
                        .collect();
                    match block.nesting {
                        NestingMode::List => Value::List(elements),
                        NestingMode::Set => Value::Set(elements),
                    }
                }
            };
            out.insert(name.clone(), normalized);
        }
        Value::Object(out)
    }

    /// Paths of every sensitive attribute value present in `value`
    pub fn sensitive_paths(&self, value: &Value) -> Vec<AttributePath> {
        let mut paths = Vec::new();
        self.collect_sensitive(value, &AttributePath::root(), &mut paths);
        paths
    }

    fn collect_sensitive(&self, value: &Value, path: &AttributePath, out: &mut Vec<AttributePath>) {
        for (name, attr) in &self.attributes {
            if attr.sensitive && !value.get(name).is_null() {
                out.push(path.clone().attr(name));
            }
        }
        for (name, block) in &self.blocks {
            if let Some(elements) = value.get(name).as_elements() {
                for (i, element) in elements.iter().enumerate() {
                    block
                        .schema
                        .collect_sensitive(element, &path.clone().attr(name).index(i), out);
                }
            }
        }
    }

    /// Empty collection value for a block
    pub fn empty_block(&self, name: &str) -> Value {
        self.blocks.get(name).map(Block::empty).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::one_of;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("An environment")
            .attribute("id", Attribute::computed(AttrType::String))
            .attribute("name", Attribute::required(AttrType::String))
            .attribute(
                "sort_order",
                Attribute::optional_computed(AttrType::Int64),
            )
            .attribute("users", Attribute::optional(AttrType::set_of(AttrType::String)))
            .attribute(
                "mode",
                Attribute::optional(AttrType::String).validator(one_of(&["On", "Off"])),
            )
            .block(
                "policy",
                Block::list(
                    Schema::default()
                        .attribute("unit", Attribute::required(AttrType::String)),
                )
                .max_items(1),
            )
    }

    fn config(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    #[test]
    fn test_valid_config() {
        let diags = schema().validate(&config(json!({
            "name": "Production",
            "sort_order": 2,
            "users": ["Users-1"],
            "policy": [{"unit": "Days"}]
        })));
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_missing_required() {
        let diags = schema().validate(&config(json!({})));
        assert_eq!(diags.error_count(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Missing required argument");
        assert_eq!(diag.path, Some(AttributePath::new("name")));
    }

    #[test]
    fn test_unknown_argument_suggests() {
        let diags = schema().validate(&config(json!({"name": "x", "sort_ordr": 1})));
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Unsupported argument");
        assert!(diag.detail.contains("Did you mean \"sort_order\"?"));
    }

    #[test]
    fn test_read_only_attribute() {
        let diags = schema().validate(&config(json!({"name": "x", "id": "Environments-1"})));
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().unwrap().summary,
            "Invalid Configuration for Read-Only Attribute"
        );
    }

    #[test]
    fn test_type_mismatch() {
        let diags = schema().validate(&config(json!({"name": 5, "sort_order": 1.5})));
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn test_block_max_items_and_nested_required() {
        let diags = schema().validate(&config(json!({
            "name": "x",
            "policy": [{"unit": "Days"}, {}]
        })));
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Too many blocks"));
        assert!(summaries.contains(&"Missing required argument"));
        assert!(
            diags
                .iter()
                .any(|d| d.path.as_ref().map(|p| p.to_string()) == Some("policy[1].unit".to_string()))
        );
    }

    #[test]
    fn test_attribute_validators_run() {
        let diags = schema().validate(&config(json!({"name": "x", "mode": "Sometimes"})));
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_normalize() {
        let normalized = schema().normalize(&config(json!({
            "name": "x",
            "users": ["b", "a"],
            "extra": true
        })));
        assert_eq!(normalized.get("id"), &Value::Null);
        assert_eq!(normalized.get("users"), &Value::Set(vec!["a".into(), "b".into()]));
        assert_eq!(normalized.get("policy"), &Value::List(vec![]));
        assert!(normalized.as_entries().unwrap().get("extra").is_none());
    }

    #[test]
    fn test_schema_json() {
        let json = schema().to_json();
        assert_eq!(json["block"]["attributes"]["name"]["type"], "string");
        assert_eq!(json["block"]["attributes"]["name"]["required"], true);
        assert_eq!(json["block"]["attributes"]["users"]["type"], json!(["set", "string"]));
        assert_eq!(json["block"]["block_types"]["policy"]["nesting_mode"], "list");
        assert_eq!(json["block"]["block_types"]["policy"]["max_items"], 1);
    }
}
