//! Configuration validators
//!
//! Attribute validators see the attribute's own value plus the whole
//! configuration, so they can check sibling attributes. Null and unknown
//! values are skipped by every built-in validator; required-ness is the
//! schema's job.

use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use crate::value::Value;

/// What a validator is asked to check
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub path: &'a AttributePath,
    pub value: &'a Value,
    /// The complete configuration object
    pub config: &'a Value,
}

impl<'a> ValidationRequest<'a> {
    /// Value of an attribute next to the one being validated
    pub fn sibling(&self, name: &str) -> &'a Value {
        static NULL: Value = Value::Null;
        self.config
            .get_path(&self.path.sibling(name))
            .unwrap_or(&NULL)
    }

    /// Value of an attribute inside the object being validated
    pub fn child(&self, name: &str) -> &'a Value {
        self.value.get(name)
    }

    fn skip(&self) -> bool {
        self.value.is_null() || self.value.is_unknown()
    }
}

pub trait Validator: Send + Sync {
    /// Human readable summary, used in schema docs
    fn description(&self) -> String;

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics);
}

const INVALID_VALUE: &str = "Invalid Attribute Value";
const INVALID_COMBINATION: &str = "Invalid Attribute Combination";

/// String must be one of a fixed set
pub struct OneOf {
    values: Vec<String>,
}

pub fn one_of(values: &[&str]) -> OneOf {
    OneOf {
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

impl Validator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", quoted(&self.values))
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.skip() {
            return;
        }
        if let Some(s) = request.value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diags.add_attribute_error(
                    request.path.clone(),
                    INVALID_VALUE,
                    format!(
                        "Attribute {} {}, got: {:?}",
                        request.path,
                        self.description(),
                        s
                    ),
                );
            }
        }
    }
}

/// Integer lower and optional upper bound
pub struct IntRange {
    min: i64,
    max: Option<i64>,
}

pub fn at_least(min: i64) -> IntRange {
    IntRange { min, max: None }
}

pub fn between(min: i64, max: i64) -> IntRange {
    IntRange {
        min,
        max: Some(max),
    }
}

impl Validator for IntRange {
    fn description(&self) -> String {
        match self.max {
            Some(max) => format!("value must be between {} and {}", self.min, max),
            None => format!("value must be at least {}", self.min),
        }
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.skip() {
            return;
        }
        if let Some(n) = request.value.as_i64() {
            let too_high = self.max.is_some_and(|max| n > max);
            if n < self.min || too_high {
                diags.add_attribute_error(
                    request.path.clone(),
                    INVALID_VALUE,
                    format!("Attribute {} {}, got: {}", request.path, self.description(), n),
                );
            }
        }
    }
}

/// Minimum string length
pub struct LengthAtLeast {
    min: usize,
}

pub fn length_at_least(min: usize) -> LengthAtLeast {
    LengthAtLeast { min }
}

impl Validator for LengthAtLeast {
    fn description(&self) -> String {
        format!("string length must be at least {}", self.min)
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.skip() {
            return;
        }
        if let Some(s) = request.value.as_str() {
            if s.chars().count() < self.min {
                diags.add_attribute_error(
                    request.path.clone(),
                    "Invalid Attribute Value Length",
                    format!(
                        "Attribute {} {}, got: {}",
                        request.path,
                        self.description(),
                        s.chars().count()
                    ),
                );
            }
        }
    }
}

/// String must match a pattern
pub struct MatchesRegex {
    pattern: Regex,
    message: String,
}

pub fn matches_regex(pattern: Regex, message: impl Into<String>) -> MatchesRegex {
    MatchesRegex {
        pattern,
        message: message.into(),
    }
}

impl Validator for MatchesRegex {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.skip() {
            return;
        }
        if let Some(s) = request.value.as_str() {
            if !self.pattern.is_match(s) {
                diags.add_attribute_error(
                    request.path.clone(),
                    INVALID_VALUE,
                    format!("Attribute {} {}, got: {:?}", request.path, self.message, s),
                );
            }
        }
    }
}

/// Attribute cannot be set together with any of the named siblings
pub struct ConflictsWith {
    others: Vec<String>,
}

pub fn conflicts_with(others: &[&str]) -> ConflictsWith {
    ConflictsWith {
        others: others.iter().map(|o| o.to_string()).collect(),
    }
}

impl Validator for ConflictsWith {
    fn description(&self) -> String {
        format!("cannot be specified when {} is specified", quoted(&self.others))
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.value.is_null() {
            return;
        }
        for other in &self.others {
            if !request.sibling(other).is_null() {
                diags.add_attribute_error(
                    request.path.clone(),
                    INVALID_COMBINATION,
                    format!(
                        "Attribute {} cannot be specified when {} is specified",
                        request.path,
                        request.path.sibling(other)
                    ),
                );
            }
        }
    }
}

/// Attribute requires all of the named siblings to be set
pub struct RequiredWith {
    others: Vec<String>,
}

pub fn required_with(others: &[&str]) -> RequiredWith {
    RequiredWith {
        others: others.iter().map(|o| o.to_string()).collect(),
    }
}

impl Validator for RequiredWith {
    fn description(&self) -> String {
        format!("requires {} to be specified", quoted(&self.others))
    }

    fn validate(&self, request: &ValidationRequest<'_>, diags: &mut Diagnostics) {
        if request.value.is_null() {
            return;
        }
        for other in &self.others {
            if request.sibling(other).is_null() {
                diags.add_attribute_error(
                    request.path.clone(),
                    INVALID_COMBINATION,
                    format!(
                        "Attribute {} must be specified when {} is specified",
                        request.path.sibling(other),
                        request.path
                    ),
                );
            }
        }
    }
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &dyn Validator, config: &Value, path: &AttributePath) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let value = config.get_path(path).cloned().unwrap_or_default();
        validator.validate(
            &ValidationRequest {
                path,
                value: &value,
                config,
            },
            &mut diags,
        );
        diags
    }

    #[test]
    fn test_one_of() {
        let path = AttributePath::new("mode");
        let v = one_of(&["On", "Off"]);
        assert!(run(&v, &Value::object([("mode", "On".into())]), &path).is_empty());
        let diags = run(&v, &Value::object([("mode", "on".into())]), &path);
        assert_eq!(diags.error_count(), 1);
        assert!(diags.iter().next().unwrap().detail.contains("\"On\", \"Off\""));
        assert!(run(&v, &Value::object([("mode", Value::Unknown)]), &path).is_empty());
    }

    #[test]
    fn test_int_range() {
        let path = AttributePath::new("n");
        assert!(run(&at_least(1), &Value::object([("n", 1.into())]), &path).is_empty());
        assert!(run(&at_least(1), &Value::object([("n", 0.into())]), &path).has_errors());
        assert!(run(&between(1, 5), &Value::object([("n", 6.into())]), &path).has_errors());
        assert!(run(&between(1, 5), &Value::object([("n", Value::Null)]), &path).is_empty());
    }

    #[test]
    fn test_length_and_regex() {
        let path = AttributePath::new("name");
        let config = Value::object([("name", "".into())]);
        assert!(run(&length_at_least(1), &config, &path).has_errors());

        let slug = matches_regex(Regex::new("^[a-z0-9-]+$").unwrap(), "must be a slug");
        assert!(run(&slug, &Value::object([("name", "my-space".into())]), &path).is_empty());
        assert!(run(&slug, &Value::object([("name", "My Space".into())]), &path).has_errors());
    }

    #[test]
    fn test_sibling_rules_inside_blocks() {
        let config = Value::object([(
            "policy",
            Value::List(vec![Value::object([
                ("token", "abc".into()),
                ("password", "secret".into()),
            ])]),
        )]);
        let path = AttributePath::new("policy").index(0).attr("token");

        let diags = run(&conflicts_with(&["password"]), &config, &path);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(
            diags.iter().next().unwrap().detail,
            "Attribute policy[0].token cannot be specified when policy[0].password is specified"
        );

        assert!(run(&required_with(&["password"]), &config, &path).is_empty());
        assert!(run(&required_with(&["username"]), &config, &path).has_errors());
    }
}
