//! Display formatting for CLI output
//!
//! Diagnostics and plan summaries go to stderr so that JSON written to
//! stdout stays machine readable.

use console::style;
use octopusdeploy_framework::{
    Diagnostic, Diagnostics, PlanAction, PlannedChange, Schema, Severity, Value,
};
use serde_json::Value as JsonValue;
use similar::{ChangeTag, TextDiff};

/// Shown in place of sensitive attribute values
pub const SENSITIVE: &str = "(sensitive value)";

/// Shown in place of values only known after apply
pub const KNOWN_AFTER_APPLY: &str = "(known after apply)";

/// Maximum edit distance for "did you mean" suggestions
const MAX_SUGGESTION_DISTANCE: usize = 4;

pub fn format_diagnostic(diag: &Diagnostic) -> String {
    let icon = match diag.severity {
        Severity::Error => style("✗").red(),
        Severity::Warning => style("⚠").yellow(),
    };
    let mut out = format!("{} {}: {}", icon, diag.severity, style(&diag.summary).bold());
    if let Some(path) = &diag.path {
        out.push_str(&format!(" at {}", style(path).dim()));
    }
    for line in diag.detail.lines() {
        out.push_str(&format!("\n    {}", line));
    }
    out
}

pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        eprintln!("{}", format_diagnostic(diag));
    }
}

/// A copy of `value` with sensitive attributes masked
pub fn redact(schema: &Schema, value: &Value) -> Value {
    let Some(entries) = value.as_entries() else {
        return value.clone();
    };
    let mut out = entries.clone();
    for (name, attr) in &schema.attributes {
        if let Some(v) = out.get_mut(name) {
            if attr.sensitive && !v.is_null() && !v.is_unknown() {
                *v = Value::from(SENSITIVE);
            }
        }
    }
    for (name, block) in &schema.blocks {
        if let Some(v) = out.get_mut(name) {
            *v = match &*v {
                Value::List(items) => Value::List(items.iter().map(|i| redact(&block.schema, i)).collect()),
                Value::Set(items) => Value::Set(items.iter().map(|i| redact(&block.schema, i)).collect()),
                other => other.clone(),
            };
        }
    }
    Value::Object(out)
}

/// JSON for display; unknown values become a placeholder
pub fn display_json(value: &Value) -> JsonValue {
    match value {
        Value::Unknown => JsonValue::String(KNOWN_AFTER_APPLY.to_string()),
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(n.clone()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::List(items) | Value::Set(items) => JsonValue::Array(items.iter().map(display_json).collect()),
        Value::Map(entries) | Value::Object(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), display_json(v)))
                .collect(),
        ),
    }
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(&display_json(value)).unwrap_or_default()
}

fn action_text(action: PlanAction) -> &'static str {
    match action {
        PlanAction::NoOp => "is up to date",
        PlanAction::Create => "will be created",
        PlanAction::Update => "will be updated in-place",
        PlanAction::Replace => "must be replaced",
    }
}

/// Header plus a line diff between the prior and planned state
pub fn format_plan(type_name: &str, schema: &Schema, prior: &Value, change: &PlannedChange) -> String {
    let header = match change.action {
        PlanAction::NoOp => style(format!("{} {}", type_name, action_text(change.action))).dim(),
        PlanAction::Create => style(format!("+ {} {}", type_name, action_text(change.action))).green(),
        PlanAction::Update => style(format!("~ {} {}", type_name, action_text(change.action))).yellow(),
        PlanAction::Replace => style(format!("-/+ {} {}", type_name, action_text(change.action))).red(),
    };
    let mut out = header.to_string();
    if change.action == PlanAction::NoOp {
        return out;
    }

    let old = if prior.is_null() {
        String::new()
    } else {
        pretty(&redact(schema, prior)) + "\n"
    };
    let new = pretty(&redact(schema, &change.planned_state)) + "\n";
    for line in TextDiff::from_lines(&old, &new).iter_all_changes() {
        let content = line.value().trim_end();
        let rendered = match line.tag() {
            ChangeTag::Delete => style(format!("  - {}", content)).red(),
            ChangeTag::Insert => style(format!("  + {}", content)).green(),
            ChangeTag::Equal => style(format!("    {}", content)).dim(),
        };
        out.push('\n');
        out.push_str(&rendered.to_string());
    }
    for path in &change.requires_replace {
        out.push_str(&format!("\n  {} {}", style("# forces replacement:").red(), path));
    }
    out
}

/// Closest candidate to a mistyped name
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(|c| (strsim::levenshtein(input, c), c))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| format!("did you mean `{}`?", c))
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopusdeploy_framework::{AttrType, Attribute, AttributePath, Block};

    fn schema() -> Schema {
        Schema::new("test")
            .attribute("name", Attribute::required(AttrType::String))
            .attribute("password", Attribute::optional(AttrType::String).sensitive())
            .block(
                "login",
                Block::list(
                    Schema::new("nested")
                        .attribute("token", Attribute::optional(AttrType::String).sensitive()),
                ),
            )
    }

    #[test]
    fn test_redact() {
        let value = Value::object([
            ("name", Value::from("feed")),
            ("password", Value::from("hunter2")),
            (
                "login",
                Value::List(vec![Value::object([("token", Value::from("abc"))])]),
            ),
        ]);
        let redacted = redact(&schema(), &value);
        assert_eq!(redacted.get("name"), &Value::from("feed"));
        assert_eq!(redacted.get("password"), &Value::from(SENSITIVE));
        assert_eq!(
            redacted.get("login").as_elements().unwrap()[0].get("token"),
            &Value::from(SENSITIVE)
        );

        let unset = Value::object([("name", Value::from("feed")), ("password", Value::Null)]);
        assert!(redact(&schema(), &unset).get("password").is_null());
    }

    #[test]
    fn test_format_diagnostic() {
        console::set_colors_enabled(false);
        let mut diags = Diagnostics::new();
        diags.add_attribute_error(
            AttributePath::new("quantity_to_keep"),
            "Missing retention attribute",
            "quantity_to_keep is required when strategy is Count",
        );
        let rendered = format_diagnostic(diags.iter().next().unwrap());
        insta::assert_snapshot!(rendered, @r"
        ✗ Error: Missing retention attribute at quantity_to_keep
            quantity_to_keep is required when strategy is Count
        ");
    }

    #[test]
    fn test_format_plan_create() {
        console::set_colors_enabled(false);
        let change = PlannedChange {
            action: PlanAction::Create,
            planned_state: Value::object([
                ("name", Value::from("feed")),
                ("password", Value::from("hunter2")),
                ("login", Value::List(Vec::new())),
            ]),
            requires_replace: Vec::new(),
        };
        let rendered = format_plan("octopusdeploy_helm_feed", &schema(), &Value::Null, &change);
        assert!(rendered.starts_with("+ octopusdeploy_helm_feed will be created"));
        assert!(rendered.contains(r#"  +   "name": "feed","#));
        assert!(rendered.contains(SENSITIVE));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_display_json_unknown() {
        let value = Value::object([("id", Value::Unknown)]);
        assert_eq!(display_json(&value)["id"], KNOWN_AFTER_APPLY);
    }

    #[test]
    fn test_suggest() {
        let types = ["octopusdeploy_environment", "octopusdeploy_space"];
        assert_eq!(
            suggest("octopusdeploy_enviroment", types),
            Some("did you mean `octopusdeploy_environment`?".to_string())
        );
        assert_eq!(suggest("aws_instance", types), None);
    }
}
