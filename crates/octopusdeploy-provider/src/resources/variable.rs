//! `octopusdeploy_variable`
//!
//! Variables have no collection of their own. They live in the variable set
//! of their owner (a project or a library variable set) and every change is a
//! read-modify-write of that set.

use std::collections::BTreeSet;

use async_trait::async_trait;
use octopusdeploy_client::models::{
    LibraryVariableSet, Project, Variable, VariablePrompt, VariableScope, VariableSet,
};
use octopusdeploy_client::{ClientError, OctopusClient};
use octopusdeploy_framework::validators::{conflicts_with, one_of};
use octopusdeploy_framework::{
    AttrType, Attribute, AttributePath, Block, Diagnostics, RequiresReplace, Resource, Schema,
    UseStateForUnknown, Value,
};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderData;
use crate::{schemas, util};

const TYPE_NAME: &str = "octopusdeploy_variable";
const KIND: &str = "variable";

pub const SENSITIVE_TYPE: &str = "Sensitive";

pub const VARIABLE_TYPES: &[&str] = &[
    "AmazonWebServicesAccount",
    "AzureAccount",
    "Certificate",
    "GoogleCloudAccount",
    "Sensitive",
    "String",
    "UsernamePasswordAccount",
    "WorkerPool",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeModel {
    pub environments: Vec<String>,
    pub machines: Vec<String>,
    pub roles: Vec<String>,
    pub channels: Vec<String>,
    pub actions: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub processes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptModel {
    pub label: String,
    pub description: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableModel {
    pub id: Option<String>,
    pub owner_id: String,
    pub space_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: Option<String>,
    pub sensitive_value: Option<String>,
    pub description: String,
    pub is_sensitive: Option<bool>,
    pub is_editable: bool,
    pub scope: Vec<ScopeModel>,
    pub prompt: Vec<PromptModel>,
}

impl VariableModel {
    fn sensitive(&self) -> bool {
        self.is_sensitive
            .unwrap_or(self.variable_type == SENSITIVE_TYPE)
    }

    pub fn expand(&self) -> Variable {
        let sensitive = self.sensitive();
        let scope = self
            .scope
            .first()
            .map(|s| VariableScope {
                environment: s.environments.clone(),
                machine: s.machines.clone(),
                role: s.roles.clone(),
                channel: s.channels.clone(),
                action: s.actions.clone(),
                tenant_tag: s.tenant_tags.clone(),
                process_owner: s.processes.clone(),
            })
            .unwrap_or_default();

        Variable {
            id: self.id.clone(),
            name: self.name.clone(),
            value: if sensitive {
                self.sensitive_value.clone()
            } else {
                self.value.clone()
            },
            description: util::non_empty(&self.description),
            variable_type: self.variable_type.clone(),
            is_sensitive: sensitive,
            is_editable: self.is_editable,
            scope,
            prompt: self.prompt.first().map(|p| VariablePrompt {
                label: util::non_empty(&p.label),
                description: util::non_empty(&p.description),
                required: p.is_required,
            }),
        }
    }

    /// State for `variable`; sensitive values come from `prior` because the
    /// API never returns them
    pub fn flatten(variable: &Variable, owner_id: &str, space_id: Option<&str>, prior: &Self) -> Self {
        let scope = if variable.scope.is_empty() {
            Vec::new()
        } else {
            let s = &variable.scope;
            vec![ScopeModel {
                environments: s.environment.clone(),
                machines: s.machine.clone(),
                roles: s.role.clone(),
                channels: s.channel.clone(),
                actions: s.action.clone(),
                tenant_tags: s.tenant_tag.clone(),
                processes: s.process_owner.clone(),
            }]
        };

        Self {
            id: variable.id.clone(),
            owner_id: owner_id.to_string(),
            space_id: space_id.map(str::to_string),
            name: variable.name.clone(),
            variable_type: variable.variable_type.clone(),
            value: if variable.is_sensitive {
                None
            } else {
                variable.value.clone()
            },
            sensitive_value: if variable.is_sensitive {
                prior.sensitive_value.clone()
            } else {
                None
            },
            description: variable.description.clone().unwrap_or_default(),
            is_sensitive: Some(variable.is_sensitive),
            is_editable: variable.is_editable,
            scope,
            prompt: variable
                .prompt
                .iter()
                .map(|p| PromptModel {
                    label: p.label.clone().unwrap_or_default(),
                    description: p.description.clone().unwrap_or_default(),
                    is_required: p.required,
                })
                .collect(),
        }
    }
}

/// Checks the schema cannot express: secrets belong in `sensitive_value`
/// and only sensitive variables take one
pub fn validate_sensitive(config: &Value, diags: &mut Diagnostics) {
    let is_sensitive = config.get("is_sensitive");
    let variable_type = config.get("type");
    if is_sensitive.is_unknown() || variable_type.is_unknown() {
        return;
    }
    let sensitive = is_sensitive
        .as_bool()
        .unwrap_or(variable_type.as_str() == Some(SENSITIVE_TYPE));

    let sensitive_value = config.get("sensitive_value");
    if !sensitive_value.is_null() && !sensitive {
        diags.add_attribute_error(
            AttributePath::new("sensitive_value"),
            "Invalid sensitive variable",
            "sensitive_value can only be set when is_sensitive is true or type is Sensitive.",
        );
    }
    if !config.get("value").is_null() && sensitive {
        diags.add_attribute_error(
            AttributePath::new("value"),
            "Invalid sensitive variable",
            "Sensitive variables take their value from sensitive_value.",
        );
    }
}

fn scope_block() -> Block {
    Block::list(
        Schema::new("Restricts where the variable value applies.")
            .attribute("environments", schemas::string_list("Environment IDs."))
            .attribute("machines", schemas::string_list("Deployment target IDs."))
            .attribute("roles", schemas::string_list("Target roles."))
            .attribute("channels", schemas::string_list("Channel IDs."))
            .attribute("actions", schemas::string_list("Deployment step IDs."))
            .attribute("tenant_tags", schemas::string_list("Canonical tenant tag names."))
            .attribute("processes", schemas::string_list("Process owner IDs.")),
    )
    .max_items(1)
}

fn prompt_block() -> Block {
    Block::list(
        Schema::new("Prompt for the value when a release is deployed.")
            .attribute(
                "label",
                Attribute::optional(AttrType::String)
                    .description("The label shown with the prompt.")
                    .default_value(""),
            )
            .attribute(
                "description",
                Attribute::optional(AttrType::String)
                    .description("Help text shown with the prompt.")
                    .default_value(""),
            )
            .attribute("is_required", schemas::flag("Whether a value must be entered.", false)),
    )
    .max_items(1)
}

pub struct VariableResource {
    data: ProviderData,
}

impl VariableResource {
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }

    /// Variable set ID of a project or library variable set
    async fn variable_set_id(
        client: &OctopusClient,
        space_id: Option<&str>,
        owner_id: &str,
    ) -> Result<String, ClientError> {
        let set_id = if owner_id.starts_with("Projects-") {
            client.get::<Project>(space_id, owner_id).await?.variable_set_id
        } else if owner_id.starts_with("LibraryVariableSets-") {
            client
                .get::<LibraryVariableSet>(space_id, owner_id)
                .await?
                .variable_set_id
        } else {
            return Err(ClientError::InvalidConfig {
                message: format!(
                    "owner_id {:?} is neither a project nor a library variable set",
                    owner_id
                ),
            });
        };
        set_id.ok_or_else(|| ClientError::UnexpectedResponse {
            url: owner_id.to_string(),
            message: "owner has no variable set".to_string(),
        })
    }

    async fn variable_set(
        client: &OctopusClient,
        space_id: Option<&str>,
        owner_id: &str,
    ) -> Result<VariableSet, ClientError> {
        let set_id = Self::variable_set_id(client, space_id, owner_id).await?;
        client.get::<VariableSet>(space_id, &set_id).await
    }

    fn state(
        diags: &mut Diagnostics,
        client: &OctopusClient,
        variable: &Variable,
        model: &VariableModel,
    ) -> Option<Value> {
        let space_id = client.resolve_space(model.space_id.as_deref());
        util::encode(
            diags,
            &VariableModel::flatten(variable, &model.owner_id, space_id, model),
        )
    }
}

#[async_trait]
impl Resource for VariableResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("This resource manages variables in Octopus Deploy.")
            .attribute("id", schemas::id())
            .attribute(
                "owner_id",
                Attribute::required(AttrType::String)
                    .description("The project or library variable set that owns this variable.")
                    .plan_modifier(RequiresReplace),
            )
            .attribute("space_id", schemas::space_id("variable"))
            .attribute("name", schemas::name("variable"))
            .attribute(
                "type",
                Attribute::required(AttrType::String)
                    .description(format!(
                        "The type of the variable. Valid values are {}.",
                        VARIABLE_TYPES.join(", ")
                    ))
                    .validator(one_of(VARIABLE_TYPES)),
            )
            .attribute(
                "value",
                Attribute::optional(AttrType::String)
                    .description("The value of the variable.")
                    .validator(conflicts_with(&["sensitive_value"])),
            )
            .attribute(
                "sensitive_value",
                schemas::secret("The value of a sensitive variable."),
            )
            .attribute("description", schemas::description("variable"))
            .attribute(
                "is_sensitive",
                Attribute::optional_computed(AttrType::Bool)
                    .description("Whether the value is secret. Defaults to true for type Sensitive.")
                    .plan_modifier(UseStateForUnknown),
            )
            .attribute(
                "is_editable",
                schemas::flag("Whether the variable can be edited in the portal.", true),
            )
            .block("scope", scope_block())
            .block("prompt", prompt_block())
    }

    async fn validate(&self, diags: &mut Diagnostics, config: &Value) {
        validate_sensitive(config, diags);
    }

    async fn create(&self, diags: &mut Diagnostics, plan: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let model: VariableModel = util::decode(diags, plan)?;
        let space_id = model.space_id.as_deref();

        tracing::info!(resource = TYPE_NAME, owner = %model.owner_id, "creating {}", KIND);
        let mut set = match Self::variable_set(client, space_id, &model.owner_id).await {
            Ok(set) => set,
            Err(e) => {
                util::api_error(diags, "creating", KIND, &e);
                return None;
            }
        };
        let existing: BTreeSet<String> = set.variables.iter().filter_map(|v| v.id.clone()).collect();
        let mut variable = model.expand();
        variable.id = None;
        set.variables.push(variable);

        let updated = match client.update(space_id, &set).await {
            Ok(updated) => updated,
            Err(e) => {
                util::api_error(diags, "creating", KIND, &e);
                return None;
            }
        };
        let Some(created) = updated.variables.iter().find(|v| {
            v.name == model.name && v.id.as_ref().is_some_and(|id| !existing.contains(id))
        }) else {
            diags.add_error(
                format!("Error creating {}", KIND),
                format!("The variable set of {} does not contain the new variable {}.", model.owner_id, model.name),
            );
            return None;
        };
        tracing::info!(resource = TYPE_NAME, id = ?created.id, "created {}", KIND);
        Self::state(diags, client, created, &model)
    }

    async fn read(&self, diags: &mut Diagnostics, state: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let prior: VariableModel = util::decode(diags, state)?;
        let Some(id) = prior.id.as_deref() else {
            diags.add_error(format!("Error reading {}", KIND), "The state has no id.");
            return None;
        };

        let set = match Self::variable_set(client, prior.space_id.as_deref(), &prior.owner_id).await {
            Ok(set) => set,
            Err(e) if e.is_not_found() => {
                tracing::warn!(resource = TYPE_NAME, owner = %prior.owner_id, "variable owner no longer exists; removing from state");
                return Some(Value::Null);
            }
            Err(e) => {
                util::api_error(diags, "reading", KIND, &e);
                return None;
            }
        };
        match set.find(id) {
            Some(variable) => Self::state(diags, client, variable, &prior),
            None => {
                tracing::warn!(resource = TYPE_NAME, id, "{} no longer exists; removing from state", KIND);
                Some(Value::Null)
            }
        }
    }

    async fn update(&self, diags: &mut Diagnostics, _prior: &Value, plan: &Value) -> Option<Value> {
        let client = self.data.client(diags)?;
        let model: VariableModel = util::decode(diags, plan)?;
        let space_id = model.space_id.as_deref();
        let Some(id) = model.id.clone() else {
            diags.add_error(format!("Error updating {}", KIND), "The state has no id.");
            return None;
        };

        tracing::info!(resource = TYPE_NAME, id = %id, "updating {}", KIND);
        let mut set = match Self::variable_set(client, space_id, &model.owner_id).await {
            Ok(set) => set,
            Err(e) => {
                util::api_error(diags, "updating", KIND, &e);
                return None;
            }
        };
        let Some(slot) = set.variables.iter_mut().find(|v| v.id.as_deref() == Some(id.as_str())) else {
            diags.add_error(
                format!("Error updating {}", KIND),
                format!("Variable {} no longer exists in the variable set of {}.", id, model.owner_id),
            );
            return None;
        };
        *slot = model.expand();

        match client.update(space_id, &set).await {
            Ok(updated) => match updated.find(&id) {
                Some(variable) => Self::state(diags, client, variable, &model),
                None => {
                    diags.add_error(
                        format!("Error updating {}", KIND),
                        format!("Variable {} is missing after the update.", id),
                    );
                    None
                }
            },
            Err(e) => {
                util::api_error(diags, "updating", KIND, &e);
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: &Value) -> Option<()> {
        let client = self.data.client(diags)?;
        let prior: VariableModel = util::decode(diags, state)?;
        let space_id = prior.space_id.as_deref();
        let Some(id) = prior.id.as_deref() else {
            diags.add_error(format!("Error deleting {}", KIND), "The state has no id.");
            return None;
        };

        tracing::info!(resource = TYPE_NAME, id, "deleting {}", KIND);
        let mut set = match Self::variable_set(client, space_id, &prior.owner_id).await {
            Ok(set) => set,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", KIND, &e);
                return None;
            }
        };
        let before = set.variables.len();
        set.variables.retain(|v| v.id.as_deref() != Some(id));
        if set.variables.len() == before {
            tracing::info!(resource = TYPE_NAME, id, "{} already deleted", KIND);
            return Some(());
        }

        match client.update(space_id, &set).await {
            Ok(_) => Some(()),
            Err(e) => {
                util::api_error(diags, "deleting", KIND, &e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> VariableModel {
        VariableModel {
            id: Some("Variables-1".to_string()),
            owner_id: "Projects-1".to_string(),
            space_id: Some("Spaces-1".to_string()),
            name: "ConnectionString".to_string(),
            variable_type: "String".to_string(),
            value: Some("Server=db".to_string()),
            description: "Primary database".to_string(),
            is_sensitive: Some(false),
            is_editable: true,
            scope: vec![ScopeModel {
                environments: vec!["Environments-1".to_string()],
                roles: vec!["web".to_string()],
                ..Default::default()
            }],
            prompt: vec![PromptModel {
                label: "Connection".to_string(),
                description: String::new(),
                is_required: true,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip() {
        let model = model();
        let variable = model.expand();
        assert_eq!(variable.scope.environment, vec!["Environments-1"]);
        assert_eq!(variable.prompt.as_ref().unwrap().description, None);
        assert_eq!(
            VariableModel::flatten(&variable, "Projects-1", Some("Spaces-1"), &model),
            model
        );
    }

    #[test]
    fn test_sensitive_value_is_preserved() {
        let prior = VariableModel {
            name: "Password".to_string(),
            owner_id: "LibraryVariableSets-1".to_string(),
            variable_type: SENSITIVE_TYPE.to_string(),
            sensitive_value: Some("hunter2".to_string()),
            is_editable: true,
            ..Default::default()
        };
        let sent = prior.expand();
        assert!(sent.is_sensitive);
        assert_eq!(sent.value.as_deref(), Some("hunter2"));

        let returned = Variable {
            id: Some("Variables-9".to_string()),
            value: None,
            ..sent
        };
        let state = VariableModel::flatten(&returned, "LibraryVariableSets-1", None, &prior);
        assert_eq!(state.sensitive_value.as_deref(), Some("hunter2"));
        assert_eq!(state.value, None);
        assert_eq!(state.is_sensitive, Some(true));
        assert!(state.scope.is_empty());
        assert!(state.prompt.is_empty());
    }

    #[test]
    fn test_validate_sensitive() {
        let cases: &[(Value, &str, Option<&str>, Option<&str>, usize)] = &[
            (Value::Null, "String", Some("a"), None, 0),
            (Value::Null, "String", None, Some("s"), 1),
            (Value::Null, "Sensitive", None, Some("s"), 0),
            (Value::from(true), "String", None, Some("s"), 0),
            (Value::from(true), "String", Some("a"), None, 1),
            (Value::from(false), "Sensitive", None, Some("s"), 1),
            (Value::Unknown, "String", None, Some("s"), 0),
        ];
        for (is_sensitive, variable_type, value, sensitive_value, errors) in cases {
            let config = Value::object([
                ("is_sensitive", is_sensitive.clone()),
                ("type", Value::from(*variable_type)),
                ("value", Value::from(*value)),
                ("sensitive_value", Value::from(*sensitive_value)),
            ]);
            let mut diags = Diagnostics::new();
            validate_sensitive(&config, &mut diags);
            assert_eq!(
                diags.error_count(),
                *errors,
                "is_sensitive={:?} type={} value={:?} sensitive_value={:?}",
                is_sensitive,
                variable_type,
                value,
                sensitive_value
            );
        }
    }

    #[test]
    fn test_value_conflicts_with_sensitive_value() {
        let resource = VariableResource::new(ProviderData::new());
        let diags = resource.schema().validate(&Value::object([
            ("owner_id", Value::from("Projects-1")),
            ("name", Value::from("Password")),
            ("type", Value::from("Sensitive")),
            ("value", Value::from("a")),
            ("sensitive_value", Value::from("b")),
        ]));
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid Attribute Combination");
    }
}
