//! Accounts: `octopusdeploy_username_password_account`,
//! `octopusdeploy_token_account`, `octopusdeploy_aws_account`,
//! `octopusdeploy_azure_service_principal` and the deprecated
//! `octopusdeploy_azure_subscription_account`
//!
//! Secrets (passwords, tokens, keys, certificates) are written to the API and
//! never returned by it, so state keeps the configured value.

use octopusdeploy_client::models::{Account, AccountType, SensitiveValue, TenantedDeploymentMode};
use octopusdeploy_framework::validators::required_with;
use octopusdeploy_framework::{AttrType, Attribute, Schema};
use serde::{Deserialize, Serialize};

use super::ResourceModel;
use crate::deprecations::AZURE_SUBSCRIPTION_ACCOUNT;
use crate::{schemas, util};

const AZURE_ENVIRONMENTS: &[&str] = &[
    "AzureCloud",
    "AzureChinaCloud",
    "AzureGermanCloud",
    "AzureUSGovernment",
];

/// Id, name, description, space and tenancy attributes shared by every
/// account
fn account_schema(description: &str) -> Schema {
    Schema::new(description)
        .attribute("id", schemas::id())
        .attribute("name", schemas::name("account"))
        .attribute("description", schemas::description("account"))
        .attribute("space_id", schemas::space_id("account"))
        .attribute(
            "environments",
            schemas::string_list("IDs of the environments this account may be used in."),
        )
        .attribute("tenants", schemas::string_list("IDs of the tenants this account may be used by."))
        .attribute(
            "tenant_tags",
            schemas::string_list("Tenant tags whose tenants may use this account."),
        )
        .attribute(
            "tenanted_deployment_participation",
            schemas::tenanted_deployment_participation(),
        )
}

fn optional_string(description: &str) -> Attribute {
    Attribute::optional(AttrType::String).description(description)
}

fn required_string(description: &str) -> Attribute {
    Attribute::required(AttrType::String).description(description)
}

fn azure_environment() -> Attribute {
    optional_string("The Azure cloud the account targets.")
        .validator(octopusdeploy_framework::validators::one_of(AZURE_ENVIRONMENTS))
}

/// Fields of [`Account`] every model fills the same way
struct Common<'a> {
    id: &'a Option<String>,
    name: &'a str,
    description: &'a str,
    space_id: &'a Option<String>,
    environments: &'a [String],
    tenants: &'a [String],
    tenant_tags: &'a [String],
    tenanted_deployment_participation: &'a str,
}

impl Common<'_> {
    fn account(&self, account_type: AccountType) -> Account {
        let mut account = Account::new(self.name, account_type);
        account.id = self.id.clone();
        account.description = util::non_empty(self.description);
        account.space_id = self.space_id.clone();
        account.environment_ids = self.environments.to_vec();
        account.tenant_ids = self.tenants.to_vec();
        account.tenant_tags = self.tenant_tags.to_vec();
        account.tenanted_deployment_participation =
            TenantedDeploymentMode::parse(self.tenanted_deployment_participation).unwrap_or_default();
        account
    }
}

macro_rules! common {
    ($model:expr) => {
        Common {
            id: &$model.id,
            name: &$model.name,
            description: &$model.description,
            space_id: &$model.space_id,
            environments: &$model.environments,
            tenants: &$model.tenants,
            tenant_tags: &$model.tenant_tags,
            tenanted_deployment_participation: &$model.tenanted_deployment_participation,
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernamePasswordAccountModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ResourceModel for UsernamePasswordAccountModel {
    type Api = Account;

    const TYPE_NAME: &'static str = "octopusdeploy_username_password_account";
    const KIND: &'static str = "username/password account";

    fn schema() -> Schema {
        account_schema("This resource manages username/password accounts in Octopus Deploy.")
            .attribute("username", optional_string("The username of this account."))
            .attribute("password", schemas::secret("The password of this account."))
    }

    fn expand(&self) -> Account {
        let mut account = common!(self).account(AccountType::UsernamePassword);
        account.username = self.username.clone();
        account.password = SensitiveValue::from_option(self.password.as_deref());
        account
    }

    fn flatten(api: &Account) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            environments: api.environment_ids.clone(),
            tenants: api.tenant_ids.clone(),
            tenant_tags: api.tenant_tags.clone(),
            tenanted_deployment_participation: api.tenanted_deployment_participation.to_string(),
            username: api.username.clone(),
            password: None,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenAccountModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub token: String,
}

impl ResourceModel for TokenAccountModel {
    type Api = Account;

    const TYPE_NAME: &'static str = "octopusdeploy_token_account";
    const KIND: &'static str = "token account";

    fn schema() -> Schema {
        account_schema("This resource manages token accounts in Octopus Deploy.")
            .attribute("token", schemas::required_secret("The token of this account."))
    }

    fn expand(&self) -> Account {
        let mut account = common!(self).account(AccountType::Token);
        account.token = Some(SensitiveValue::new(self.token.as_str()));
        account
    }

    fn flatten(api: &Account) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            environments: api.environment_ids.clone(),
            tenants: api.tenant_ids.clone(),
            tenant_tags: api.tenant_tags.clone(),
            tenanted_deployment_participation: api.tenanted_deployment_participation.to_string(),
            token: String::new(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.token = prior.token.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsAccountModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub access_key: String,
    pub secret_key: String,
}

impl ResourceModel for AwsAccountModel {
    type Api = Account;

    const TYPE_NAME: &'static str = "octopusdeploy_aws_account";
    const KIND: &'static str = "AWS account";

    fn schema() -> Schema {
        account_schema("This resource manages AWS accounts in Octopus Deploy.")
            .attribute("access_key", required_string("The AWS access key."))
            .attribute("secret_key", schemas::required_secret("The AWS secret key."))
    }

    fn expand(&self) -> Account {
        let mut account = common!(self).account(AccountType::AmazonWebServicesAccount);
        account.access_key = Some(self.access_key.clone());
        account.secret_key = Some(SensitiveValue::new(self.secret_key.as_str()));
        account
    }

    fn flatten(api: &Account) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            environments: api.environment_ids.clone(),
            tenants: api.tenant_ids.clone(),
            tenant_tags: api.tenant_tags.clone(),
            tenanted_deployment_participation: api.tenanted_deployment_participation.to_string(),
            access_key: api.access_key.clone().unwrap_or_default(),
            secret_key: String::new(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.secret_key = prior.secret_key.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureServicePrincipalModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub application_id: String,
    pub tenant_id: String,
    pub subscription_id: String,
    pub password: String,
    pub azure_environment: Option<String>,
    pub authentication_endpoint: Option<String>,
    pub resource_manager_endpoint: Option<String>,
}

impl ResourceModel for AzureServicePrincipalModel {
    type Api = Account;

    const TYPE_NAME: &'static str = "octopusdeploy_azure_service_principal";
    const KIND: &'static str = "Azure service principal account";

    fn schema() -> Schema {
        account_schema("This resource manages Azure service principal accounts in Octopus Deploy.")
            .attribute("application_id", required_string("The application (client) ID."))
            .attribute("tenant_id", required_string("The Azure Active Directory tenant ID."))
            .attribute("subscription_id", required_string("The Azure subscription ID."))
            .attribute("password", schemas::required_secret("The client secret of the application."))
            .attribute("azure_environment", azure_environment())
            .attribute(
                "authentication_endpoint",
                optional_string("The Active Directory endpoint base URI.")
                    .validator(required_with(&["resource_manager_endpoint"])),
            )
            .attribute(
                "resource_manager_endpoint",
                optional_string("The resource management endpoint base URI.")
                    .validator(required_with(&["authentication_endpoint"])),
            )
    }

    fn expand(&self) -> Account {
        let mut account = common!(self).account(AccountType::AzureServicePrincipal);
        account.application_id = Some(self.application_id.clone());
        account.tenant_id = Some(self.tenant_id.clone());
        account.subscription_id = Some(self.subscription_id.clone());
        account.password = Some(SensitiveValue::new(self.password.as_str()));
        account.azure_environment = self.azure_environment.clone();
        account.authentication_endpoint = self.authentication_endpoint.clone();
        account.resource_manager_endpoint = self.resource_manager_endpoint.clone();
        account
    }

    fn flatten(api: &Account) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            environments: api.environment_ids.clone(),
            tenants: api.tenant_ids.clone(),
            tenant_tags: api.tenant_tags.clone(),
            tenanted_deployment_participation: api.tenanted_deployment_participation.to_string(),
            application_id: api.application_id.clone().unwrap_or_default(),
            tenant_id: api.tenant_id.clone().unwrap_or_default(),
            subscription_id: api.subscription_id.clone().unwrap_or_default(),
            password: String::new(),
            azure_environment: api.azure_environment.clone(),
            authentication_endpoint: api.authentication_endpoint.clone(),
            resource_manager_endpoint: api.resource_manager_endpoint.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.password = prior.password.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSubscriptionAccountModel {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub space_id: Option<String>,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub subscription_id: String,
    pub azure_environment: Option<String>,
    pub certificate: Option<String>,
    pub certificate_thumbprint: Option<String>,
    pub management_endpoint: Option<String>,
    pub storage_endpoint_suffix: Option<String>,
}

impl ResourceModel for AzureSubscriptionAccountModel {
    type Api = Account;

    const TYPE_NAME: &'static str = "octopusdeploy_azure_subscription_account";
    const KIND: &'static str = "Azure subscription account";
    const DEPRECATION_KEY: Option<&'static str> = Some(AZURE_SUBSCRIPTION_ACCOUNT);

    fn schema() -> Schema {
        account_schema("This resource manages Azure subscription accounts in Octopus Deploy.")
            .deprecated(
                "Azure management certificate accounts are retired by Microsoft. Use octopusdeploy_azure_service_principal instead.",
            )
            .attribute("subscription_id", required_string("The Azure subscription ID."))
            .attribute("azure_environment", azure_environment())
            .attribute(
                "certificate",
                schemas::secret("The base64-encoded management certificate."),
            )
            .attribute(
                "certificate_thumbprint",
                Attribute::computed(AttrType::String)
                    .description("The thumbprint of the management certificate."),
            )
            .attribute(
                "management_endpoint",
                optional_string("The service management endpoint base URI.")
                    .validator(required_with(&["storage_endpoint_suffix"])),
            )
            .attribute(
                "storage_endpoint_suffix",
                optional_string("The storage endpoint suffix.")
                    .validator(required_with(&["management_endpoint"])),
            )
    }

    fn expand(&self) -> Account {
        let mut account = common!(self).account(AccountType::AzureSubscription);
        account.subscription_id = Some(self.subscription_id.clone());
        account.azure_environment = self.azure_environment.clone();
        account.certificate_bytes = SensitiveValue::from_option(self.certificate.as_deref());
        account.certificate_thumbprint = self.certificate_thumbprint.clone();
        account.management_endpoint = self.management_endpoint.clone();
        account.storage_endpoint_suffix = self.storage_endpoint_suffix.clone();
        account
    }

    fn flatten(api: &Account) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone().unwrap_or_default(),
            space_id: api.space_id.clone(),
            environments: api.environment_ids.clone(),
            tenants: api.tenant_ids.clone(),
            tenant_tags: api.tenant_tags.clone(),
            tenanted_deployment_participation: api.tenanted_deployment_participation.to_string(),
            subscription_id: api.subscription_id.clone().unwrap_or_default(),
            azure_environment: api.azure_environment.clone(),
            certificate: None,
            certificate_thumbprint: api.certificate_thumbprint.clone(),
            management_endpoint: api.management_endpoint.clone(),
            storage_endpoint_suffix: api.storage_endpoint_suffix.clone(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn preserve(&mut self, prior: &Self) {
        self.certificate = prior.certificate.clone();
    }
}
