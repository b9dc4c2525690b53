use serde::{Deserialize, Serialize};

use super::{ApiResource, Scope, SensitiveValue, TenantedDeploymentMode};

/// Account kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    UsernamePassword,
    Token,
    AmazonWebServicesAccount,
    AzureServicePrincipal,
    AzureSubscription,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsernamePassword => "UsernamePassword",
            Self::Token => "Token",
            Self::AmazonWebServicesAccount => "AmazonWebServicesAccount",
            Self::AzureServicePrincipal => "AzureServicePrincipal",
            Self::AzureSubscription => "AzureSubscription",
        }
    }
}

/// Credentials stored in Octopus for use by deployments
///
/// Kind-specific fields are absent for account types that do not use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub environment_ids: Vec<String>,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    #[serde(default)]
    pub tenanted_deployment_participation: TenantedDeploymentMode,

    // Username/password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SensitiveValue>,

    // Token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SensitiveValue>,

    // AWS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<SensitiveValue>,

    // Azure
    #[serde(rename = "ClientId", default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "SubscriptionNumber", default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_environment: Option<String>,
    #[serde(
        rename = "ActiveDirectoryEndpointBaseUri",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authentication_endpoint: Option<String>,
    #[serde(
        rename = "ResourceManagementEndpointBaseUri",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_manager_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_bytes: Option<SensitiveValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_thumbprint: Option<String>,
    #[serde(rename = "ServiceManagementEndpointBaseUri", default, skip_serializing_if = "Option::is_none")]
    pub management_endpoint: Option<String>,
    #[serde(rename = "ServiceManagementEndpointSuffix", default, skip_serializing_if = "Option::is_none")]
    pub storage_endpoint_suffix: Option<String>,
}

impl Account {
    /// An empty account of the given kind
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            account_type,
            space_id: None,
            environment_ids: Vec::new(),
            tenant_ids: Vec::new(),
            tenant_tags: Vec::new(),
            tenanted_deployment_participation: TenantedDeploymentMode::Untenanted,
            username: None,
            password: None,
            token: None,
            access_key: None,
            secret_key: None,
            application_id: None,
            tenant_id: None,
            subscription_id: None,
            azure_environment: None,
            authentication_endpoint: None,
            resource_manager_endpoint: None,
            certificate_bytes: None,
            certificate_thumbprint: None,
            management_endpoint: None,
            storage_endpoint_suffix: None,
        }
    }
}

impl ApiResource for Account {
    const KIND: &'static str = "Account";
    const COLLECTION: &'static str = "accounts";
    const SCOPE: Scope = Scope::Space;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
