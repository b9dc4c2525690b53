//! Deprecated resources
//!
//! Deprecated resources stay registered but refuse every operation with a
//! fixed error, unless their key is listed in
//! `TF_OCTOPUS_DEPRECATION_REVERSALS` (comma separated).

use std::collections::BTreeSet;

use octopusdeploy_framework::Diagnostics;
use once_cell::sync::Lazy;

/// Environment variable listing re-enabled deprecated resources
pub const ENV_DEPRECATION_REVERSALS: &str = "TF_OCTOPUS_DEPRECATION_REVERSALS";

/// Key re-enabling `octopusdeploy_azure_subscription_account`
pub const AZURE_SUBSCRIPTION_ACCOUNT: &str = "azure_subscription_account";

static GLOBAL: Lazy<DeprecationReversals> = Lazy::new(DeprecationReversals::from_env);

/// Set of deprecated resource keys the user has re-enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecationReversals {
    keys: BTreeSet<String>,
}

impl DeprecationReversals {
    /// Parse a comma-separated list; entries are trimmed and empty ones
    /// ignored
    pub fn from_value(value: Option<&str>) -> Self {
        let keys = value
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        Self { keys }
    }

    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENV_DEPRECATION_REVERSALS).ok().as_deref())
    }

    /// Process-wide set, read from the environment on first use
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Whether a deprecated resource has been re-enabled through the environment
pub fn is_deprecated_resource_enabled(key: &str) -> bool {
    DeprecationReversals::global().is_enabled(key)
}

/// Report that a deprecated resource is disabled
pub fn deprecated_resource_disabled(diags: &mut Diagnostics, type_name: &str, key: &str) {
    diags.add_error(
        "Deprecated resource is disabled",
        format!(
            "The resource {} has been deprecated and is disabled. To re-enable it temporarily, add \"{}\" to the {} environment variable.",
            type_name, key, ENV_DEPRECATION_REVERSALS
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversal_parsing() {
        let cases: &[(Option<&str>, &str, bool)] = &[
            (None, "azure_subscription_account", false),
            (Some(""), "azure_subscription_account", false),
            (Some("azure_subscription_account"), "azure_subscription_account", true),
            (Some(" other , azure_subscription_account "), "azure_subscription_account", true),
            (Some("other,,"), "azure_subscription_account", false),
            (Some("azure_subscription"), "azure_subscription_account", false),
            (Some(",,"), "", false),
        ];
        for (value, key, expected) in cases {
            assert_eq!(
                DeprecationReversals::from_value(*value).is_enabled(key),
                *expected,
                "{:?} / {}",
                value,
                key
            );
        }
    }

    #[test]
    fn test_disabled_message() {
        let mut diags = Diagnostics::new();
        deprecated_resource_disabled(
            &mut diags,
            "octopusdeploy_azure_subscription_account",
            AZURE_SUBSCRIPTION_ACCOUNT,
        );
        let diag = diags.iter().next().unwrap();
        insta::assert_snapshot!(diag.detail, @r#"The resource octopusdeploy_azure_subscription_account has been deprecated and is disabled. To re-enable it temporarily, add "azure_subscription_account" to the TF_OCTOPUS_DEPRECATION_REVERSALS environment variable."#);
    }
}
