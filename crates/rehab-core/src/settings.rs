use serde::{Deserialize, Serialize};

pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const KEY_VAR: &str = "AZURE_OPENAI_KEY";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

pub const ENDPOINT_PLACEHOLDER: &str = "<YOUR_AZURE_ENDPOINT>";
pub const KEY_PLACEHOLDER: &str = "<YOUR_AZURE_KEY>";
pub const DEPLOYMENT_PLACEHOLDER: &str = "<YOUR_DEPLOYMENT_NAME>";

pub const DEFAULT_API_VERSION: &str = "2023-10-01-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Connection settings for the chat assistant's completion deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub max_tokens: u32,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            endpoint: ENDPOINT_PLACEHOLDER.to_string(),
            api_key: KEY_PLACEHOLDER.to_string(),
            deployment: DEPLOYMENT_PLACEHOLDER.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AssistSettings {
    /// Read settings from the process environment. Missing variables keep
    /// their placeholder values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: String| lookup(name).unwrap_or(fallback);
        Self {
            endpoint: get(ENDPOINT_VAR, defaults.endpoint),
            api_key: get(KEY_VAR, defaults.api_key),
            deployment: get(DEPLOYMENT_VAR, defaults.deployment),
            api_version: get(API_VERSION_VAR, defaults.api_version),
            max_tokens: defaults.max_tokens,
        }
    }

    /// Chat-completions URL for the configured deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Whether every placeholder has been replaced. Requests are still
/// attempted when this is false; callers use it for diagnostics only.
pub fn assist_configured(settings: &AssistSettings) -> bool {
    [
        (&settings.endpoint, ENDPOINT_PLACEHOLDER),
        (&settings.api_key, KEY_PLACEHOLDER),
        (&settings.deployment, DEPLOYMENT_PLACEHOLDER),
    ]
    .iter()
    .all(|(value, placeholder)| !value.is_empty() && value.as_str() != *placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_vars_fall_back_to_placeholders() {
        let settings = AssistSettings::from_lookup(|_| None);
        assert_eq!(settings, AssistSettings::default());
        assert!(!assist_configured(&settings));
    }

    #[test]
    fn test_lookup_overrides_and_url() {
        let vars: HashMap<&str, &str> = [
            (ENDPOINT_VAR, "https://physio.openai.azure.com/"),
            (KEY_VAR, "secret"),
            (DEPLOYMENT_VAR, "gpt-physio"),
        ]
        .into_iter()
        .collect();
        let settings = AssistSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(assist_configured(&settings));
        assert_eq!(
            settings.completions_url(),
            "https://physio.openai.azure.com/openai/deployments/gpt-physio/chat/completions?api-version=2023-10-01-preview"
        );
    }

    #[test]
    fn test_partial_configuration_is_reported() {
        let settings = AssistSettings::from_lookup(|k| (k == KEY_VAR).then(|| "secret".to_string()));
        assert_eq!(settings.api_key, "secret");
        assert!(!assist_configured(&settings));
    }
}
