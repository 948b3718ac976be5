use serde::{Deserialize, Serialize};

/// Platform-wide settings document. Defaults apply until an admin writes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub site_name: String,
    pub welcome_message: String,
    pub support_email: String,
    pub maintenance_mode: bool,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            site_name: "LearnHub".to_string(),
            welcome_message: "Welcome to LearnHub!".to_string(),
            support_email: "support@learnhub.example".to_string(),
            maintenance_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    pub welcome_message: Option<String>,
    pub support_email: Option<String>,
    pub maintenance_mode: Option<bool>,
}
