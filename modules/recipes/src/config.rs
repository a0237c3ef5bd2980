use serde::{Deserialize, Serialize};

use crate::domain::fields::ValidationProfile;

/// Configuration for the recipes module (`modules.recipes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipesConfig {
    #[serde(default)]
    pub validation_profile: ValidationProfile,
    #[serde(default = "default_html_enabled")]
    pub html_enabled: bool,
    #[serde(default = "default_html_prefix")]
    pub html_prefix: String,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            validation_profile: ValidationProfile::default(),
            html_enabled: default_html_enabled(),
            html_prefix: default_html_prefix(),
        }
    }
}

impl RecipesConfig {
    /// `html_prefix` with a leading slash and no trailing one ("/ui").
    /// The pages cannot share the root with the JSON API, so a blank prefix
    /// falls back to the default.
    pub fn normalized_html_prefix(&self) -> String {
        let trimmed = self.html_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            return default_html_prefix();
        }
        format!("/{trimmed}")
    }
}

fn default_html_enabled() -> bool {
    true
}

fn default_html_prefix() -> String {
    "/ui".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_section_is_empty() {
        let cfg: RecipesConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.validation_profile, ValidationProfile::Standard);
        assert!(cfg.html_enabled);
        assert_eq!(cfg.normalized_html_prefix(), "/ui");
    }

    #[test]
    fn strict_profile_and_prefix_normalization() {
        let cfg: RecipesConfig = serde_json::from_value(serde_json::json!({
            "validation_profile": "strict",
            "html_prefix": "pages/"
        }))
        .unwrap();
        assert_eq!(cfg.validation_profile, ValidationProfile::Strict);
        assert_eq!(cfg.normalized_html_prefix(), "/pages");

        let root = RecipesConfig {
            html_prefix: "/".into(),
            ..Default::default()
        };
        assert_eq!(root.normalized_html_prefix(), "/ui");
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let res: Result<RecipesConfig, _> =
            serde_json::from_value(serde_json::json!({ "validation_profile": "lenient" }));
        assert!(res.is_err());
    }
}
