use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

fn default_true() -> bool {
    true
}

/// One `[tools.<name>]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolEntry {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tool implementation to instantiate. Defaults to the section name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Overrides merged over the tool's defaults.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl Default for ToolEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            module: None,
            config: serde_json::Map::new(),
        }
    }
}

impl ToolEntry {
    #[must_use]
    pub fn module_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.module.as_deref().unwrap_or(name)
    }
}

/// Tool name → settings.
pub type ToolsConfig = BTreeMap<String, ToolEntry>;

/// Tools enabled when the configuration names none.
#[must_use]
pub fn default_tools() -> ToolsConfig {
    ["codeSummaryQuery", "docSummaryQuery", "fileReader"]
        .into_iter()
        .map(|name| (name.to_owned(), ToolEntry::default()))
        .collect()
}

/// Shallow merge: every key in `overrides` replaces the default's value.
#[must_use]
pub fn merge_config(
    defaults: serde_json::Map<String, serde_json::Value>,
    overrides: &serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut merged = defaults;
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Merge `overrides` over the serialized `defaults` and read the result back
/// as the tool's typed config.
pub(crate) fn typed_config<T>(
    tool: &str,
    defaults: &T,
    overrides: &serde_json::Map<String, serde_json::Value>,
) -> Result<T, ToolError>
where
    T: Serialize + DeserializeOwned,
{
    let config_err = |e: serde_json::Error| ToolError::Config {
        tool: tool.to_owned(),
        message: e.to_string(),
    };
    let serde_json::Value::Object(base) = serde_json::to_value(defaults).map_err(config_err)?
    else {
        return Err(ToolError::Config {
            tool: tool.to_owned(),
            message: "defaults must serialize to an object".into(),
        });
    };
    let merged = merge_config(base, overrides);
    serde_json::from_value(serde_json::Value::Object(merged)).map_err(config_err)
}
