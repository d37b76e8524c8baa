use std::collections::BTreeMap;

use crate::any::{AnyTool, ToolKind};
use crate::config::{ToolEntry, ToolsConfig};
use crate::context::ToolContext;
use crate::description::format_descriptions;
use crate::error::ToolError;
use crate::tool::{Tool, ToolParams, ToolRunReturn};

/// Configured tools by name, built once at startup.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, AnyTool>,
}

impl ToolRegistry {
    /// Build the tool configured under `name`.
    ///
    /// The implementation is chosen by `tools.<name>.module`, falling back to
    /// `name` itself. A name with no section gets an empty override.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UnknownTool` if the module names no tool
    /// implementation, or the construction error of the tool itself.
    pub async fn new_tool(
        name: &str,
        tools: &ToolsConfig,
        ctx: &ToolContext,
    ) -> Result<AnyTool, ToolError> {
        let default_entry = ToolEntry::default();
        let entry = tools.get(name).unwrap_or(&default_entry);
        let kind: ToolKind = entry.module_or(name).parse()?;
        AnyTool::build(kind, name, &entry.config, ctx).await
    }

    /// Build every enabled tool.
    ///
    /// # Errors
    ///
    /// Returns the first construction failure; no partial registry is returned.
    pub async fn from_config(tools: &ToolsConfig, ctx: &ToolContext) -> Result<Self, ToolError> {
        let mut registry = Self::default();
        for (name, entry) in tools {
            if !entry.enabled {
                tracing::debug!(tool = %name, "tool disabled");
                continue;
            }
            let tool = Self::new_tool(name, tools, ctx).await.inspect_err(|e| {
                tracing::warn!(tool = %name, "tool construction failed: {e}");
            })?;
            tracing::debug!(tool = %name, kind = tool.kind().as_str(), "tool registered");
            registry.insert(name.clone(), tool);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: impl Into<String>, tool: AnyTool) {
        self.tools.insert(name.into(), tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AnyTool> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn run(&self, name: &str, params: &ToolParams) -> ToolRunReturn {
        match self.get(name) {
            Some(tool) => tool.run(params).await,
            None => ToolRunReturn::fail(ToolError::UnknownTool(name.to_owned()).to_string()),
        }
    }

    pub async fn import(&self, name: &str) -> ToolRunReturn {
        match self.get(name) {
            Some(tool) => tool.import().await,
            None => ToolRunReturn::fail(ToolError::UnknownTool(name.to_owned()).to_string()),
        }
    }

    /// Run `import` on every tool, one at a time, in name order.
    pub async fn import_all(&self) -> Vec<(String, ToolRunReturn)> {
        let mut results = Vec::with_capacity(self.tools.len());
        for (name, tool) in &self.tools {
            tracing::info!(tool = %name, "importing");
            let result = tool.import().await;
            if !result.success {
                tracing::warn!(tool = %name, "import failed: {}", result.content);
            }
            results.push((name.clone(), result));
        }
        results
    }

    /// Tool section for an orchestrator prompt.
    #[must_use]
    pub fn format_descriptions(&self) -> String {
        format_descriptions(self.tools.values().map(Tool::description))
    }
}
