//! `fileReader`: return the contents of project files by path.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::typed_config;
use crate::context::ToolContext;
use crate::description::ToolDescription;
use crate::error::ToolError;
use crate::tool::{Tool, ToolParams, ToolRunReturn, deserialize_params};

const DESCRIPTION: &str = "This tool accepts an array of full or relative file paths within the \
project and returns the contents of the files. If you do not have the full file path, use another \
tool to get it.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReaderConfig {
    pub max_file_count: usize,
}

impl Default for FileReaderConfig {
    fn default() -> Self {
        Self { max_file_count: 10 }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct FileReaderParams {
    /// The relative or full paths of the files to read. The paths must be within the project's
    /// base path. This does NOT support glob patterns or wildcards.
    file_paths: Vec<String>,
}

#[derive(Debug)]
pub struct FileReaderTool {
    config: FileReaderConfig,
    root: PathBuf,
    description: ToolDescription,
}

impl FileReaderTool {
    /// # Errors
    ///
    /// Returns `ToolError::Config` if `overrides` does not fit [`FileReaderConfig`].
    pub fn new(
        name: &str,
        overrides: &serde_json::Map<String, serde_json::Value>,
        ctx: &ToolContext,
    ) -> Result<Self, ToolError> {
        let config = typed_config(name, &FileReaderConfig::default(), overrides)?;
        let root = resolve_via_ancestors(ctx.project_path());
        Ok(Self {
            config,
            root,
            description: ToolDescription::from_schema(
                name,
                DESCRIPTION,
                &schemars::schema_for!(FileReaderParams),
            ),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FileReaderConfig {
        &self.config
    }

    fn validate(&self, params: &ToolParams) -> Result<Vec<String>, ToolError> {
        if !params.get("filePaths").is_some_and(serde_json::Value::is_array) {
            return Err(ToolError::InvalidInput("filePaths must be an array".into()));
        }
        let FileReaderParams { file_paths } = deserialize_params(params)?;
        if file_paths.len() > self.config.max_file_count {
            return Err(ToolError::InvalidInput(format!(
                "The maximum number of files that can be read is {}",
                self.config.max_file_count
            )));
        }
        Ok(file_paths)
    }

    fn resolve(&self, file_path: &str) -> Result<PathBuf, ToolError> {
        let path = Path::new(file_path);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let resolved = resolve_via_ancestors(&joined);
        if !resolved.starts_with(&self.root) {
            return Err(ToolError::InvalidInput(format!(
                "{file_path} is outside the project path"
            )));
        }
        Ok(resolved)
    }

    async fn read_files(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_paths = self.validate(params)?;
        let resolved = file_paths
            .iter()
            .map(|p| self.resolve(p))
            .collect::<Result<Vec<_>, _>>()?;

        let blocks = futures::future::try_join_all(file_paths.iter().zip(resolved).map(
            |(file_path, abs)| async move {
                tracing::debug!(file_path = %file_path, resolved = %abs.display(), "reading file");
                let content = tokio::fs::read_to_string(&abs)
                    .await
                    .map_err(|source| ToolError::Read {
                        path: file_path.clone(),
                        source,
                    })?;
                Ok::<_, ToolError>(format!(
                    "#### {file_path} content:\n{content}\n#### end {file_path} content"
                ))
            },
        ))
        .await?;

        Ok(blocks.join("\n"))
    }
}

impl Tool for FileReaderTool {
    async fn run(&self, params: &ToolParams) -> ToolRunReturn {
        self.read_files(params).await.into()
    }

    async fn import(&self) -> ToolRunReturn {
        ToolRunReturn::ok("unimplemented")
    }

    fn description(&self) -> &ToolDescription {
        &self.description
    }
}

/// Canonicalize a path by walking up to the nearest existing ancestor.
fn resolve_via_ancestors(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut suffix = PathBuf::new();
    while !existing.exists() {
        let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
            break;
        };
        suffix = PathBuf::from(name).join(&suffix);
        existing = parent;
    }
    let base = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    if suffix.as_os_str().is_empty() {
        base
    } else {
        base.join(&suffix)
    }
}
