//! Vector-backed query tools: `codeSummaryQuery`, `codeElementsQuery`, `docSummaryQuery`.
//!
//! All three share one implementation. `import` vectorizes the project with a
//! kind-specific summarize prompt; `run` embeds the query and returns the
//! nearest files as JSON.

use std::path::PathBuf;

use codellm_index::{SummarizePrompt, VectorizeConfig, Vectorizer};
use codellm_memory::{MAX_QUERY_RESULTS, QueryResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::typed_config;
use crate::context::ToolContext;
use crate::description::ToolDescription;
use crate::error::ToolError;
use crate::tool::{Tool, ToolParams, ToolRunReturn, deserialize_params};

const CODE_SUMMARY_DESCRIPTION: &str = "Searches summaries of the project's source files. Use it \
to find the files relevant to a question about how the code works. Returns the closest files \
with their summaries, and their content when includeCode is set.";

const CODE_ELEMENTS_DESCRIPTION: &str = "Searches the code elements (functions, types, exports) \
defined in the project's source files. Use it to find where something is defined or which file \
provides a capability. Returns the closest files with their element lists.";

const DOC_SUMMARY_DESCRIPTION: &str = "Searches the project's documentation (markdown and text \
files). Use it to answer questions about usage, setup and configuration. Returns the closest \
documents with their summaries and content.";

pub const DEFAULT_NUM_RESULTS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorQueryKind {
    CodeSummary,
    CodeElements,
    DocSummary,
}

impl VectorQueryKind {
    fn description(self) -> &'static str {
        match self {
            Self::CodeSummary => CODE_SUMMARY_DESCRIPTION,
            Self::CodeElements => CODE_ELEMENTS_DESCRIPTION,
            Self::DocSummary => DOC_SUMMARY_DESCRIPTION,
        }
    }

    fn prompt(self) -> SummarizePrompt {
        match self {
            Self::CodeSummary => SummarizePrompt::code_summary(),
            Self::CodeElements => SummarizePrompt::code_elements(),
            Self::DocSummary => SummarizePrompt::doc_summary(),
        }
    }

    fn schema(self) -> schemars::Schema {
        match self {
            Self::CodeSummary | Self::CodeElements => schemars::schema_for!(CodeQueryParams),
            Self::DocSummary => schemars::schema_for!(DocQueryParams),
        }
    }

    fn include(self) -> Vec<String> {
        let patterns: &[&str] = match self {
            Self::CodeSummary | Self::CodeElements => &["**/*.{ts,tsx,js,jsx,rs,py,go}"],
            Self::DocSummary => &["**/*.md", "**/*.mdx", "**/*.txt"],
        };
        patterns.iter().map(|&p| p.to_owned()).collect()
    }

    fn exclude(self) -> Vec<String> {
        let patterns: &[&str] = match self {
            Self::CodeSummary | Self::CodeElements => &[
                "**/*.test.*",
                "**/*.spec.*",
                "**/tests/**",
                "**/node_modules/**",
                "**/target/**",
            ],
            Self::DocSummary => &["**/node_modules/**", "**/target/**"],
        };
        patterns.iter().map(|&p| p.to_owned()).collect()
    }
}

/// Settings shared by every vector-backed tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizeFilesConfig {
    /// Root to index. Relative paths resolve against the project path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub num_results: usize,
    pub concurrency: usize,
    pub include_content: bool,
    pub prune: bool,
    pub respect_gitignore: bool,
}

impl VectorizeFilesConfig {
    #[must_use]
    pub fn defaults(kind: VectorQueryKind) -> Self {
        Self {
            path: None,
            include: kind.include(),
            exclude: kind.exclude(),
            num_results: DEFAULT_NUM_RESULTS,
            concurrency: codellm_index::traversal::DEFAULT_CONCURRENCY,
            include_content: true,
            prune: false,
            respect_gitignore: false,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CodeQueryParams {
    /// A natural-language description of the code you are looking for
    query: String,
    /// Include the full content of each matching file
    #[serde(default)]
    include_code: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DocQueryParams {
    /// A natural-language question about the project's documentation
    query: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeHit<'a> {
    distance: f32,
    file_path: &'a str,
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_content: Option<&'a str>,
}

#[derive(Serialize)]
struct DocHit<'a> {
    distance: f32,
    path: &'a str,
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

fn stored_content(result: &QueryResult, wanted: bool) -> Option<&str> {
    if wanted {
        result.metadata.file_content.as_deref()
    } else {
        None
    }
}

pub struct VectorQueryTool {
    kind: VectorQueryKind,
    num_results: usize,
    prompt: SummarizePrompt,
    vectorizer: Vectorizer,
    description: ToolDescription,
}

impl std::fmt::Debug for VectorQueryTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorQueryTool")
            .field("kind", &self.kind)
            .field("collection", &self.vectorizer.client().collection())
            .finish_non_exhaustive()
    }
}

impl VectorQueryTool {
    /// Build the tool on collection `name` and initialise its backing client.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Config` for an invalid merged config and
    /// `ToolError::Construction` if the vector client cannot be initialised.
    pub async fn new(
        kind: VectorQueryKind,
        name: &str,
        overrides: &serde_json::Map<String, serde_json::Value>,
        ctx: &ToolContext,
    ) -> Result<Self, ToolError> {
        let config = typed_config(name, &VectorizeFilesConfig::defaults(kind), overrides)?;
        if !(1..=MAX_QUERY_RESULTS).contains(&config.num_results) {
            return Err(ToolError::Config {
                tool: name.to_owned(),
                message: format!(
                    "numResults must be between 1 and {MAX_QUERY_RESULTS}, got {}",
                    config.num_results
                ),
            });
        }

        let client = ctx.vector_client(name);
        client
            .init()
            .await
            .map_err(|source| ToolError::Construction {
                tool: name.to_owned(),
                source,
            })?;

        let path = match &config.path {
            Some(p) => ctx.project_path().join(p),
            None => ctx.project_path().to_path_buf(),
        };
        let vectorize = VectorizeConfig {
            path,
            include: config.include,
            exclude: config.exclude,
            concurrency: config.concurrency,
            include_content: config.include_content,
            prune: config.prune,
            respect_gitignore: config.respect_gitignore,
        };

        Ok(Self {
            kind,
            num_results: config.num_results,
            prompt: kind.prompt(),
            vectorizer: Vectorizer::new(client, ctx.summarization().clone(), vectorize),
            description: ToolDescription::from_schema(name, kind.description(), &kind.schema()),
        })
    }

    #[must_use]
    pub fn kind(&self) -> VectorQueryKind {
        self.kind
    }

    async fn query(&self, params: &ToolParams) -> Result<String, ToolError> {
        let (query, include_code) = match self.kind {
            VectorQueryKind::CodeSummary | VectorQueryKind::CodeElements => {
                let p: CodeQueryParams = deserialize_params(params)?;
                (p.query, p.include_code.unwrap_or(false))
            }
            VectorQueryKind::DocSummary => {
                let p: DocQueryParams = deserialize_params(params)?;
                (p.query, true)
            }
        };

        let results = self
            .vectorizer
            .client()
            .query(query.into(), self.num_results)
            .await?;
        tracing::debug!(
            collection = self.vectorizer.client().collection(),
            hits = results.len(),
            "query complete"
        );
        self.render(&results, include_code)
    }

    fn render(&self, results: &[QueryResult], include_content: bool) -> Result<String, ToolError> {
        let json = match self.kind {
            VectorQueryKind::CodeSummary | VectorQueryKind::CodeElements => {
                let hits: Vec<CodeHit<'_>> = results
                    .iter()
                    .map(|r| CodeHit {
                        distance: r.distance,
                        file_path: &r.metadata.file_path,
                        summary: &r.document,
                        file_content: stored_content(r, include_content),
                    })
                    .collect();
                serde_json::to_string(&hits)?
            }
            VectorQueryKind::DocSummary => {
                let hits: Vec<DocHit<'_>> = results
                    .iter()
                    .map(|r| DocHit {
                        distance: r.distance,
                        path: &r.metadata.file_path,
                        summary: &r.document,
                        content: stored_content(r, include_content),
                    })
                    .collect();
                serde_json::to_string(&hits)?
            }
        };
        Ok(json)
    }

    async fn vectorize(&self) -> Result<String, ToolError> {
        let stats = self.vectorizer.vectorize_files(Some(&self.prompt)).await?;
        tracing::info!(
            tool = %self.description.name,
            added = stats.added,
            updated = stats.updated,
            unchanged = stats.unchanged,
            removed = stats.removed,
            "import finished"
        );
        Ok("Import complete".to_owned())
    }
}

impl Tool for VectorQueryTool {
    async fn run(&self, params: &ToolParams) -> ToolRunReturn {
        self.query(params).await.into()
    }

    async fn import(&self) -> ToolRunReturn {
        self.vectorize().await.into()
    }

    fn description(&self) -> &ToolDescription {
        &self.description
    }
}
