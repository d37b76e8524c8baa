use std::str::FromStr;

use crate::context::ToolContext;
use crate::description::ToolDescription;
use crate::error::ToolError;
use crate::file_reader::FileReaderTool;
use crate::tool::{Tool, ToolParams, ToolRunReturn};
use crate::vector_query::{VectorQueryKind, VectorQueryTool};

/// Tool implementations a configured tool name can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    FileReader,
    CodeSummaryQuery,
    CodeElementsQuery,
    DocSummaryQuery,
}

impl ToolKind {
    pub const ALL: [Self; 4] = [
        Self::FileReader,
        Self::CodeSummaryQuery,
        Self::CodeElementsQuery,
        Self::DocSummaryQuery,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileReader => "fileReader",
            Self::CodeSummaryQuery => "codeSummaryQuery",
            Self::CodeElementsQuery => "codeElementsQuery",
            Self::DocSummaryQuery => "docSummaryQuery",
        }
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_owned()))
    }
}

/// Generates a match over all `AnyTool` variants, binding the inner tool
/// and evaluating the given closure for each arm.
macro_rules! delegate_tool {
    ($self:expr, |$t:ident| $expr:expr) => {
        match $self {
            AnyTool::FileReader($t) => $expr,
            AnyTool::CodeSummaryQuery($t) => $expr,
            AnyTool::CodeElementsQuery($t) => $expr,
            AnyTool::DocSummaryQuery($t) => $expr,
        }
    };
}

#[derive(Debug)]
pub enum AnyTool {
    FileReader(FileReaderTool),
    CodeSummaryQuery(VectorQueryTool),
    CodeElementsQuery(VectorQueryTool),
    DocSummaryQuery(VectorQueryTool),
}

impl AnyTool {
    /// Construct the `kind` implementation under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Config` for invalid overrides and
    /// `ToolError::Construction` when a vector-backed tool cannot initialise
    /// its collection.
    pub async fn build(
        kind: ToolKind,
        name: &str,
        overrides: &serde_json::Map<String, serde_json::Value>,
        ctx: &ToolContext,
    ) -> Result<Self, ToolError> {
        let tool = match kind {
            ToolKind::FileReader => Self::FileReader(FileReaderTool::new(name, overrides, ctx)?),
            ToolKind::CodeSummaryQuery => Self::CodeSummaryQuery(
                VectorQueryTool::new(VectorQueryKind::CodeSummary, name, overrides, ctx).await?,
            ),
            ToolKind::CodeElementsQuery => Self::CodeElementsQuery(
                VectorQueryTool::new(VectorQueryKind::CodeElements, name, overrides, ctx).await?,
            ),
            ToolKind::DocSummaryQuery => Self::DocSummaryQuery(
                VectorQueryTool::new(VectorQueryKind::DocSummary, name, overrides, ctx).await?,
            ),
        };
        Ok(tool)
    }

    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::FileReader(_) => ToolKind::FileReader,
            Self::CodeSummaryQuery(_) => ToolKind::CodeSummaryQuery,
            Self::CodeElementsQuery(_) => ToolKind::CodeElementsQuery,
            Self::DocSummaryQuery(_) => ToolKind::DocSummaryQuery,
        }
    }
}

impl Tool for AnyTool {
    async fn run(&self, params: &ToolParams) -> ToolRunReturn {
        delegate_tool!(self, |t| t.run(params).await)
    }

    async fn import(&self) -> ToolRunReturn {
        delegate_tool!(self, |t| t.import().await)
    }

    fn description(&self) -> &ToolDescription {
        delegate_tool!(self, |t| t.description())
    }
}
