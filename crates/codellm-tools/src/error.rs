#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid config for tool {tool}: {message}")]
    Config { tool: String, message: String },

    #[error("failed to construct tool {tool}: {source}")]
    Construction {
        tool: String,
        #[source]
        source: codellm_memory::VectorStoreError,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("import failed: {0}")]
    Import(#[from] codellm_index::IndexError),

    #[error("query failed: {0}")]
    Query(#[from] codellm_memory::VectorStoreError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
