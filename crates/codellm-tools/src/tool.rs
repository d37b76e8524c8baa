use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::description::ToolDescription;
use crate::error::ToolError;

/// Named parameters passed to [`Tool::run`].
pub type ToolParams = serde_json::Map<String, serde_json::Value>;

/// Result of a tool invocation. Failures are reported here, never as panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRunReturn {
    pub success: bool,
    pub content: String,
}

impl ToolRunReturn {
    #[must_use]
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn fail(content: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
        }
    }
}

impl From<Result<String, ToolError>> for ToolRunReturn {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(content) => Self::ok(content),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

/// The uniform capability every tool exposes to the orchestrator.
pub trait Tool: Send + Sync {
    /// Answer a request described by `params`.
    fn run(&self, params: &ToolParams) -> impl Future<Output = ToolRunReturn> + Send;

    /// Prepare whatever the tool needs ahead of queries (e.g. build its index).
    fn import(&self) -> impl Future<Output = ToolRunReturn> + Send;

    fn description(&self) -> &ToolDescription;
}

/// Deserialize tool params into a typed struct.
///
/// # Errors
///
/// Returns `ToolError::InvalidInput` when deserialization fails.
pub fn deserialize_params<T: serde::de::DeserializeOwned>(
    params: &ToolParams,
) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(params.clone()))
        .map_err(|e| ToolError::InvalidInput(format!("invalid params: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct QueryParams {
        query: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    fn params(value: serde_json::Value) -> ToolParams {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn deserialize_params_valid() {
        let p: QueryParams =
            deserialize_params(&params(serde_json::json!({"query": "where is main"}))).unwrap();
        assert_eq!(p.query, "where is main");
        assert!(p.limit.is_none());
    }

    #[test]
    fn deserialize_params_missing_required_field() {
        let err = deserialize_params::<QueryParams>(&ToolParams::new()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn deserialize_params_wrong_type() {
        let bad = params(serde_json::json!({"query": 5}));
        let err = deserialize_params::<QueryParams>(&bad).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn deserialize_params_ignores_extra_fields() {
        let p: QueryParams = deserialize_params(&params(
            serde_json::json!({"query": "q", "extra": true}),
        ))
        .unwrap();
        assert_eq!(p.query, "q");
    }

    #[test]
    fn run_return_from_result() {
        assert_eq!(
            ToolRunReturn::from(Ok("done".to_owned())),
            ToolRunReturn::ok("done")
        );
        let failed = ToolRunReturn::from(Err(ToolError::InvalidInput("bad".into())));
        assert!(!failed.success);
        assert_eq!(failed.content, "bad");
    }

    #[test]
    fn run_return_serializes_shape() {
        let json = serde_json::to_value(ToolRunReturn::fail("x")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "content": "x"}));
    }
}
