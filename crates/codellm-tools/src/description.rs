use std::fmt::Write;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Boolean,
    Number,
    Array,
}

impl ParamKind {
    fn from_schema_type(ty: &str) -> Self {
        match ty {
            "boolean" => Self::Boolean,
            "number" | "integer" => Self::Number,
            "array" => Self::Array,
            _ => Self::String,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Array => "array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub required: bool,
}

/// What the orchestrator is told about a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolDescription {
    /// Build a description whose params are read from the JSON schema of the
    /// tool's params struct. Field doc comments become param descriptions.
    #[must_use]
    pub fn from_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &schemars::Schema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: schema_params(schema),
        }
    }

    fn write_to(&self, out: &mut String) {
        let _ = writeln!(out, "## {}", self.name);
        let _ = writeln!(out, "{}", self.description);
        if !self.params.is_empty() {
            let _ = writeln!(out, "Parameters:");
            for p in &self.params {
                let req = if p.required { "required" } else { "optional" };
                let _ = writeln!(
                    out,
                    "  - {}: {} ({}, {req})",
                    p.name,
                    p.description,
                    p.kind.as_str()
                );
            }
        }
        out.push('\n');
    }
}

/// Render descriptions as the tool section of an orchestrator prompt.
#[must_use]
pub fn format_descriptions<'a>(
    descriptions: impl IntoIterator<Item = &'a ToolDescription>,
) -> String {
    let mut out = String::from("<tools>\n");
    for d in descriptions {
        d.write_to(&mut out);
    }
    out.push_str("</tools>");
    out
}

/// Extract the primary type when schemars renders `Option<T>` as `"type": ["T", "null"]`
/// or `"anyOf": [{"type": "T"}, {"type": "null"}]`.
fn extract_non_null_type(obj: &serde_json::Map<String, serde_json::Value>) -> Option<&str> {
    if let Some(arr) = obj.get("type").and_then(|v| v.as_array()) {
        return arr.iter().filter_map(|v| v.as_str()).find(|t| *t != "null");
    }
    obj.get("anyOf")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_object())
        .filter_map(|o| o.get("type")?.as_str())
        .find(|t| *t != "null")
}

fn schema_params(schema: &schemars::Schema) -> Vec<ToolParam> {
    let Some(obj) = schema.as_object() else {
        return Vec::new();
    };
    let Some(serde_json::Value::Object(props)) = obj.get("properties") else {
        return Vec::new();
    };

    let required: Vec<&str> = obj
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    props
        .iter()
        .map(|(name, prop)| {
            let prop_obj = prop.as_object();
            let ty = prop_obj
                .and_then(|o| {
                    o.get("type")
                        .and_then(|v| v.as_str())
                        .or_else(|| extract_non_null_type(o))
                })
                .unwrap_or("string");
            let description = prop_obj
                .and_then(|o| o.get("description"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_owned();
            ToolParam {
                name: name.clone(),
                description,
                kind: ParamKind::from_schema_type(ty),
                required: required.contains(&name.as_str()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::Deserialize;

    use super::*;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct SampleParams {
        /// What to search for
        query: String,
        /// Include the file body
        include_code: Option<bool>,
        /// Files to read
        file_paths: Vec<String>,
        /// How many
        limit: Option<u32>,
    }

    fn sample() -> ToolDescription {
        ToolDescription::from_schema(
            "sample",
            "A sample tool",
            &schemars::schema_for!(SampleParams),
        )
    }

    fn param<'a>(d: &'a ToolDescription, name: &str) -> &'a ToolParam {
        d.params.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn params_follow_schema() {
        let d = sample();
        assert_eq!(d.params.len(), 4);

        let query = param(&d, "query");
        assert_eq!(query.kind, ParamKind::String);
        assert!(query.required);
        assert_eq!(query.description, "What to search for");

        let include = param(&d, "includeCode");
        assert_eq!(include.kind, ParamKind::Boolean);
        assert!(!include.required);

        assert_eq!(param(&d, "filePaths").kind, ParamKind::Array);
        assert_eq!(param(&d, "limit").kind, ParamKind::Number);
    }

    #[test]
    fn format_lists_params() {
        let prompt = format_descriptions([&sample()]);
        assert!(prompt.starts_with("<tools>\n## sample\nA sample tool\n"));
        assert!(prompt.contains("  - query: What to search for (string, required)"));
        assert!(prompt.contains("  - includeCode: Include the file body (boolean, optional)"));
        assert!(prompt.ends_with("</tools>"));
    }

    #[test]
    fn format_empty() {
        assert_eq!(format_descriptions([]), "<tools>\n</tools>");
    }

    #[test]
    fn param_kind_serializes_as_type() {
        let json = serde_json::to_value(param(&sample(), "filePaths")).unwrap();
        assert_eq!(json["type"], "array");
        assert_eq!(json["required"], true);
    }
}
