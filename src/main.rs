//! `codellm` command line: index a project and query it through the configured tools.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use codellm_core::AppBuilder;
use codellm_core::config::LogLevel;
use codellm_tools::{ToolParams, ToolRunReturn};

#[derive(Parser)]
#[command(
    name = "codellm",
    version,
    about = "Incrementally index a code base and query it through configured tools"
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "codellm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or refresh the index of every tool, or of one tool.
    ///
    /// Unchanged files are skipped, so rerunning is cheap.
    Import {
        /// Only import this tool.
        #[arg(long)]
        tool: Option<String>,
    },

    /// Run a tool once and print its output.
    Run {
        /// Configured tool name, e.g. `codeSummaryQuery`.
        tool: String,

        /// Tool parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,
    },

    /// Print the description of every configured tool.
    Tools,
}

fn init_subscriber(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_params(raw: &str) -> anyhow::Result<ToolParams> {
    serde_json::from_str(raw).context("--params must be a JSON object")
}

fn finish(tool: &str, result: ToolRunReturn) -> anyhow::Result<()> {
    if !result.success {
        bail!("{tool} failed: {}", result.content);
    }
    println!("{}", result.content);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppBuilder::load(&cli.config)?;
    init_subscriber(app.config().log_level);
    tracing::debug!(
        config = %cli.config.display(),
        project = %app.config().paths.project.display(),
        "configuration loaded"
    );

    let registry = app.build_registry().await?;

    match cli.command {
        Commands::Import { tool: Some(name) } => {
            let result = registry.import(&name).await;
            finish(&name, result)
        }
        Commands::Import { tool: None } => {
            let results = registry.import_all().await;
            let mut failed = Vec::new();
            for (name, result) in results {
                if result.success {
                    println!("{name}: {}", result.content);
                } else {
                    eprintln!("{name}: {}", result.content);
                    failed.push(name);
                }
            }
            if !failed.is_empty() {
                bail!("import failed for: {}", failed.join(", "));
            }
            Ok(())
        }
        Commands::Run { tool, params } => {
            let params = parse_params(&params)?;
            let result = registry.run(&tool, &params).await;
            finish(&tool, result)
        }
        Commands::Tools => {
            println!("{}", registry.format_descriptions());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_with_params() {
        let cli = Cli::try_parse_from([
            "codellm",
            "--config",
            "custom.toml",
            "run",
            "fileReader",
            "--params",
            r#"{"filePaths":["a.rs"]}"#,
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        let Commands::Run { tool, params } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(tool, "fileReader");
        assert_eq!(parse_params(&params).unwrap()["filePaths"][0], "a.rs");
    }

    #[test]
    fn cli_parses_import_for_one_tool() {
        let cli = Cli::try_parse_from(["codellm", "import", "--tool", "docSummaryQuery"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("codellm.toml"));
        assert!(matches!(
            cli.command,
            Commands::Import { tool: Some(ref t) } if t == "docSummaryQuery"
        ));
    }

    #[test]
    fn params_must_be_an_object() {
        assert!(parse_params("[1, 2]").is_err());
        assert!(parse_params("{}").unwrap().is_empty());
    }

    #[test]
    fn failed_result_is_an_error() {
        let err = finish("fileReader", ToolRunReturn::fail("too many files")).unwrap_err();
        assert_eq!(err.to_string(), "fileReader failed: too many files");
        assert!(finish("fileReader", ToolRunReturn::ok("done")).is_ok());
    }
}
