//! Glob-driven file traversal with bounded concurrency and fail-fast semantics.

use std::future::Future;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};

use crate::error::{IndexError, Result};
use crate::fingerprint::{FileFingerprint, fingerprint};

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Root the globs are resolved against.
    pub path: PathBuf,
    /// Whitelist patterns. Empty means every non-hidden file.
    pub include: Vec<String>,
    /// Patterns removed from the include set. Later entries win.
    pub exclude: Vec<String>,
    /// Maximum files in flight; values below 1 are treated as 1.
    pub concurrency: usize,
    pub respect_gitignore: bool,
}

impl TraversalOptions {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            respect_gitignore: false,
        }
    }

    #[must_use]
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }
}

/// Pin a pattern to the root so `*.ts` matches top-level files only.
fn anchored(pattern: &str) -> String {
    let body = pattern.trim_start_matches("./");
    if body.starts_with('/') || body.starts_with("**/") {
        body.to_owned()
    } else {
        format!("/{body}")
    }
}

fn override_line(pattern: &str, negate: bool) -> String {
    let (negate, body) = match pattern.strip_prefix('!') {
        Some(body) => (!negate, body),
        None => (negate, pattern),
    };
    let line = anchored(body);
    if negate { format!("!{line}") } else { line }
}

fn build_overrides(opts: &TraversalOptions) -> Result<Override> {
    let mut builder = OverrideBuilder::new(&opts.path);
    for pattern in &opts.include {
        builder.add(&override_line(pattern, false))?;
    }
    for pattern in &opts.exclude {
        builder.add(&override_line(pattern, true))?;
    }
    Ok(builder.build()?)
}

/// Matched files relative to `opts.path`, sorted lexically.
///
/// # Errors
///
/// Returns `IndexError::Glob` if a pattern does not parse, and
/// `IndexError::Walk` for the first entry the walk cannot list.
pub fn collect_paths(opts: &TraversalOptions) -> Result<Vec<PathBuf>> {
    let overrides = build_overrides(opts)?;
    let respect = opts.respect_gitignore;

    let walk = WalkBuilder::new(&opts.path)
        .hidden(true)
        .parents(respect)
        .ignore(respect)
        .git_ignore(respect)
        .git_global(respect)
        .git_exclude(respect)
        .require_git(false)
        .overrides(overrides)
        .build();

    let mut paths = Vec::new();
    for entry in walk {
        let entry = entry.map_err(IndexError::Walk)?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            paths.push(relative_to(&opts.path, entry.path()));
        }
    }

    paths.sort();
    Ok(paths)
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Read, fingerprint, and hand every matched file to `handle`.
///
/// Files are dispatched in lexical order with at most `opts.concurrency` in
/// flight, and results come back in the same order. The first failure stops
/// dispatch and is returned as [`IndexError::Aborted`]; work that already
/// completed is kept.
///
/// # Errors
///
/// Returns `IndexError::Glob` for an invalid pattern, `IndexError::Walk` when
/// part of the tree cannot be listed, or `IndexError::Aborted` wrapping the
/// first read or handler failure.
pub async fn process_files<T, F, Fut>(opts: &TraversalOptions, handle: F) -> Result<Vec<T>>
where
    F: Fn(FileFingerprint) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let paths = collect_paths(opts)?;
    let root = opts.path.as_path();
    let handle = &handle;
    tracing::debug!(root = %root.display(), files = paths.len(), "traversal started");

    let mut results = futures::stream::iter(paths)
        .map(|rel| async move {
            let abs = root.join(&rel);
            let outcome = match tokio::fs::read(&abs).await {
                Ok(content) => handle(fingerprint(&rel, content)).await,
                Err(source) => Err(IndexError::FileRead { path: abs, source }),
            };
            outcome.map_err(|e| IndexError::Aborted {
                path: rel,
                source: Box::new(e),
            })
        })
        .buffered(opts.concurrency.max(1));

    let mut out = Vec::new();
    while let Some(result) = results.next().await {
        out.push(result?);
    }
    Ok(out)
}
