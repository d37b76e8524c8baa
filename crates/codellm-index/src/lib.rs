//! Incremental vectorization: content fingerprints, bounded-concurrency file
//! traversal, and the summarize → embed → upsert pipeline.

pub mod error;
pub mod fingerprint;
pub mod prompt;
pub mod traversal;
pub mod vectorize;

pub use error::{IndexError, Result};
pub use fingerprint::{FileFingerprint, fingerprint};
pub use prompt::SummarizePrompt;
pub use traversal::{TraversalOptions, process_files};
pub use vectorize::{VectorizeConfig, VectorizeStats, Vectorizer};
