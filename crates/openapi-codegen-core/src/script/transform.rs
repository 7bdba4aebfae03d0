//! Pluggable preprocessing of script source before it is executed.
//!
//! A transform receives the raw text of a script file and returns the
//! JavaScript that is actually run, which is where a TypeScript stripper or a
//! bundler would plug in.

use std::path::Path;

use crate::Result;

/// Rewrites script source into plain JavaScript
pub trait SourceTransform: Send + Sync {
    fn transform(&self, path: &Path, source: String) -> Result<String>;
}

/// Runs scripts exactly as written
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl SourceTransform for Passthrough {
    fn transform(&self, _path: &Path, source: String) -> Result<String> {
        Ok(source)
    }
}

impl<F> SourceTransform for F
where
    F: Fn(&Path, String) -> Result<String> + Send + Sync,
{
    fn transform(&self, path: &Path, source: String) -> Result<String> {
        self(path, source)
    }
}
