//! Error handling for the OpenAPI code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! Every error is fatal to the render invocation that produced it. Variants
//! carry the offending file path and, for script failures, the JavaScript
//! `String()` form of the thrown value.
//!
//! # Examples
//!
//! ```
//! use openapi_codegen_core::error::{Error, Result};
//!
//! fn might_fail(template_dir: &str) -> Result<()> {
//!     if template_dir.is_empty() {
//!         return Err(Error::config("template_dir must be specified"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(might_fail("").is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for code generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for code generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a known file or directory
    #[error("I/O error at {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// OpenAPI error
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The template directory could not be walked
    #[error("Failed to walk template directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A path was expected to live below a root directory
    #[error("{} is not inside {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// A script file failed while running its top-level code
    #[error("Failed to load script {}: {message}", file.display())]
    ScriptLoad { file: PathBuf, message: String },

    /// A registered template command threw during one invocation
    #[error("Template command '{command}' from {} failed: {message}", file.display())]
    ScriptCall {
        command: String,
        file: PathBuf,
        message: String,
    },

    /// The embedded interpreter itself failed
    #[error("Script runtime error: {0}")]
    ScriptRuntime(#[from] rquickjs::Error),

    /// Template syntax error
    #[error("Failed to parse template {}: {message}", file.display())]
    TemplateParse { file: PathBuf, message: String },

    /// Template execution error
    #[error("Failed to render template {}: {message}", file.display())]
    TemplateRender { file: PathBuf, message: String },

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Attach the path an I/O operation was working on
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }
}

/// Flattens an error and all of its sources into one line.
///
/// Tera reports a failing function call as a chain ("Failed to render ...",
/// "Function call ... failed", then the script's own message); only the
/// outermost link shows up in `Display`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let outer = tera::Error::chain("Failed to render 'a.tmpl'", inner);
        let message = error_chain(&outer);
        assert!(message.starts_with("Failed to render 'a.tmpl'"));
        assert!(message.ends_with("boom"));
    }

    #[test]
    fn test_file_error_names_path() {
        let err = Error::file(
            "/out/src/lib.rs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error at /out/src/lib.rs: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_script_call_display() {
        let err = Error::ScriptCall {
            command: "upper".to_string(),
            file: PathBuf::from("/t/helpers.js"),
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Template command 'upper' from /t/helpers.js failed: boom"
        );
    }
}
