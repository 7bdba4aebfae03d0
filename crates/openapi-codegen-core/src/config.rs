//! Configuration management for OpenAPI code generation.
//!
//! This module defines the `Config` struct and related functionality for managing
//! code generation settings. The configuration can be loaded from a YAML, JSON or
//! TOML file, created programmatically, or assembled from command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use openapi_codegen_core::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> openapi_codegen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("openapi.yaml", "templates/go-server", "generated");
//! config.verify = true;
//!
//! // Or load from a config file
//! let config = Config::from_file("codegen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;
use std::time::Duration;

use crate::templates::RenderOptions;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for one code generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path or URL of the OpenAPI document
    pub openapi_schema_path: String,

    /// Directory holding the template and script files
    pub template_dir: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Validate the document as OpenAPI 3 before rendering
    #[serde(default)]
    pub verify: bool,

    /// Marker extension of template files, stripped from output names
    #[serde(default = "default_template_extension")]
    pub template_extension: String,

    /// Extensions of script files that register template commands
    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,

    /// Optional deadline for each script run or command call, in milliseconds
    #[serde(default)]
    pub script_timeout_ms: Option<u64>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(
        openapi_schema_path: impl Into<String>,
        template_dir: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            openapi_schema_path: openapi_schema_path.into(),
            template_dir: template_dir.into(),
            output_dir: output_dir.into(),
            verify: false,
            template_extension: default_template_extension(),
            script_extensions: default_script_extensions(),
            script_timeout_ms: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// The format follows the extension: `.json`, `.toml`, anything else is YAML.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = match extension_of(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file, picking the format like [`Config::from_file`]
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match extension_of(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| crate::Error::config(format!("Failed to serialize config: {e}")))?,
            _ => serde_yaml::to_string(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check that every required path is present.
    ///
    /// Runs before any I/O so a missing input is reported immediately.
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("openapi_schema_path", &self.openapi_schema_path),
            ("template_dir", &self.template_dir),
            ("output_dir", &self.output_dir),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(crate::Error::config(format!("{name} must be specified")));
            }
        }

        if normalize_extension(&self.template_extension).is_empty() {
            return Err(crate::Error::config("template_extension must not be empty"));
        }
        if self
            .script_extensions
            .iter()
            .any(|ext| normalize_extension(ext).is_empty())
        {
            return Err(crate::Error::config("script_extensions must not contain empty entries"));
        }
        Ok(())
    }

    /// Renderer options derived from this configuration
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            template_extension: normalize_extension(&self.template_extension),
            script_extensions: self
                .script_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            script_timeout: self.script_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Strip the leading dot users tend to write (`".js"` and `"js"` are the same)
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn default_template_extension() -> String {
    "tmpl".to_string()
}

fn default_script_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;

        let mut config = Config::new("openapi.json", "templates", "output");
        config.verify = true;
        config.script_timeout_ms = Some(250);

        for name in ["config.yaml", "config.json", "config.toml"] {
            let file_path = dir.path().join(name);
            config.save(&file_path).await?;

            let loaded = Config::from_file(&file_path).await?;
            assert_eq!(loaded.openapi_schema_path, "openapi.json");
            assert_eq!(loaded.template_dir, "templates");
            assert_eq!(loaded.output_dir, "output");
            assert!(loaded.verify);
            assert_eq!(loaded.template_extension, "tmpl");
            assert_eq!(loaded.script_extensions, vec!["js".to_string()]);
            assert_eq!(loaded.script_timeout_ms, Some(250));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_defaults_apply_to_sparse_files() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("codegen.yaml");
        tokio::fs::write(
            &file_path,
            "openapi_schema_path: api.yaml\ntemplate_dir: tpl\noutput_dir: out\n",
        )
        .await?;

        let config = Config::from_file(&file_path).await?;
        assert!(!config.verify);
        assert_eq!(config.template_extension, "tmpl");
        assert_eq!(config.script_extensions, vec!["js".to_string()]);
        assert_eq!(config.script_timeout_ms, None);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_missing_paths() {
        assert!(Config::new("api.json", "tpl", "out").validate().is_ok());

        let err = Config::new("", "tpl", "out").validate().unwrap_err();
        assert!(err.to_string().contains("openapi_schema_path"));

        let err = Config::new("api.json", " ", "out").validate().unwrap_err();
        assert!(err.to_string().contains("template_dir"));

        let err = Config::new("api.json", "tpl", "").validate().unwrap_err();
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn test_render_options_strip_dots() {
        let mut config = Config::new("api.json", "tpl", "out");
        config.template_extension = ".tera".to_string();
        config.script_extensions = vec![".js".to_string(), "mjs".to_string()];
        config.script_timeout_ms = Some(1500);

        let options = config.render_options();
        assert_eq!(options.template_extension, "tera");
        assert_eq!(options.script_extensions, vec!["js", "mjs"]);
        assert_eq!(options.script_timeout, Some(Duration::from_millis(1500)));
    }
}
