//! OpenAPI document loading.
//!
//! The document is kept as a raw JSON value; templates and script commands
//! see it exactly as written, `$ref`s and vendor extensions included.
//!
//! # Examples
//!
//! ```no_run
//! use openapi_codegen_core::openapi::OpenApiContext;
//! use openapi_codegen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file_or_url("openapi.yaml").await?;
//! spec.verify()?;
//!
//! if let Some(title) = spec.title() {
//!     println!("API Title: {}", title);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::{Error, Result};

/// A loaded OpenAPI document
#[derive(Debug, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl OpenApiContext {
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Load from a file path or an `http(s)://` URL
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> Result<Self> {
        let location = location.as_ref();

        if is_url(location) {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load from a file.
    ///
    /// `.json` files are parsed as JSON and `.yaml`/`.yml` files as YAML;
    /// anything else is tried as JSON first, then YAML.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading OpenAPI document from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            log::error!("Failed to read OpenAPI document {}: {}", path.display(), e);
            e
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parsed = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            _ => parse_content(&content),
        };

        parsed.map(Self::new).map_err(|e| {
            Error::openapi(format!(
                "Failed to parse OpenAPI document at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Fetch from a URL (JSON or YAML body)
    pub async fn from_url(url: &str) -> Result<Self> {
        log::debug!("Fetching OpenAPI document from {}", url);
        let response = reqwest::get(url).await.map_err(|e| {
            Error::openapi(format!("Failed to fetch OpenAPI document from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::openapi(format!(
                "Failed to fetch OpenAPI document from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::openapi(format!("Failed to read response from {}: {}", url, e))
        })?;

        parse_content(&content).map(Self::new).map_err(|e| {
            Error::openapi(format!("Failed to parse OpenAPI document from {}: {}", url, e))
        })
    }

    /// Check that the document is a structurally valid OpenAPI 3 document
    pub fn verify(&self) -> Result<()> {
        serde_json::from_value::<openapiv3::OpenAPI>(self.json.clone())
            .map(drop)
            .map_err(|e| Error::openapi(format!("Invalid OpenAPI document: {}", e)))
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    pub fn into_json(self) -> JsonValue {
        self.json
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }
}

/// Whether `location` names a remote document rather than a file
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Parse content as either JSON or YAML
fn parse_content(content: &str) -> std::result::Result<JsonValue, String> {
    if let Ok(json) = serde_json::from_str(content) {
        return Ok(json);
    }

    serde_yaml::from_str(content)
        .map_err(|e| format!("content is neither valid JSON nor YAML: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    const PETSTORE_YAML: &str = r#"
openapi: 3.0.0
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: A list of pets
"#;

    #[tokio::test]
    async fn test_from_file_json() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("openapi.json");
        let json_content = r#"
        {
            "openapi": "3.0.0",
            "info": {
                "title": "Test API Async",
                "version": "2.0.0"
            },
            "paths": {}
        }
        "#;
        tokio::fs::write(&file_path, json_content).await?;

        let spec = OpenApiContext::from_file(&file_path).await?;
        assert_eq!(spec.title(), Some("Test API Async"));
        assert_eq!(spec.version(), Some("2.0.0"));
        spec.verify()?;

        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_yaml() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("petstore.yml");
        tokio::fs::write(&file_path, PETSTORE_YAML).await?;

        let spec = OpenApiContext::from_file_or_url(file_path.to_string_lossy()).await?;
        assert_eq!(spec.title(), Some("Petstore"));
        assert_eq!(
            spec.as_json()["paths"]["/pets"]["get"]["operationId"],
            json!("listPets")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back_to_yaml() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("spec.txt");
        tokio::fs::write(&file_path, PETSTORE_YAML).await?;

        let spec = OpenApiContext::from_file(&file_path).await?;
        assert_eq!(spec.version(), Some("1.0.0"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_content_is_an_openapi_error() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("broken.json");
        tokio::fs::write(&file_path, "{ not json").await?;

        let result = OpenApiContext::from_file(&file_path).await;
        assert!(matches!(result, Err(Error::OpenApi(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = OpenApiContext::from_file("/definitely/not/here.json").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_verify_rejects_non_openapi() {
        let spec = OpenApiContext::new(json!({"hello": "world"}));
        let err = spec.verify().unwrap_err();
        assert!(err.to_string().contains("Invalid OpenAPI document"));
        assert_eq!(spec.title(), None);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/openapi.json"));
        assert!(is_url("http://localhost:8080/spec"));
        assert!(!is_url("./openapi.json"));
        assert!(!is_url("/abs/https/openapi.json"));
    }
}
