//! Code generation entry point

use std::io;

use tokio::task;

use crate::{
    config::Config,
    error::Result,
    openapi::{self, OpenApiContext},
    paths::normalize_to_absolute,
    templates::{RenderReport, TemplateManager},
};

/// Main entry point for code generation
pub async fn generate(config: &Config) -> Result<RenderReport> {
    // 1. Reject incomplete configuration before touching the filesystem
    config.validate()?;

    // 2. Resolve paths against the current directory
    let template_dir = normalize_to_absolute(&config.template_dir)?;
    let output_dir = normalize_to_absolute(&config.output_dir)?;
    let schema_location = if openapi::is_url(&config.openapi_schema_path) {
        config.openapi_schema_path.clone()
    } else {
        normalize_to_absolute(&config.openapi_schema_path)?
            .to_string_lossy()
            .into_owned()
    };

    // 3. Load the OpenAPI document
    let schema = OpenApiContext::from_file_or_url(&schema_location).await?;
    if config.verify {
        schema.verify()?;
    }
    log::info!(
        "Loaded OpenAPI document {} ({} {})",
        schema_location,
        schema.title().unwrap_or("untitled"),
        schema.version().unwrap_or("unversioned")
    );

    // 4. Scripts and templates run synchronously, off the async runtime
    let manager = TemplateManager::new(config.render_options());
    let data = schema.into_json();
    task::spawn_blocking(move || manager.render(&template_dir, &output_dir, &data))
        .await
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to join render task: {}", e),
            )
        })?
}
