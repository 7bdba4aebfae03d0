//! openapi-codegen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use openapi_codegen_core::{config::normalize_extension, Config, RenderOptions, TemplateManager};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_DIR: &str = "./generate";

#[derive(Parser)]
#[command(name = "openapi-codegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render a template directory against an OpenAPI document
    Generate(GenerateArgs),
    /// Show the scripts, commands and templates of a template directory
    Inspect {
        /// Template directory
        #[arg(short = 't', long = "template")]
        template: PathBuf,
        /// Output directory the templates would map into
        #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
        /// Marker extension of template files
        #[arg(long)]
        template_extension: Option<String>,
        /// Extension of script files (repeatable)
        #[arg(long = "script-extension")]
        script_extensions: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct GenerateArgs {
    /// Template directory
    #[arg(short = 't', long = "template")]
    template: Option<PathBuf>,
    /// Path or URL to the OpenAPI document (YAML or JSON)
    ///
    /// Example: -f path/to/openapi.yaml
    /// Example: -f https://example.com/openapi.json
    #[arg(short = 'f', long = "file")]
    file: Option<String>,
    /// Output directory for generated code [default: ./generate]
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
    /// Validate the document as OpenAPI 3 before rendering
    #[arg(long)]
    verify: bool,
    /// Config file (YAML, JSON or TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Marker extension of template files [default: tmpl]
    #[arg(long)]
    template_extension: Option<String>,
    /// Extension of script files (repeatable) [default: js]
    #[arg(long = "script-extension")]
    script_extensions: Vec<String>,
    /// Abort any script run or command call after this many milliseconds
    #[arg(long)]
    script_timeout_ms: Option<u64>,
}

impl GenerateArgs {
    /// Merge flags over the optional config file
    async fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => Config::new("", "", DEFAULT_OUTPUT_DIR),
        };

        if let Some(template) = self.template {
            config.template_dir = template.to_string_lossy().into_owned();
        }
        if let Some(file) = self.file {
            config.openapi_schema_path = file;
        }
        if let Some(output) = self.output {
            config.output_dir = output.to_string_lossy().into_owned();
        }
        if self.verify {
            config.verify = true;
        }
        if let Some(extension) = self.template_extension {
            config.template_extension = extension;
        }
        if !self.script_extensions.is_empty() {
            config.script_extensions = self.script_extensions;
        }
        if self.script_timeout_ms.is_some() {
            config.script_timeout_ms = self.script_timeout_ms;
        }

        if config.template_dir.is_empty() {
            anyhow::bail!("A template directory is required (-t/--template)");
        }
        if config.openapi_schema_path.is_empty() {
            anyhow::bail!("An OpenAPI document is required (-f/--file)");
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => {
            let config = args.into_config().await?;
            tracing::debug!(?config, "resolved configuration");

            let report = openapi_codegen_core::generate(&config)
                .await
                .with_context(|| {
                    format!(
                        "Failed to generate from templates in {}",
                        config.template_dir
                    )
                })?;

            println!(
                "✅ Generated {} file(s) with {} template command(s) in: {}",
                report.files.len(),
                report.commands.len(),
                config.output_dir
            );
        }
        Commands::Inspect {
            template,
            output,
            template_extension,
            script_extensions,
        } => {
            let mut options = RenderOptions::default();
            if let Some(extension) = template_extension {
                options.template_extension = normalize_extension(&extension);
            }
            if !script_extensions.is_empty() {
                options.script_extensions = script_extensions
                    .iter()
                    .map(|e| normalize_extension(e))
                    .collect();
            }

            let template = absolute(&template)?;
            let output = absolute(&output)?;
            let inspection = TemplateManager::new(options)
                .inspect(&template, &output)
                .with_context(|| format!("Failed to inspect {}", template.display()))?;

            println!("Scripts:");
            for script in &inspection.scripts {
                println!("  {}", relative_display(&template, script));
            }
            println!("Commands:");
            for (name, source) in &inspection.commands {
                println!("  {} ({})", name, relative_display(&template, source));
            }
            println!("Templates:");
            for (file, target) in &inspection.templates {
                println!(
                    "  {} -> {}",
                    relative_display(&template, file),
                    relative_display(&output, target)
                );
            }
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    openapi_codegen_core::paths::normalize_to_absolute(path)
        .with_context(|| format!("Invalid path {}", path.display()))
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
