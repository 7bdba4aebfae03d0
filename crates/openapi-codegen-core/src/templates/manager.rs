//! Template system for code generation

use std::{
    fmt, fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde_json::Value as JsonValue;
use tera::{Context, Tera};

use crate::{
    error::{error_chain, Error, Result},
    paths,
    script::{ConsoleSink, LogSink, Passthrough, ScriptHost, SourceTransform},
};

use super::{bridge, helpers, CommandTable, TemplateDir};

/// Knobs for one render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Marker extension of template files, without the dot
    pub template_extension: String,
    /// Extensions of script files, without the dot
    pub script_extensions: Vec<String>,
    /// Optional execution deadline for script code
    pub script_timeout: Option<Duration>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            template_extension: "tmpl".to_string(),
            script_extensions: vec!["js".to_string()],
            script_timeout: None,
        }
    }
}

/// What a successful render produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Registered command names, sorted
    pub commands: Vec<String>,
    /// Output files in the order they were written
    pub files: Vec<PathBuf>,
}

/// Dry-run view of a template root
#[derive(Debug, Clone, Default)]
pub struct Inspection {
    pub scripts: Vec<PathBuf>,
    /// Command name and the script it came from
    pub commands: Vec<(String, PathBuf)>,
    /// Template file and the output path it maps to
    pub templates: Vec<(PathBuf, PathBuf)>,
}

/// Renders a template root against a data value
#[derive(Clone)]
pub struct TemplateManager {
    options: RenderOptions,
    console: Arc<dyn ConsoleSink>,
    transform: Arc<dyn SourceTransform>,
}

impl fmt::Debug for TemplateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateManager")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl TemplateManager {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            console: Arc::new(LogSink),
            transform: Arc::new(Passthrough),
        }
    }

    /// Route script `console.*` output to `sink`
    pub fn with_console(mut self, sink: Arc<dyn ConsoleSink>) -> Self {
        self.console = sink;
        self
    }

    /// Preprocess script sources with `transform`
    pub fn with_transform(mut self, transform: Arc<dyn SourceTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// A fresh script host; nothing compiled survives between render calls
    fn script_host(&self) -> Result<ScriptHost> {
        Ok(ScriptHost::new(self.options.script_timeout)?
            .with_console(Arc::clone(&self.console))
            .with_transform(Arc::clone(&self.transform)))
    }

    fn template_dir(&self, template_root: &Path, output_root: &Path) -> Result<TemplateDir> {
        Ok(TemplateDir::open(template_root)?.excluding(output_root))
    }

    /// Render every template under `template_root` into `output_root`.
    ///
    /// Scripts are loaded first; any script failure aborts before a template
    /// is parsed. All templates are parsed before the first one is rendered.
    /// A template that fails while rendering leaves no file behind, but the
    /// outputs of templates rendered before it stay on disk.
    pub fn render(
        &self,
        template_root: &Path,
        output_root: &Path,
        data: &JsonValue,
    ) -> Result<RenderReport> {
        let dir = self.template_dir(template_root, output_root)?;
        log::info!("Rendering templates from {}", dir.display());

        let host = self.script_host()?;
        let commands = CommandTable::load(&host, &dir, &self.options.script_extensions)?;

        let mut tera = Tera::default();
        helpers::register(&mut tera);
        bridge::register_commands(&mut tera, &commands);

        let templates = self.parse_templates(&mut tera, &dir)?;
        let context = build_context(data)?;

        let mut report = RenderReport {
            commands: commands.names(),
            files: Vec::with_capacity(templates.len()),
        };

        for (template_file, name) in &templates {
            let output_path = paths::map_output_path(
                dir.root(),
                template_file,
                output_root,
                &self.options.template_extension,
            )?;
            render_file(&tera, name, template_file, &output_path, &context)?;
            report.files.push(output_path);
        }

        log::info!(
            "Rendered {} file(s) into {}",
            report.files.len(),
            output_root.display()
        );
        Ok(report)
    }

    /// Load scripts and map templates without rendering or writing anything
    pub fn inspect(&self, template_root: &Path, output_root: &Path) -> Result<Inspection> {
        let dir = self.template_dir(template_root, output_root)?;
        let host = self.script_host()?;
        let commands = CommandTable::load(&host, &dir, &self.options.script_extensions)?;

        let templates = dir
            .find_files(std::slice::from_ref(&self.options.template_extension))?
            .into_iter()
            .map(|file| {
                let output = paths::map_output_path(
                    dir.root(),
                    &file,
                    output_root,
                    &self.options.template_extension,
                )?;
                Ok((file, output))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Inspection {
            scripts: dir.find_files(&self.options.script_extensions)?,
            commands: commands
                .iter()
                .map(|(name, command)| (name.clone(), command.source_file().to_path_buf()))
                .collect(),
            templates,
        })
    }

    /// Parse every template file into `tera`, returning `(file, template name)` pairs
    fn parse_templates(&self, tera: &mut Tera, dir: &TemplateDir) -> Result<Vec<(PathBuf, String)>> {
        let files = dir.find_files(std::slice::from_ref(&self.options.template_extension))?;

        let mut sources = Vec::with_capacity(files.len());
        let mut templates = Vec::with_capacity(files.len());
        for file in files {
            let name = paths::template_name(dir.relative(&file)?);
            let source = fs::read_to_string(&file).map_err(|e| {
                log::error!("Failed to read template {}: {}", file.display(), e);
                Error::file(&file, e)
            })?;

            // Syntax is checked per file so the error names the right one
            tera::Template::new(&name, Some(file.display().to_string()), &source).map_err(|e| {
                let message = error_chain(&e);
                log::error!("Failed to parse template {}: {}", file.display(), message);
                Error::TemplateParse {
                    file: file.clone(),
                    message,
                }
            })?;
            log::info!("Parsed template {}", name);

            sources.push((name.clone(), source));
            templates.push((file, name));
        }

        // `extends`/`include` resolve across the whole set, so add them together
        tera.add_raw_templates(sources).map_err(|e| {
            let message = error_chain(&e);
            log::error!("Failed to load templates from {}: {}", dir.display(), message);
            Error::TemplateParse {
                file: dir.root().to_path_buf(),
                message,
            }
        })?;

        Ok(templates)
    }
}

/// Top-level keys of an object document, plus the whole document as `document`
fn build_context(data: &JsonValue) -> Result<Context> {
    let mut context = match data {
        JsonValue::Object(_) => Context::from_value(data.clone())?,
        _ => Context::new(),
    };
    context.insert("document", data);
    Ok(context)
}

fn render_file(
    tera: &Tera,
    name: &str,
    template_file: &Path,
    output_path: &Path,
    context: &Context,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            log::error!("Failed to create directory {}: {}", parent.display(), e);
            Error::file(parent, e)
        })?;
    }

    let file = fs::File::create(output_path).map_err(|e| {
        log::error!("Failed to create output file {}: {}", output_path.display(), e);
        Error::file(output_path, e)
    })?;
    let mut writer = BufWriter::new(file);
    let rendered = tera
        .render_to(name, context, &mut writer)
        .map_err(|e| {
            let message = error_chain(&e);
            log::error!("Failed to render template {}: {}", template_file.display(), message);
            Error::TemplateRender {
                file: template_file.to_path_buf(),
                message,
            }
        })
        .and_then(|()| writer.flush().map_err(|e| Error::file(output_path, e)));

    if let Err(e) = rendered {
        drop(writer);
        if let Err(remove_err) = fs::remove_file(output_path) {
            log::warn!(
                "Failed to remove partial output {}: {}",
                output_path.display(),
                remove_err
            );
        }
        return Err(e);
    }

    log::debug!("Wrote {}", output_path.display());
    Ok(())
}
