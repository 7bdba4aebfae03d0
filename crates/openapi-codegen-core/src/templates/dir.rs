//! Template root resolution and file discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{paths, Error, Result};

/// A validated template root directory
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Root directory containing template and script files
    root: PathBuf,
    /// Subtree skipped during discovery (the output root, when nested)
    excluded: Option<PathBuf>,
}

impl TemplateDir {
    /// Open a template root, checking that it exists and is a directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::config(format!(
                "Template directory not found: {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            excluded: None,
        })
    }

    /// Skip `path` during discovery when it lies inside the template root.
    ///
    /// Generating into a folder below the templates would otherwise feed the
    /// previous run's output back in as scripts and templates.
    pub fn excluding(mut self, path: &Path) -> Self {
        if path.starts_with(&self.root) && path != self.root {
            self.excluded = Some(path.to_path_buf());
        }
        self
    }

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns a displayable version of the root path
    pub fn display(&self) -> std::path::Display<'_> {
        self.root.display()
    }

    /// Path of `path` relative to the root
    pub fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        paths::relative_to(&self.root, path)
    }

    /// Find every file whose extension is one of `extensions`.
    ///
    /// Entries are visited depth-first with siblings sorted by file name, so the
    /// order is stable from run to run.
    pub fn find_files(&self, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let excluded = self.excluded.as_deref();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| excluded.map_or(true, |skip| entry.path() != skip));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| Error::Discovery {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
            if matches {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}
