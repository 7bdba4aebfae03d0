//! Path normalization and the template-to-output path mapping.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Resolve `path` against the current working directory unless it is already absolute
pub fn normalize_to_absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::config("path must not be empty"));
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Path of `path` relative to `root`, failing when it lies outside of it.
///
/// The check is lexical, so a `..` anywhere below `root` counts as outside.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> Result<&'a Path> {
    let outside = || Error::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };
    let relative = path.strip_prefix(root).map_err(|_| outside())?;
    if relative
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(outside());
    }
    Ok(relative)
}

/// Template-relative path rendered with `/` separators, used as the Tera template name
pub fn template_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute where a template file's output goes.
///
/// The template's directory structure below `template_root` is mirrored below
/// `output_root` and the `.{template_extension}` suffix is dropped from the file
/// name, so `/a` + `/a/test/test.js.tmpl` + `/c` gives `/c/test/test.js`.
pub fn map_output_path(
    template_root: &Path,
    template_file: &Path,
    output_root: &Path,
    template_extension: &str,
) -> Result<PathBuf> {
    let relative = relative_to(template_root, template_file)?;
    let file_name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::template(format!("Invalid template file name: {}", relative.display())))?;

    let suffix = format!(".{template_extension}");
    let stripped = file_name.strip_suffix(&suffix).unwrap_or(file_name);
    if stripped.is_empty() {
        return Err(Error::template(format!(
            "Template {} has no output file name",
            template_file.display()
        )));
    }

    Ok(output_root.join(relative.with_file_name(stripped)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_output_path_mirrors_structure() {
        let out = map_output_path(
            Path::new("/a"),
            Path::new("/a/test/test.js.tmpl"),
            Path::new("/c"),
            "tmpl",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/c/test/test.js"));
    }

    #[test]
    fn test_map_output_path_top_level_file() {
        let out = map_output_path(
            Path::new("/tpl"),
            Path::new("/tpl/hello.txt.tmpl"),
            Path::new("/out/gen"),
            "tmpl",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/gen/hello.txt"));
    }

    #[test]
    fn test_map_output_path_only_strips_trailing_suffix() {
        let out = map_output_path(
            Path::new("/a"),
            Path::new("/a/x.tmpl.d/readme.tmpl.md"),
            Path::new("/c"),
            "tmpl",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/c/x.tmpl.d/readme.tmpl.md"));
    }

    #[test]
    fn test_map_output_path_rejects_outside_root() {
        let err = map_output_path(
            Path::new("/a"),
            Path::new("/b/test.js.tmpl"),
            Path::new("/c"),
            "tmpl",
        )
        .unwrap_err();
        assert!(matches!(err, Error::OutsideRoot { .. }));
    }

    #[test]
    fn test_map_output_path_rejects_parent_components() {
        let err = map_output_path(
            Path::new("/a"),
            Path::new("/a/../b/x.js.tmpl"),
            Path::new("/c"),
            "tmpl",
        )
        .unwrap_err();
        assert!(matches!(err, Error::OutsideRoot { .. }));

        assert!(relative_to(Path::new("/a"), Path::new("/a/sub/../../etc/passwd")).is_err());
        assert_eq!(
            relative_to(Path::new("/a"), Path::new("/a/sub/x..y.tmpl")).unwrap(),
            Path::new("sub/x..y.tmpl")
        );
    }

    #[test]
    fn test_distinct_templates_map_to_distinct_outputs() {
        let templates = ["x.tmpl", "x.tmpl.tmpl", "x.txt.tmpl", "x/y.tmpl", "x.d/y.tmpl"];
        let outputs: std::collections::BTreeSet<_> = templates
            .iter()
            .map(|t| {
                map_output_path(Path::new("/a"), &Path::new("/a").join(t), Path::new("/c"), "tmpl")
                    .unwrap()
            })
            .collect();
        assert_eq!(outputs.len(), templates.len());
    }

    #[test]
    fn test_map_output_path_rejects_bare_suffix() {
        let result = map_output_path(
            Path::new("/a"),
            Path::new("/a/.tmpl"),
            Path::new("/c"),
            "tmpl",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_to_absolute() {
        assert_eq!(
            normalize_to_absolute("/already/absolute").unwrap(),
            PathBuf::from("/already/absolute")
        );

        let resolved = normalize_to_absolute("relative/dir").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));

        assert!(normalize_to_absolute("").is_err());
    }

    #[test]
    fn test_template_name_uses_forward_slashes() {
        assert_eq!(
            template_name(Path::new("models").join("pet.go.tmpl").as_path()),
            "models/pet.go.tmpl"
        );
    }
}
