//! Collects the template commands registered by every script under a template root.

use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;
use std::sync::Arc;

use crate::{
    script::{ScriptHost, TemplateCommand},
    Error, Result,
};

use super::TemplateDir;

/// Every script command available to one render, keyed by name
#[derive(Debug, Default, Clone)]
pub struct CommandTable {
    commands: BTreeMap<String, Arc<TemplateCommand>>,
}

impl CommandTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every script file under `dir` and fold the commands into one table.
    ///
    /// Scripts run in discovery order; a name registered again later replaces
    /// the earlier command and is reported as a warning. The first script that
    /// cannot be read or run aborts the whole load.
    pub fn load(host: &ScriptHost, dir: &TemplateDir, script_extensions: &[String]) -> Result<Self> {
        let mut table = Self::new();

        for script_path in dir.find_files(script_extensions)? {
            let relative_path = dir.relative(&script_path)?.display().to_string();
            log::info!("load template script file: {}", relative_path);

            let script = std::fs::read_to_string(&script_path).map_err(|e| {
                log::error!("read template script file failed: {}: {}", relative_path, e);
                Error::file(&script_path, e)
            })?;

            for command in host.load_commands_from_script(&script_path, script)? {
                log::info!(
                    "register template command '{}' from {}",
                    command.name(),
                    relative_path
                );
                if let Some(previous) = table.insert(command) {
                    log::warn!(
                        "duplicate registered template command '{}' in {} replaces the one from {}",
                        previous.name(),
                        relative_path,
                        previous.source_file().display()
                    );
                }
            }
        }

        Ok(table)
    }

    /// Add a command, returning the one it replaced
    pub fn insert(&mut self, command: TemplateCommand) -> Option<Arc<TemplateCommand>> {
        self.commands
            .insert(command.name().to_string(), Arc::new(command))
    }

    /// Look up a command by name
    pub fn get(&self, name: &str) -> Option<&TemplateCommand> {
        self.commands.get(name).map(Arc::as_ref)
    }

    /// Number of distinct command names
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no script registered anything
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    /// Iterate over `(name, command)` pairs in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Arc<TemplateCommand>> {
        self.commands.iter()
    }

    /// Source file of the command currently bound to `name`
    pub fn source_of(&self, name: &str) -> Option<&Path> {
        self.get(name).map(TemplateCommand::source_file)
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = (&'a String, &'a Arc<TemplateCommand>);
    type IntoIter = btree_map::Iter<'a, String, Arc<TemplateCommand>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
