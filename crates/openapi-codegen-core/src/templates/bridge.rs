//! Exposes script commands to Tera.
//!
//! Tera only passes named arguments to functions and filters, so positional
//! arguments travel in an `args` list:
//!
//! ```text
//! {{ joinPath(args=["src", "models", name]) }}   -> joinPath("src", "models", name)
//! {{ name | pascal }}                              -> pascal(name)
//! {{ schema | toStruct(args=[name]) }}             -> toStruct(schema, name)
//! ```
//!
//! Any other named arguments are gathered into one object passed last.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tera::{Tera, Value};

use crate::error::error_chain;
use crate::script::TemplateCommand;

use super::CommandTable;

/// Named argument carrying the positional argument list
pub const ARGS_KEY: &str = "args";

/// A script command callable as a Tera function or filter
#[derive(Debug, Clone)]
pub struct ScriptFunction {
    command: Arc<TemplateCommand>,
}

impl ScriptFunction {
    pub fn new(command: Arc<TemplateCommand>) -> Self {
        Self { command }
    }

    fn invoke(&self, args: Vec<Value>) -> tera::Result<Value> {
        self.command
            .call(&args)
            .map_err(|e| tera::Error::msg(error_chain(&e)))
    }
}

impl tera::Function for ScriptFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.invoke(positional_args(None, args))
    }
}

impl tera::Filter for ScriptFunction {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.invoke(positional_args(Some(value), args))
    }
}

/// Register every command as both a function and a filter.
///
/// Registration replaces any built-in or helper of the same name.
pub fn register_commands(tera: &mut Tera, commands: &CommandTable) {
    for (name, command) in commands {
        let function = ScriptFunction::new(Arc::clone(command));
        tera.register_function(name, function.clone());
        tera.register_filter(name, function);
    }
}

/// Flatten Tera's arguments into the positional list a script function receives
pub fn positional_args(piped: Option<&Value>, named: &HashMap<String, Value>) -> Vec<Value> {
    let mut args: Vec<Value> = piped.into_iter().cloned().collect();

    match named.get(ARGS_KEY) {
        Some(Value::Array(items)) => args.extend(items.iter().cloned()),
        Some(single) => args.push(single.clone()),
        None => {}
    }

    let options: BTreeMap<&String, &Value> = named
        .iter()
        .filter(|(key, _)| key.as_str() != ARGS_KEY)
        .collect();
    if !options.is_empty() {
        let object = options
            .into_iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        args.push(Value::Object(object));
    }

    args
}
