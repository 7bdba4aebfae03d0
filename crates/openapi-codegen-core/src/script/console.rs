//! The `console` object exposed to scripts.

use std::fmt;
use std::sync::Arc;

use rquickjs::{convert::Coerced, function::Rest, Ctx, Function, Object, Value};

/// Global name the console object is installed under
pub const MODULE_NAME: &str = "console";

/// Severity of one console call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Debug,
    Warn,
    Error,
}

impl ConsoleLevel {
    const ALL: [ConsoleLevel; 5] = [
        ConsoleLevel::Log,
        ConsoleLevel::Info,
        ConsoleLevel::Debug,
        ConsoleLevel::Warn,
        ConsoleLevel::Error,
    ];

    /// Name of the console method for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line-oriented destination for console output
pub trait ConsoleSink: Send + Sync {
    fn line(&self, level: ConsoleLevel, message: &str);
}

/// Forwards console lines to the `log` facade under the `script` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ConsoleSink for LogSink {
    fn line(&self, level: ConsoleLevel, message: &str) {
        match level {
            ConsoleLevel::Log | ConsoleLevel::Info => log::info!(target: "script", "{message}"),
            ConsoleLevel::Debug => log::debug!(target: "script", "{message}"),
            ConsoleLevel::Warn => log::warn!(target: "script", "{message}"),
            ConsoleLevel::Error => log::error!(target: "script", "{message}"),
        }
    }
}

/// Install a `console` object whose methods write to `sink`
pub fn enable(ctx: &Ctx<'_>, sink: Arc<dyn ConsoleSink>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;
    for level in ConsoleLevel::ALL {
        let method = Function::new(ctx.clone(), console_method(level, Arc::clone(&sink)))?;
        console.set(level.as_str(), method)?;
    }
    ctx.globals().set(MODULE_NAME, console)
}

fn console_method<'js>(
    level: ConsoleLevel,
    sink: Arc<dyn ConsoleSink>,
) -> impl Fn(Ctx<'js>, Rest<Value<'js>>) + Send {
    move |ctx, args| {
        let message = args
            .0
            .iter()
            .map(|arg| stringify(&ctx, arg))
            .collect::<String>();
        sink.line(level, &message);
    }
}

/// JSON text of one argument; `undefined`, functions and cyclic values fall back to `String()`
fn stringify<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> String {
    match ctx.json_stringify(value.clone()) {
        Ok(Some(json)) => {
            if let Ok(text) = json.to_string() {
                return text;
            }
        }
        Ok(None) => {}
        Err(_) => {
            // JSON.stringify threw; drop the pending exception
            let _ = ctx.catch();
        }
    }
    value
        .get::<Coerced<String>>()
        .map(|text| text.0)
        .unwrap_or_else(|_| "undefined".to_string())
}
