//! Embedded JavaScript host for template commands.
//!
//! Every script file runs once, top to bottom, in its own QuickJS context.
//! While it runs, a global `registerTemplateCommand(name, fn)` collects the
//! functions it wants to expose to templates:
//!
//! ```js
//! registerTemplateCommand('joinPath', function (...parts) {
//!   return parts.join('/')
//! })
//! ```
//!
//! The collected functions stay callable for as long as the returned
//! [`TemplateCommand`]s live. One [`ScriptHost`] (and so one QuickJS runtime)
//! serves a single render call; nothing is shared between calls.

pub mod console;
pub mod transform;
pub mod value;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rquickjs::{
    convert::Coerced, function::Rest, Array, CatchResultExt, CaughtError, Context, Ctx, Function,
    Runtime, Value,
};
use serde_json::Value as JsonValue;

pub use console::{ConsoleLevel, ConsoleSink, LogSink};
pub use transform::{Passthrough, SourceTransform};

use crate::{Error, Result};

/// Global function scripts call to expose a command
pub const REGISTER_FUNCTION: &str = "registerTemplateCommand";

/// Global array holding the registered callables of one context, indexed by slot
const COMMAND_SLOTS: &str = "__templateCommands";

/// Owns the QuickJS runtime used to load script files
pub struct ScriptHost {
    runtime: Runtime,
    console: Arc<dyn ConsoleSink>,
    transform: Arc<dyn SourceTransform>,
    watchdog: Arc<Watchdog>,
}

impl ScriptHost {
    /// Create a host with a fresh runtime.
    ///
    /// With a `timeout`, each top-level script run and each command call is
    /// interrupted once it runs longer than that.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let runtime = Runtime::new()?;
        let watchdog = Arc::new(Watchdog::new(timeout));
        if timeout.is_some() {
            let watchdog = Arc::clone(&watchdog);
            runtime.set_interrupt_handler(Some(Box::new(move || watchdog.expired())));
        }

        Ok(Self {
            runtime,
            console: Arc::new(LogSink),
            transform: Arc::new(Passthrough),
            watchdog,
        })
    }

    /// Send `console.*` output from scripts to `sink` instead of the log
    pub fn with_console(mut self, sink: Arc<dyn ConsoleSink>) -> Self {
        self.console = sink;
        self
    }

    /// Preprocess every script source with `transform` before running it
    pub fn with_transform(mut self, transform: Arc<dyn SourceTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Run one script and return the commands it registered, in call order.
    ///
    /// A syntax error or an uncaught top-level throw fails the whole script;
    /// none of its registrations are returned in that case.
    pub fn load_commands_from_script(
        &self,
        source_path: &Path,
        source_text: String,
    ) -> Result<Vec<TemplateCommand>> {
        let source = self.transform.transform(source_path, source_text)?;
        // One context per script, shared by all of its handlers. Handing out
        // `Context::clone`s instead corrupts QuickJS refcounts on drop.
        let context = Arc::new(Context::full(&self.runtime)?);
        let names: Arc<Mutex<Vec<String>>> = Arc::default();

        context
            .with(|ctx| {
                let _armed = self.watchdog.arm();
                install(&ctx, &names, &self.console)
                    .and_then(|()| ctx.eval::<Value, _>(source).map(drop))
                    .catch(&ctx)
                    .map_err(describe)
            })
            .map_err(|message| {
                log::error!(
                    "load template script failed: {}: {}",
                    source_path.display(),
                    message
                );
                Error::ScriptLoad {
                    file: source_path.to_path_buf(),
                    message,
                }
            })?;

        let names = std::mem::take(&mut *names.lock().unwrap_or_else(PoisonError::into_inner));
        let commands = names
            .into_iter()
            .enumerate()
            .map(|(slot, name)| TemplateCommand {
                name,
                source_file: source_path.to_path_buf(),
                handler: ScriptHandler {
                    context: Arc::clone(&context),
                    slot,
                    watchdog: Arc::clone(&self.watchdog),
                },
            })
            .collect();
        Ok(commands)
    }
}

impl fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptHost")
            .field("timeout", &self.watchdog.timeout)
            .finish_non_exhaustive()
    }
}

/// One named function contributed by a script file
#[derive(Clone)]
pub struct TemplateCommand {
    name: String,
    source_file: PathBuf,
    handler: ScriptHandler,
}

impl TemplateCommand {
    /// Name templates call the command by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script file that registered the command
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// Invoke the script function with `args` as its positional parameters.
    ///
    /// Each call stands alone: a throw fails only this call, with the thrown
    /// value's `String()` form as the message.
    pub fn call(&self, args: &[JsonValue]) -> Result<JsonValue> {
        self.handler.call(args).map_err(|message| Error::ScriptCall {
            command: self.name.clone(),
            file: self.source_file.clone(),
            message,
        })
    }
}

impl fmt::Debug for TemplateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCommand")
            .field("name", &self.name)
            .field("source_file", &self.source_file)
            .finish_non_exhaustive()
    }
}

/// Reference to a registered callable inside the context that created it
#[derive(Clone)]
struct ScriptHandler {
    context: Arc<Context>,
    slot: usize,
    watchdog: Arc<Watchdog>,
}

impl ScriptHandler {
    fn call(&self, args: &[JsonValue]) -> std::result::Result<JsonValue, String> {
        self.context.with(|ctx| {
            let _armed = self.watchdog.arm();
            invoke(&ctx, self.slot, args).catch(&ctx).map_err(describe)
        })
    }
}

fn install(
    ctx: &Ctx<'_>,
    names: &Arc<Mutex<Vec<String>>>,
    sink: &Arc<dyn ConsoleSink>,
) -> rquickjs::Result<()> {
    console::enable(ctx, Arc::clone(sink))?;
    let globals = ctx.globals();
    globals.set(COMMAND_SLOTS, Array::new(ctx.clone())?)?;
    globals.set(
        REGISTER_FUNCTION,
        Function::new(ctx.clone(), register(Arc::clone(names)))?,
    )?;
    Ok(())
}

fn register<'js>(
    names: Arc<Mutex<Vec<String>>>,
) -> impl Fn(Ctx<'js>, Coerced<String>, Function<'js>) -> rquickjs::Result<()> + Send {
    move |ctx, name, handler| {
        let slots: Array = ctx.globals().get(COMMAND_SLOTS)?;
        let mut names = names.lock().unwrap_or_else(PoisonError::into_inner);
        slots.set(names.len(), handler)?;
        names.push(name.0);
        Ok(())
    }
}

fn invoke<'js>(ctx: &Ctx<'js>, slot: usize, args: &[JsonValue]) -> rquickjs::Result<JsonValue> {
    let slots: Array = ctx.globals().get(COMMAND_SLOTS)?;
    let handler: Function = slots.get(slot)?;
    let args = args
        .iter()
        .map(|arg| value::to_js(ctx, arg))
        .collect::<rquickjs::Result<Vec<_>>>()?;
    let result: Value = handler.call((Rest(args),))?;
    value::from_js(&result)
}

/// Textual form of whatever was thrown, as JavaScript's `String(value)` gives it
fn describe(caught: CaughtError<'_>) -> String {
    let thrown = match caught {
        CaughtError::Error(err) => return err.to_string(),
        CaughtError::Exception(exception) => exception.into_object().into_value(),
        CaughtError::Value(value) => value,
    };
    thrown
        .get::<Coerced<String>>()
        .map(|text| text.0)
        .unwrap_or_else(|err| err.to_string())
}

/// Execution deadline shared with the runtime's interrupt handler
#[derive(Debug)]
struct Watchdog {
    timeout: Option<Duration>,
    deadline: Mutex<Option<Instant>>,
}

impl Watchdog {
    fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            deadline: Mutex::new(None),
        }
    }

    fn arm(&self) -> Armed<'_> {
        if let Some(timeout) = self.timeout {
            *self.deadline.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(Instant::now() + timeout);
        }
        Armed(self)
    }

    fn expired(&self) -> bool {
        self.deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Clears the deadline when the guarded execution ends
struct Armed<'a>(&'a Watchdog);

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        *self.0.deadline.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
