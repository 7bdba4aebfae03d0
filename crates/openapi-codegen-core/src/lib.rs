//! OpenAPI Codegen Core Library
//!
//! Renders a directory of Tera templates against an OpenAPI document. Any
//! JavaScript file in the template directory may register extra template
//! functions with `registerTemplateCommand(name, fn)`; templates call them
//! like built-ins.

pub mod config;
pub mod error;
pub mod generate;
pub mod openapi;
pub mod paths;
pub mod script;
pub mod templates;

#[cfg(test)]
mod testing;

pub use crate::{
    config::Config,
    error::{Error, Result},
    generate::generate,
    openapi::OpenApiContext,
    script::{ScriptHost, TemplateCommand},
    templates::{
        CommandTable, Inspection, RenderOptions, RenderReport, TemplateDir, TemplateManager,
    },
};
