//! K_Spk CLI library
//!
//! This module contains the core CLI logic: it reads one expression, runs it
//! through the K_Spk pipeline and prints the diagnostics and the resulting
//! message.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::{fs, io};

use log::{debug, info};

use kspk::{KspkError, MessageBuilder, MultiModalMessage, SymbolTable};
use kspk_parser::printer;

use error_adapter::{diagnostic_reportables, render};

/// Everything one invocation produces.
#[derive(Debug)]
pub struct Output {
    /// One rendered miette report per diagnostic, in message order.
    pub reports: Vec<String>,
    /// The message in the requested format.
    pub text: String,
}

/// Run the K_Spk CLI application
///
/// Prints every diagnostic report to stderr and the message to stdout.
///
/// # Errors
///
/// Returns `KspkError` for:
/// - File I/O errors
/// - Configuration or symbol table errors
/// - Strict-mode rejections
pub fn run(args: &Args) -> Result<(), KspkError> {
    let output = execute(args)?;

    for report in &output.reports {
        eprint!("{report}");
    }
    print!("{}", output.text);

    Ok(())
}

/// Process the expression selected by `args` without printing anything.
///
/// # Errors
///
/// Same as [`run`].
pub fn execute(args: &Args) -> Result<Output, KspkError> {
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(table) = &args.table {
        app_config = app_config.with_table(table);
    }
    if args.strict {
        app_config = app_config.with_strict(true);
    }
    debug!(config:? = app_config; "Configuration resolved");

    let source = read_expression(args)?;
    info!(bytes = source.len(), format:? = args.format; "Processing expression");

    let builder = MessageBuilder::from_config(app_config)?;
    let message = builder.process(&source)?;

    let reports = diagnostic_reportables(message.diagnostics(), &source)
        .iter()
        .map(render)
        .collect();
    let text = format_message(&message, builder.table(), args.format);

    Ok(Output { reports, text })
}

fn read_expression(args: &Args) -> Result<String, KspkError> {
    let mut source = match (&args.expression, &args.input) {
        (Some(expression), _) => expression.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => io::read_to_string(io::stdin())?,
    };

    if source.ends_with('\n') {
        source.pop();
        if source.ends_with('\r') {
            source.pop();
        }
    }
    Ok(source)
}

fn format_message(message: &MultiModalMessage, table: &SymbolTable, format: OutputFormat) -> String {
    match format {
        OutputFormat::Summary => message.summary(table),
        OutputFormat::Tree => printer::tree(message.ast(), table),
        OutputFormat::Source => {
            let mut source = printer::to_source(message.ast(), table);
            source.push('\n');
            source
        }
    }
}
