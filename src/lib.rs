use std::fs;
use std::path::Path;

use log::trace;

pub mod builtin;
pub mod config;
pub mod environment;
pub mod interpreter;
pub mod parser;

pub use config::{ConditionMode, Config};
pub use interpreter::{render_output, Completion, Report, SoftError, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("lexical error: {0}")]
    Lex(#[from] parser::LexError),
    #[error("syntax error: {0}")]
    Parse(#[from] parser::ParseError),
    #[error("runtime error: {0}")]
    Runtime(#[from] interpreter::RuntimeError),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("cannot read source: {0}")]
    Io(#[from] std::io::Error),
}

/// Lexes, parses and runs `source` with the default configuration.
pub fn run(source: &str) -> Result<Report, Error> {
    run_with(source, &Config::default())
}

pub fn run_with(source: &str, config: &Config) -> Result<Report, Error> {
    let tokens = parser::lex(source)?;
    trace!("tokens {:?}", tokens);
    let program = parser::parse(&tokens)?;
    Ok(interpreter::interpret(&program, config)?)
}

pub fn run_file(path: impl AsRef<Path>, config: &Config) -> Result<Report, Error> {
    let source = fs::read_to_string(path)?;
    run_with(&source, config)
}
