use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use log::debug;
use pseudocode::config::parse_max_steps;
use pseudocode::{parser, render_output, ConditionMode, Config, Error};

#[derive(Debug)]
enum Mode {
    Run,
    Tokens,
    Ast,
}

struct Options {
    mode: Mode,
    path: Option<String>,
    config: Config,
}

const USAGE: &str = "Usage: pseudo [--tokens | --ast] [--recheck] [--max-steps N] [FILE]";

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        mode: Mode::Run,
        path: None,
        config: Config::from_env().map_err(|e| e.to_string())?,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => options.mode = Mode::Tokens,
            "--ast" => options.mode = Mode::Ast,
            "--recheck" => {
                options.config = options.config.with_conditions(ConditionMode::EveryIteration)
            }
            "--max-steps" => {
                let n = args.next().ok_or("--max-steps needs a value")?;
                let n = parse_max_steps(&n).map_err(|e| e.to_string())?;
                options.config = options.config.with_max_steps(n);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            path if options.path.is_none() => options.path = Some(path.to_string()),
            extra => return Err(format!("unexpected argument {}", extra)),
        }
    }
    Ok(options)
}

fn read_source(path: Option<&str>) -> Result<String, Error> {
    Ok(match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        }
    })
}

fn execute(options: &Options) -> Result<(), Error> {
    let source = read_source(options.path.as_deref())?;
    debug!("read {} bytes", source.len());

    match options.mode {
        Mode::Tokens => {
            for lexeme in parser::lex(&source)? {
                println!("{:4}  {}", lexeme.line, lexeme.token);
            }
        }
        Mode::Ast => {
            let tokens = parser::lex(&source)?;
            println!("{:#?}", parser::parse(&tokens)?);
        }
        Mode::Run => {
            let report = pseudocode::run_with(&source, &options.config)?;
            println!("{}", render_output(&report.output));
            for soft in &report.diagnostics {
                eprintln!("warning: {} ({})", soft, soft.detail());
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            if message != USAGE {
                eprintln!("{}", message);
            }
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = execute(&options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
