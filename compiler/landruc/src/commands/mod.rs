//! `landru check`, `landru dump` and `landru run`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use landru_compile::{compile_program_with, dump_program, Compilation, CompileError, CompileOptions};
use landru_eval::{
    Clock, Engine, EngineConfig, InstanceFault, ManualClock, RunSummary, SharedPrintHandler,
};
use landru_ir::Program;
use landru_lexer::ReadError;
use thiserror::Error;

/// Default tick budget for `landru run`.
pub const DEFAULT_MAX_TICKS: u64 = 10_000;

/// Default tick period for `landru run` (about 60 ticks a second).
pub const DEFAULT_TICK_MS: u64 = 16;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Usage(String),
}

/// Options for `landru run`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub max_ticks: u64,
    pub tick: Duration,
    /// Advance a virtual clock by `tick` per tick instead of sleeping.
    pub virtual_time: bool,
    pub max_call_depth: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            max_ticks: DEFAULT_MAX_TICKS,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            virtual_time: false,
            max_call_depth: None,
        }
    }
}

/// Parse `landru run` arguments (everything after `run`).
pub fn parse_run_args(args: &[String]) -> Result<(PathBuf, RunOptions), CliError> {
    let mut options = RunOptions::default();
    let mut path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => options.max_ticks = number(arg, iter.next())?,
            "--tick-ms" => options.tick = Duration::from_millis(number(arg, iter.next())?),
            "--max-call-depth" => options.max_call_depth = Some(number(arg, iter.next())?),
            "--virtual" => options.virtual_time = true,
            flag if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown option `{flag}`")));
            }
            file if path.is_none() => path = Some(PathBuf::from(file)),
            extra => return Err(CliError::Usage(format!("unexpected argument `{extra}`"))),
        }
    }
    let path = path.ok_or_else(|| CliError::Usage("missing file path".to_string()))?;
    Ok((path, options))
}

fn number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, CliError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CliError::Usage(format!("`{flag}` expects a non-negative number")))
}

/// Read and compile source text.
pub fn compile_source(source: &str) -> Result<Compilation, CliError> {
    let tape = landru_lexer::read(source)?;
    Ok(compile_program_with(tape, &CompileOptions::default())?)
}

pub fn compile_file(path: &Path) -> Result<Compilation, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile_source(&source)
}

/// `landru check`: compile and list warnings.
pub fn check_file(path: &Path) -> Result<Vec<String>, CliError> {
    let compilation = compile_file(path)?;
    Ok(compilation.warnings.iter().map(ToString::to_string).collect())
}

/// `landru dump`: the compiled exemplar tree.
pub fn dump_file(path: &Path) -> Result<String, CliError> {
    Ok(dump_program(&compile_file(path)?.program))
}

/// Drive a program until it halts or the tick budget runs out.
pub fn run_program(program: Program, options: &RunOptions, print: SharedPrintHandler) -> RunSummary {
    let manual = ManualClock::new();
    let clock = if options.virtual_time {
        Clock::manual(&manual)
    } else {
        Clock::system()
    };
    let mut config = EngineConfig::new();
    if let Some(depth) = options.max_call_depth {
        config = config.max_call_depth(depth);
    }
    let mut engine = Engine::builder(program)
        .clock(clock)
        .print_handler(print)
        .config(config)
        .build();

    let mut summary = RunSummary::default();
    while summary.ticks < options.max_ticks && !engine.is_halted() {
        let report = engine.run_tick();
        summary.ticks += 1;
        summary.faults.extend(report.faults);
        if options.virtual_time {
            manual.advance(options.tick);
        } else if !options.tick.is_zero() {
            std::thread::sleep(options.tick);
        }
    }
    summary.halted = engine.is_halted();
    tracing::debug!(
        ticks = summary.ticks,
        halted = summary.halted,
        created = engine.total_instances_created(),
        "run finished"
    );
    summary
}

/// `landru run`.
pub fn run_file(path: &Path, options: &RunOptions) -> Result<RunSummary, CliError> {
    let compilation = compile_file(path)?;
    for warning in &compilation.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(run_program(
        compilation.program,
        options,
        landru_eval::stdout_handler(),
    ))
}

/// One line per fault, for stderr.
pub fn describe_faults(faults: &[InstanceFault]) -> Vec<String> {
    faults.iter().map(|fault| format!("error: {fault}")).collect()
}
