//! Landru CLI

use std::path::Path;
use std::process::ExitCode;

use landruc::commands::{check_file, describe_faults, dump_file, parse_run_args, run_file};

fn main() -> ExitCode {
    landruc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let command = &args[1];

    match command.as_str() {
        "check" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: landru check <file.landru>");
                return ExitCode::FAILURE;
            };
            match check_file(Path::new(path)) {
                Ok(warnings) => {
                    for warning in &warnings {
                        eprintln!("warning: {warning}");
                    }
                    println!("{path}: ok ({} warning(s))", warnings.len());
                    ExitCode::SUCCESS
                }
                Err(err) => fail(&err),
            }
        }
        "dump" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: landru dump <file.landru>");
                return ExitCode::FAILURE;
            };
            match dump_file(Path::new(path)) {
                Ok(tree) => {
                    print!("{tree}");
                    ExitCode::SUCCESS
                }
                Err(err) => fail(&err),
            }
        }
        "run" => {
            let (path, options) = match parse_run_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(err) => {
                    eprintln!("error: {err}");
                    eprintln!("Usage: landru run <file.landru> [options]");
                    return ExitCode::FAILURE;
                }
            };
            match run_file(&path, &options) {
                Ok(summary) => {
                    for line in describe_faults(&summary.faults) {
                        eprintln!("{line}");
                    }
                    if !summary.halted {
                        eprintln!("stopped after {} tick(s) without halting", summary.ticks);
                    }
                    if summary.faults.is_empty() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(err) => fail(&err),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("Landru {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn fail(err: &landruc::commands::CliError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

fn print_usage() {
    println!("Landru actor language");
    println!();
    println!("Usage: landru <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>      Compile and run a program");
    println!("  check <file>    Compile only and report warnings");
    println!("  dump <file>     Print the compiled exemplar tree");
    println!("  help            Show this help message");
    println!("  version         Show version information");
    println!();
    println!("Run options:");
    println!("  --ticks <n>           Stop after n ticks (default 10000)");
    println!("  --tick-ms <ms>        Tick period in milliseconds (default 16)");
    println!("  --virtual             Advance a virtual clock instead of sleeping");
    println!("  --max-call-depth <n>  Limit nested function calls (default 256)");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=landru_eval=debug) to trace the scheduler.");
}
