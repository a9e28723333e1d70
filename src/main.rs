//! phic CLI: run or check program trees.

use std::env;
use std::path::Path;
use std::process;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use phic::error::PhicError;
use phic::Config;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI command to execute.
enum Command {
    /// Dataize the root object of a program
    Run { file: String },
    /// Validate a program without running it
    Check { file: String },
    Help,
    Version,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    config: Config,
}

fn print_usage() {
    eprintln!("phic {} - object calculus runtime", VERSION);
    eprintln!();
    eprintln!("Usage: phic run <program.json> [--root NAME] [--trace]");
    eprintln!("       phic check <program.json>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file>       Dataize the root object and print the result");
    eprintln!("  check <file>     Validate the program tree");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --root NAME      Object to dataize (default: the program's name)");
    eprintln!("  --trace          Print every dataization step");
    eprintln!("  --help, -h       Show this help message");
    eprintln!("  --version, -V    Show the version");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PHIC_ROOT        Same as --root");
    eprintln!("  PHIC_TRACE       Same as --trace when set to 1, true, yes or on");
    eprintln!("  PHIC_LOG         Log filter, such as 'info' or 'phic=debug'");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(64);
}

fn parse_args(args: &[String], mut config: Config) -> Options {
    let mut command = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => command = Some(Command::Help),
            "--version" | "-V" => command = Some(Command::Version),
            "--trace" => config.trace = true,
            "--root" => {
                i += 1;
                match args.get(i) {
                    Some(root) => config.root = Some(root.clone()),
                    None => usage_error("--root requires an object name"),
                }
            }
            "run" | "check" => {
                i += 1;
                let file = match args.get(i) {
                    Some(file) => file.clone(),
                    None => usage_error(&format!("{} command requires a file", args[i - 1])),
                };
                if command.is_none() {
                    command = Some(if args[i - 1] == "run" {
                        Command::Run { file }
                    } else {
                        Command::Check { file }
                    });
                }
            }
            arg if arg.starts_with('-') => usage_error(&format!("Unknown option: {}", arg)),
            arg => usage_error(&format!("Unexpected argument: {}", arg)),
        }
        i += 1;
    }
    match command {
        Some(command) => Options { command, config },
        None => usage_error("No command given"),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(config.log_filter())
        .unwrap_or_else(|_| EnvFilter::new(phic::config::DEFAULT_LOG));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args, Config::from_env());

    match &options.command {
        Command::Help => print_usage(),
        Command::Version => println!("phic {}", VERSION),
        Command::Run { file } => {
            init_logging(&options.config);
            run_file(file, &options.config);
        }
        Command::Check { file } => {
            init_logging(&options.config);
            check_file(file);
        }
    }
}

fn run_file(path: &str, config: &Config) {
    match phic::run_file(Path::new(path), config.root.as_deref()) {
        Ok(value) => println!("{}", value.phi_term()),
        Err(e) => fail(&e),
    }
}

fn check_file(path: &str) {
    match phic::check_file(Path::new(path)) {
        Ok(program) => println!(
            "{} {} ({} objects)",
            "OK".green(),
            program.name,
            program.objects.len()
        ),
        Err(e) => fail(&e),
    }
}

fn fail(error: &PhicError) -> ! {
    let message = match error {
        PhicError::Runtime(err) => format!("{}: {}", err.kind(), err),
        PhicError::Tree(err) => format!("InvalidTree: {}", err),
        PhicError::Json(err) => format!("InvalidJson: {}", err),
        PhicError::Io(err) => format!("Io: {}", err),
    };
    eprintln!("{} {}", "Error:".red().bold(), message);
    let code = match error {
        PhicError::Runtime(_) | PhicError::Io(_) => 70,
        PhicError::Tree(_) | PhicError::Json(_) => 65,
    };
    process::exit(code);
}
