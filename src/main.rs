use std::process::ExitCode;

use clap::Parser;
use recount::runtime::{self, Commands, Config, LogLevel};
use recount::tag::TagAlphabet;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[arg(long = "log-level", global = true, value_parser = clap::value_parser!(LogLevel))]
    /// trace, debug, info, warn or error; RUST_LOG is used if not given
    log_level: Option<LogLevel>,

    #[arg(long = "alphabet", global = true, value_enum, default_value_t = TagAlphabet::Numeric)]
    /// How tags are written in text files
    alphabet: TagAlphabet,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    let config = Config::init(Config {
        log_level: cli.log_level,
        alphabet: cli.alphabet,
    });
    runtime::setup_global_logger(config.log_level);
    log::debug!("Running {:?} with {:?}", cli.command, config);

    if let Err(e) = cli.command.try_execute() {
        log::error!("{:?} failed", cli.command);
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
