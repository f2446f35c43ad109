mod cmd;
mod exit;
mod logging;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "memlink",
    version,
    about = "FIFO link between a CPU timing model and a memory timing simulator"
)]
struct Cli {
    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match cmd::run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_subcommand() {
        let cli = Cli::try_parse_from([
            "memlink",
            "replay",
            "trace.txt",
            "--request-path",
            "/tmp/rqst_to_memory",
            "--response-path",
            "/tmp/resp_to_cpu",
        ])
        .expect("replay args should parse");

        assert!(matches!(cli.command, Command::Replay(_)));
    }

    #[test]
    fn parses_respond_subcommand() {
        let cli = Cli::try_parse_from(["memlink", "respond", "--latency", "40"])
            .expect("respond args should parse");

        assert!(matches!(cli.command, Command::Respond(_)));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        let err = Cli::try_parse_from(["memlink", "transmit"])
            .expect_err("unknown subcommand should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }
}
