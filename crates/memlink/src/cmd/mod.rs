use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;

pub mod replay;
pub mod respond;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a request trace against a responder and print its responses.
    Replay(ReplayArgs),
    /// Run a test responder that echoes requests with a fixed latency.
    Respond(RespondArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Replay(args) => replay::run(args),
        Command::Respond(args) => respond::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Trace file: one `<16-hex-digit addr> <READ|WRITE> <cycle>` per line.
    pub trace: PathBuf,
    /// Request FIFO path (initiator to responder).
    #[arg(long, default_value = "rqst_to_memory")]
    pub request_path: PathBuf,
    /// Response FIFO path (responder to initiator).
    #[arg(long, default_value = "resp_to_cpu")]
    pub response_path: PathBuf,
    /// Maximum time to wait for the responder to attach (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub rendezvous_timeout: String,
    /// Maximum time to wait for each response (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub response_timeout: String,
}

#[derive(Args, Debug)]
pub struct RespondArgs {
    /// Request FIFO path (initiator to responder).
    #[arg(long, default_value = "rqst_to_memory")]
    pub request_path: PathBuf,
    /// Response FIFO path (responder to initiator).
    #[arg(long, default_value = "resp_to_cpu")]
    pub response_path: PathBuf,
    /// Cycles added to each issued cycle in the echoed response.
    #[arg(long, default_value = "100")]
    pub latency: u64,
    /// Exit after answering N requests even without an END record.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
