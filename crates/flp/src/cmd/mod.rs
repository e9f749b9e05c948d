use clap::{Args, Subcommand, ValueEnum};
use std::io::Write;
#[cfg(unix)]
use std::path::PathBuf;

use flp::device::DemoDevice;
use flp_engine::{ClockKind, EngineConfig, LineConfig, LineProtocol, RegistryConfig};

use crate::exit::{protocol_error, CliResult};
use crate::output::OutputFormat;

pub mod describe;
pub mod run;
#[cfg(unix)]
pub mod send;
#[cfg(unix)]
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulated device on stdin and stdout.
    Run(EngineArgs),
    /// Serve the simulated device on a Unix socket, one client at a time.
    #[cfg(unix)]
    Serve(ServeArgs),
    /// Send one command line to a served device and print the responses.
    #[cfg(unix)]
    Send(SendArgs),
    /// List the simulated device's commands and states.
    Describe(DescribeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        #[cfg(unix)]
        Command::Serve(args) => serve::run(args),
        #[cfg(unix)]
        Command::Send(args) => send::run(args, format),
        Command::Describe(args) => describe::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Build an engine with the built-in commands and the simulated device.
pub fn device_engine(
    config: EngineConfig,
    output: impl Write + 'static,
) -> CliResult<(LineProtocol, DemoDevice)> {
    let mut protocol = LineProtocol::with_config(output, config);
    protocol
        .register_internal_commands()
        .map_err(|err| protocol_error("built-in registration failed", err))?;
    let device = DemoDevice::attach(&mut protocol)
        .map_err(|err| protocol_error("device registration failed", err))?;
    Ok((protocol, device))
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum ClockArg {
    /// Milliseconds since the UNIX epoch.
    #[default]
    System,
    /// Milliseconds since startup.
    Monotonic,
}

impl From<ClockArg> for ClockKind {
    fn from(clock: ClockArg) -> Self {
        match clock {
            ClockArg::System => ClockKind::System,
            ClockArg::Monotonic => ClockKind::Monotonic,
        }
    }
}

#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Line delimiter: one ASCII character, or \n, \r, \0.
    #[arg(long, value_name = "CHAR", default_value = "\\n", value_parser = parse_delimiter)]
    pub delimiter: u8,
    /// Drop a trailing carriage return from each line.
    #[arg(long)]
    pub strip_cr: bool,
    /// Do not acknowledge processed lines.
    #[arg(long)]
    pub no_ack: bool,
    /// Repeat failures on the E label.
    #[arg(long)]
    pub error_channel: bool,
    /// Timestamp source for response lines.
    #[arg(long, value_enum, default_value_t = ClockArg::System)]
    pub clock: ClockArg,
    /// Reject arguments a command does not declare.
    #[arg(long)]
    pub strict: bool,
    /// Maximum number of arguments on one line. Unlimited if omitted.
    #[arg(long, value_name = "N")]
    pub max_arguments: Option<usize>,
}

impl EngineArgs {
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            line: LineConfig {
                delimiter: self.delimiter,
                strip_carriage_return: self.strip_cr,
                ..LineConfig::default()
            },
            registry: RegistryConfig {
                reject_unknown_arguments: self.strict,
                max_arguments_per_line: self
                    .max_arguments
                    .unwrap_or(RegistryConfig::default().max_arguments_per_line),
            },
            acknowledge: !self.no_ack,
            error_channel: self.error_channel,
            clock: self.clock.into(),
        }
    }
}

fn parse_delimiter(input: &str) -> Result<u8, String> {
    match input {
        "\\n" => Ok(b'\n'),
        "\\r" => Ok(b'\r'),
        "\\0" => Ok(0),
        _ => match input.as_bytes() {
            [byte] if byte.is_ascii() && *byte != b' ' => Ok(*byte),
            _ => Err(format!(
                "expected one ASCII character other than space, got {input:?}"
            )),
        },
    }
}

#[cfg(unix)]
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[cfg(unix)]
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Command line to send, e.g. "led.set on=1".
    pub line: String,
    /// Maximum time to wait for the acknowledgement (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct DescribeArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
