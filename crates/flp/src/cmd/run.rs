use std::io;

use tracing::info;

use crate::cmd::{device_engine, EngineArgs};
use crate::exit::{engine_error, CliResult, SUCCESS};

/// Drive the simulated device from stdin until end of input.
pub fn run(args: EngineArgs) -> CliResult<i32> {
    let (mut protocol, device) = device_engine(args.config(), io::stdout())?;
    info!(states = protocol.state_count(), "device ready on stdio");

    let lines = protocol
        .pump(io::stdin().lock())
        .map_err(|err| engine_error("reading stdin failed", err))?;

    info!(lines, ticks = device.ticks(), "input closed");
    Ok(SUCCESS)
}
