use std::io;

use flp_engine::EngineConfig;

use crate::cmd::{device_engine, DescribeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_command_table, OutputFormat};

pub fn run(_args: DescribeArgs, format: OutputFormat) -> CliResult<i32> {
    let (protocol, _device) = device_engine(EngineConfig::default(), io::sink())?;
    print_command_table(&protocol, format);
    Ok(SUCCESS)
}
