use std::io::{Read, Write};
use std::time::Duration;

use flp_line::{LineReader, Response};
use flp_registry::tokenize;
use flp_transport::UnixDomainSocket;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{
    io_error, line_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE,
};
use crate::output::{print_responses, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let qualifier = command_qualifier(&args.line)?;

    let mut stream = UnixDomainSocket::connect(&args.path)
        .map_err(|err| transport_error("connect failed", err))?;
    stream
        .set_read_timeout(Some(wait_timeout))
        .map_err(|err| transport_error("setting read timeout failed", err))?;

    let mut line = args.line.into_bytes();
    line.push(b'\n');
    stream
        .write_all(&line)
        .map_err(|err| io_error("send failed", err))?;
    debug!(qualifier = %qualifier, "command sent");

    let mut reader = LineReader::new(stream);
    let responses = collect_until_ack(&mut reader, &qualifier)
        .map_err(|err| line_error("receive failed", err))?;
    print_responses(&responses, format);

    let failed = responses.last().and_then(Response::error).is_some();
    Ok(if failed { DATA_INVALID } else { SUCCESS })
}

fn command_qualifier(line: &str) -> CliResult<String> {
    if line.contains(['\n', '\r']) {
        return Err(CliError::new(USAGE, "command must be a single line"));
    }
    tokenize(line)
        .map(|parsed| parsed.qualifier.to_string())
        .ok_or_else(|| CliError::new(USAGE, "command must not be blank"))
}

/// Read responses until the acknowledgement for `qualifier`. Reports that
/// arrive first are returned ahead of it.
fn collect_until_ack<R: Read>(
    reader: &mut LineReader<R>,
    qualifier: &str,
) -> flp_line::Result<Vec<Response>> {
    let mut responses = Vec::new();
    loop {
        let response = reader.read_response()?;
        let done = response.is_ack() && response.tag == qualifier;
        responses.push(response);
        if done {
            return Ok(responses);
        }
    }
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use flp_line::{Label, LineError};

    use super::*;

    #[test]
    fn collects_reports_up_to_matching_ack() {
        let wire = "R(1) led.on: 1\n_(1) other: OK\n_(2) led.set: OK\nR(3) late: 0\n";
        let mut reader = LineReader::new(Cursor::new(wire.as_bytes().to_vec()));

        let responses = collect_until_ack(&mut reader, "led.set").expect("ack should arrive");
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].label, Label::Report);
        assert!(responses[2].is_ok());
    }

    #[test]
    fn missing_ack_is_an_error() {
        let mut reader = LineReader::new(Cursor::new(b"R(1) led.on: 1\n".to_vec()));
        assert!(matches!(
            collect_until_ack(&mut reader, "led.set"),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn qualifier_is_first_token() {
        assert_eq!(command_qualifier("  motor.set rpm=10").unwrap(), "motor.set");
        assert_eq!(command_qualifier("   ").unwrap_err().code, USAGE);
        assert_eq!(command_qualifier("a\nb").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }
}
