use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use flp_engine::LineProtocol;
use flp_line::Response;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    label: char,
    kind: &'static str,
    timestamp: u64,
    tag: &'a str,
    payload: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a Response> for ResponseOutput<'a> {
    fn from(response: &'a Response) -> Self {
        Self {
            label: response.label.as_char(),
            kind: response.label.name(),
            timestamp: response.timestamp,
            tag: &response.tag,
            payload: &response.payload,
            error: response.error(),
        }
    }
}

pub fn print_responses(responses: &[Response], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for response in responses {
                println!(
                    "{}",
                    serde_json::to_string(&ResponseOutput::from(response))
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LABEL", "TIMESTAMP", "TAG", "PAYLOAD"]);
            for response in responses {
                table.add_row(vec![
                    response.label.name().to_string(),
                    response.timestamp.to_string(),
                    response.tag.clone(),
                    response.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for response in responses {
                print!("{}", String::from_utf8_lossy(&response.encode()));
            }
        }
    }
}

#[derive(Serialize)]
struct ArgumentRow {
    command: String,
    argument: String,
    required: bool,
    kind: &'static str,
    value_kind: &'static str,
}

fn argument_rows(protocol: &LineProtocol) -> Vec<ArgumentRow> {
    let mut rows = Vec::new();
    for (command, spec) in protocol.registry().iter() {
        for (argument, argument_spec) in spec.arguments() {
            rows.push(ArgumentRow {
                command: command.to_string(),
                argument: argument.to_string(),
                required: argument_spec.is_required(),
                kind: argument_spec.kind().as_str(),
                value_kind: argument_spec.value_kind().name(),
            });
        }
    }
    rows
}

pub fn print_command_table(protocol: &LineProtocol, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "commands": protocol.registration(),
                "arguments": argument_rows(protocol),
                "states": protocol.state_snapshot(),
            });
            println!("{out}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "ARGUMENT", "REQUIRED", "KIND", "VALUE"]);
            for (command, spec) in protocol.registry().iter() {
                if spec.arguments().next().is_none() {
                    table.add_row(vec![command, "-", "-", "-", "-"]);
                }
            }
            for row in argument_rows(protocol) {
                table.add_row(vec![
                    row.command,
                    row.argument,
                    row.required.to_string(),
                    row.kind.to_string(),
                    row.value_kind.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (command, spec) in protocol.registry().iter() {
                let arguments = spec
                    .arguments()
                    .map(|(name, argument)| format!("{name}=<{}>", argument.describe()))
                    .collect::<Vec<_>>();
                if arguments.is_empty() {
                    println!("{command}");
                } else {
                    println!("{command} {}", arguments.join(" "));
                }
            }
        }
    }
}
