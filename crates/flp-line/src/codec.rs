use std::fmt::Write as _;

use bytes::{BufMut, BytesMut};

use crate::error::{LineError, Result};
use crate::label::Label;

/// Payload of a successful acknowledgement.
pub const OK_PAYLOAD: &str = "OK";

/// Prefix of an acknowledgement payload describing a failure.
pub const ERROR_PREFIX: &str = "ERR ";

/// Encode one response line into `dst`.
///
/// Wire format:
/// ```text
/// <label>(<timestamp>) <tag>: <payload>\n
/// ```
///
/// Line breaks inside `tag` and `payload` are replaced by spaces so one
/// event always occupies exactly one line.
pub fn encode_response(label: Label, timestamp: u64, tag: &str, payload: &str, dst: &mut BytesMut) {
    let mut line = String::with_capacity(tag.len() + payload.len() + 24);
    let _ = write!(line, "{}({}) ", label.as_char(), timestamp);
    line.extend(flatten(tag));
    line.push_str(": ");
    line.extend(flatten(payload));
    line.push('\n');

    dst.reserve(line.len());
    dst.put_slice(line.as_bytes());
}

fn flatten(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
}

/// One decoded response line, as seen by a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub label: Label,
    pub timestamp: u64,
    pub tag: String,
    pub payload: String,
}

impl Response {
    /// Parse a response line, with or without its trailing newline.
    pub fn parse(line: &str) -> Result<Response> {
        let line = line.trim_end_matches(['\n', '\r']);
        let malformed = || LineError::Malformed(line.to_string());

        let mut chars = line.chars();
        let label = chars.next().and_then(Label::from_char).ok_or_else(malformed)?;
        let rest = chars.as_str().strip_prefix('(').ok_or_else(malformed)?;

        let (timestamp, rest) = rest.split_once(") ").ok_or_else(malformed)?;
        let timestamp: u64 = timestamp.parse().map_err(|_| malformed())?;

        let (tag, payload) = rest
            .split_once(": ")
            .or_else(|| rest.strip_suffix(':').map(|tag| (tag, "")))
            .ok_or_else(malformed)?;
        if tag.is_empty() || tag.contains(' ') {
            return Err(malformed());
        }

        Ok(Response {
            label,
            timestamp,
            tag: tag.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Whether this is an acknowledgement line.
    pub fn is_ack(&self) -> bool {
        self.label == Label::Ack
    }

    /// Whether this is a state report line.
    pub fn is_report(&self) -> bool {
        self.label == Label::Report
    }

    /// Whether this is a plain `OK` acknowledgement.
    pub fn is_ok(&self) -> bool {
        self.is_ack() && self.payload == OK_PAYLOAD
    }

    /// The failure description, if this line reports a failure.
    pub fn error(&self) -> Option<&str> {
        match self.label {
            Label::Ack => self.payload.strip_prefix(ERROR_PREFIX),
            Label::Error => Some(&self.payload),
            Label::Report => None,
        }
    }

    /// Re-encode this response as a wire line.
    pub fn encode(&self) -> BytesMut {
        let mut dst = BytesMut::new();
        encode_response(self.label, self.timestamp, &self.tag, &self.payload, &mut dst);
        dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(label: Label, ts: u64, tag: &str, payload: &str) -> String {
        let mut dst = BytesMut::new();
        encode_response(label, ts, tag, payload, &mut dst);
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn encodes_ack_and_report() {
        assert_eq!(encoded(Label::Ack, 12, "test", "OK"), "_(12) test: OK\n");
        assert_eq!(
            encoded(Label::Report, 1700000000000, "bool_state", "1"),
            "R(1700000000000) bool_state: 1\n"
        );
    }

    #[test]
    fn payload_line_breaks_are_flattened() {
        assert_eq!(
            encoded(Label::Ack, 0, "x", "a\nb\r\nc"),
            "_(0) x: a b  c\n"
        );
    }

    #[test]
    fn tag_line_breaks_are_flattened() {
        assert_eq!(
            encoded(Label::Ack, 0, "test\r", "ERR unknown qualifier: test\r"),
            "_(0) test : ERR unknown qualifier: test \n"
        );
        assert_eq!(encoded(Label::Report, 0, "a\nb", "1"), "R(0) a b: 1\n");
    }

    #[test]
    fn parses_ack() {
        let response = Response::parse("_(42) @flp.version: 1.0.0\n").unwrap();
        assert_eq!(response.label, Label::Ack);
        assert_eq!(response.timestamp, 42);
        assert_eq!(response.tag, "@flp.version");
        assert_eq!(response.payload, "1.0.0");
        assert!(response.is_ack());
        assert!(!response.is_ok());
    }

    #[test]
    fn parses_json_payload_with_separators() {
        let response = Response::parse(r#"_(1) @flp.state: {"a": 1, "b": 2}"#).unwrap();
        assert_eq!(response.tag, "@flp.state");
        assert_eq!(response.payload, r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    fn parses_empty_payload() {
        let response = Response::parse("R(5) name:").unwrap();
        assert_eq!(response.payload, "");
        let response = Response::parse("R(5) name: ").unwrap();
        assert_eq!(response.payload, "");
    }

    #[test]
    fn error_accessor() {
        let ack = Response::parse("_(1) test: ERR unknown qualifier: test").unwrap();
        assert_eq!(ack.error(), Some("unknown qualifier: test"));

        let ok = Response::parse("_(1) test: OK").unwrap();
        assert!(ok.is_ok());
        assert_eq!(ok.error(), None);

        let channel = Response::parse("E(1) test: bad").unwrap();
        assert_eq!(channel.error(), Some("bad"));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "X(1) tag: ok",
            "_1) tag: ok",
            "_(abc) tag: ok",
            "_(1)tag: ok",
            "_(1) tag ok",
            "_(1) : ok",
        ] {
            assert!(
                matches!(Response::parse(line), Err(LineError::Malformed(_))),
                "{line:?} should be rejected"
            );
        }
    }

    #[test]
    fn encode_matches_parse() {
        let line = "R(99) motor.rpm: 12.5\n";
        let response = Response::parse(line).unwrap();
        assert_eq!(response.encode().as_ref(), line.as_bytes());
    }
}
