//! STOMP frame encoding and decoding.

use std::fmt::Write;

/// Byte that terminates every frame.
const NUL: char = '\0';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame has no command line")]
    MissingCommand,

    #[error("frame is not NUL-terminated")]
    MissingTerminator,

    #[error("malformed header line: {0}")]
    InvalidHeader(String),

    #[error("invalid escape sequence in header: {0}")]
    BadEscape(String),

    #[error("invalid content-length: {0}")]
    BadContentLength(String),
}

/// A single STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value for `name`. Repeated headers keep their first occurrence.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// CONNECT and CONNECTED frames carry headers verbatim.
    fn escapes_headers(command: &str) -> bool {
        !matches!(command, "CONNECT" | "CONNECTED")
    }

    /// Serialize to wire text, including the trailing NUL.
    pub fn encode(&self) -> String {
        let escape = Self::escapes_headers(&self.command);
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                let _ = writeln!(out, "{}:{}", escape_header(name), escape_header(value));
            } else {
                let _ = writeln!(out, "{name}:{value}");
            }
        }
        if !self.body.is_empty() && self.get("content-length").is_none() {
            let _ = writeln!(out, "content-length:{}", self.body.len());
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push(NUL);
        out
    }
}

/// Decode every frame in one WebSocket text message.
///
/// Bare end-of-line characters between frames are heart-beats and yield
/// nothing, so a message that is only `"\n"` decodes to an empty list.
pub fn decode_all(text: &str) -> Result<Vec<Frame>, FrameError> {
    let mut frames = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(|c: char| c == '\r' || c == '\n');
        if rest.is_empty() {
            return Ok(frames);
        }
        let (frame, remaining) = decode_one(rest)?;
        frames.push(frame);
        rest = remaining;
    }
}

fn decode_one(text: &str) -> Result<(Frame, &str), FrameError> {
    let (command, mut rest) = split_line(text).ok_or(FrameError::MissingTerminator)?;
    if command.is_empty() {
        return Err(FrameError::MissingCommand);
    }
    let escape = Frame::escapes_headers(command);

    let mut headers = Vec::new();
    loop {
        let (line, remaining) = split_line(rest).ok_or(FrameError::MissingTerminator)?;
        rest = remaining;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FrameError::InvalidHeader(line.to_string()))?;
        if escape {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map(|(_, v)| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| FrameError::BadContentLength(v.clone()))
        })
        .transpose()?;

    let (body, after) = match content_length {
        Some(len) => {
            let body = rest
                .get(..len)
                .ok_or_else(|| FrameError::BadContentLength(len.to_string()))?;
            let after = rest[len..]
                .strip_prefix(NUL)
                .ok_or(FrameError::MissingTerminator)?;
            (body, after)
        }
        None => {
            let end = rest.find(NUL).ok_or(FrameError::MissingTerminator)?;
            (&rest[..end], &rest[end + 1..])
        }
    };

    Ok((
        Frame {
            command: command.to_string(),
            headers,
            body: body.to_string(),
        },
        after,
    ))
}

/// Split off one line, accepting both LF and CRLF endings.
fn split_line(text: &str) -> Option<(&str, &str)> {
    let idx = text.find('\n')?;
    let line = &text[..idx];
    Some((line.strip_suffix('\r').unwrap_or(line), &text[idx + 1..]))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::BadEscape(raw.to_string())),
        }
    }
    Ok(out)
}
