// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Reconstruction of messages from exported QQ chat transcripts.
//!
//! The transcript is line oriented. Each message starts with a header line
//! holding the sender followed by a `:`, then labelled field lines:
//!
//! ```text
//! heavy🐜:
//! 时间: 2024/1/1 20:15:03
//! 内容: first line of the message
//! more lines, possibly with single blank lines in between
//! 提及: @someone
//! ```
//!
//! The `时间:` (time) and `提及:` (mention) fields are optional. A header
//! without a `内容:` (content) field is dropped without complaint, so the
//! parser never fails; it only ever skips what it cannot read.
//!
//! # Example
//!
//! ```
//! use rpg2docx::parser::parse_messages;
//!
//! let log = "Alice:\n时间: 2024/1/1\n内容: hello\nthere\n";
//! let messages = parse_messages(log);
//!
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].author, "Alice");
//! assert_eq!(messages[0].timestamp.as_deref(), Some("2024/1/1"));
//! assert_eq!(messages[0].body, "hello\nthere");
//! ```

/// Character terminating a header line.
pub const HEADER_SEPARATOR: char = ':';

/// Label of the timestamp field.
pub const TIME_LABEL: &str = "时间:";

/// Label of the content field.
pub const CONTENT_LABEL: &str = "内容:";

/// Label of the mention field. Mentions are skipped.
pub const MENTION_LABEL: &str = "提及:";

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender as written in the transcript (nickname or account id).
    pub author: String,

    /// Text after the `时间:` label, if the field was present.
    pub timestamp: Option<String>,

    /// Message text. Never empty; may span several lines and contain
    /// single blank lines, but never starts or ends with one.
    pub body: String,
}

/// Forward-only cursor over transcript lines with bounded lookahead.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// Returns the line `n` positions ahead without consuming anything.
    fn peek(&self, n: usize) -> Option<&'a str> {
        self.lines.get(self.pos + n).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consumes and returns the next line.
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.peek(0)?;
        self.advance();
        Some(line)
    }

    /// Consumes the next line if it is the `label` field and returns its value.
    fn next_field(&mut self, label: &str) -> Option<&'a str> {
        let value = self.peek(0)?.trim().strip_prefix(label)?.trim();
        self.advance();
        Some(value)
    }

    /// Returns `true` if the next two lines form a new message header.
    fn at_header(&self) -> bool {
        self.peek(0)
            .is_some_and(|line| header_author(line.trim()).is_some())
            && self
                .peek(1)
                .is_some_and(|line| line.trim().starts_with(TIME_LABEL))
    }
}

/// Returns the sender named by a trimmed header candidate line.
fn header_author(trimmed: &str) -> Option<&str> {
    if trimmed.is_empty() {
        return None;
    }
    trimmed.strip_suffix(HEADER_SEPARATOR)
}

/// Reads the remaining lines of a content field.
///
/// Stops before a mention field, before the next message header, or at the
/// second of two consecutive blank lines. The lookahead lines that end the
/// body are left unconsumed.
fn read_body(cursor: &mut Cursor<'_>, first: &str) -> String {
    let mut lines = vec![first];
    let mut blank_run = 0;

    while let Some(line) = cursor.peek(0) {
        let trimmed = line.trim();
        if trimmed.starts_with(MENTION_LABEL) || cursor.at_header() {
            break;
        }

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run >= 2 {
                break;
            }
            lines.push("");
        } else {
            blank_run = 0;
            lines.push(line);
        }
        cursor.advance();
    }

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());

    lines[start..].join("\n")
}

/// Parses a transcript into messages in source order.
///
/// Candidate headers that never reach a non-empty content field are
/// skipped, and parsing resumes with the following line.
#[must_use]
pub fn parse_messages(text: &str) -> Vec<Message> {
    let mut cursor = Cursor::new(text);
    let mut messages = Vec::new();

    while let Some(line) = cursor.next_line() {
        let Some(author) = header_author(line.trim()) else {
            continue;
        };

        let timestamp = cursor.next_field(TIME_LABEL).map(str::to_owned);
        let body = cursor
            .next_field(CONTENT_LABEL)
            .map(|first| read_body(&mut cursor, first));

        while cursor.next_field(MENTION_LABEL).is_some() {}

        if let Some(body) = body.filter(|body| !body.is_empty()) {
            messages.push(Message {
                author: author.to_owned(),
                timestamp,
                body,
            });
        }
    }

    messages
}
