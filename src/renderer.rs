// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Rendering sessions as styled text.
//!
//! This module turns extracted [`Session`]s into a [`Document`]: a title
//! followed by numbered sessions, where every message becomes one
//! paragraph of styled [`Run`]s. The document is independent of any file
//! format; [`render_markdown`] and [`crate::docx`] turn it into output.
//!
//! # Output Format
//!
//! Each message paragraph is made of four runs, all in the speaker's color:
//! - the character name, in bold
//! - ` [timestamp]`, only on session start and end markers
//! - the `: ` separator
//! - the message body
//!
//! Mid-session chatter never shows a timestamp, even when the transcript
//! recorded one; only the messages bracketing a session are dated.
//!
//! # Example
//!
//! ```
//! use rpg2docx::identity::{IdentityTable, Rgb};
//! use rpg2docx::parser::parse_messages;
//! use rpg2docx::renderer::{render_markdown, RenderOptions, Renderer};
//! use rpg2docx::session::{segment, Markers};
//!
//! let log = "Alice:\n时间: 2024/1/1\n内容: ——CST5016/08/14——\n";
//! let markers = Markers::default();
//! let sessions = segment(parse_messages(log), &markers);
//!
//! let identities = IdentityTable::new([("Alice", "Lady Alice")], [("Lady Alice", Rgb(255, 0, 0))]);
//! let renderer = Renderer::new(&identities, &markers, RenderOptions::default());
//! let document = renderer.render_document(&sessions);
//!
//! let markdown = render_markdown(&document);
//! assert!(markdown.contains("## 会话 1"));
//! assert!(markdown.contains("**Lady Alice**"));
//! assert!(markdown.contains(r" \[2024/1/1\]"));
//! ```

use crate::identity::{IdentityTable, Rgb};
use crate::parser::Message;
use crate::session::{Markers, Session};
use quick_xml::escape::escape;
use std::fmt::Write;

/// Configuration options for document rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Document title.
    pub title: String,

    /// Prefix of each session heading; the session number is appended.
    pub session_heading: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "RPG会话记录".into(),
            session_heading: "会话".into(),
        }
    }
}

/// A span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The text, possibly containing newlines.
    pub text: String,

    /// Whether the run is bold.
    pub bold: bool,

    /// Text color, or the default color when `None`.
    pub color: Option<Rgb>,
}

/// The runs making up one rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRuns {
    /// Character name, bold.
    pub identity: Run,

    /// Bracketed timestamp, present only on session markers.
    pub timestamp: Option<Run>,

    /// The `: ` between speaker and body.
    pub separator: Run,

    /// Message body.
    pub body: Run,
}

impl MessageRuns {
    /// Iterates over the runs in paragraph order.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        std::iter::once(&self.identity)
            .chain(self.timestamp.as_ref())
            .chain([&self.separator, &self.body])
    }
}

/// One numbered session ready for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSession {
    /// Session heading, e.g. `会话 1`.
    pub heading: String,

    /// One entry per message, in chat order.
    pub messages: Vec<MessageRuns>,
}

/// A complete rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document title.
    pub title: String,

    /// Sessions in extraction order.
    pub sessions: Vec<RenderedSession>,
}

/// Renders sessions using an identity table and session markers.
#[derive(Debug)]
pub struct Renderer<'a> {
    identities: &'a IdentityTable,
    markers: &'a Markers,
    opts: RenderOptions,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(
        identities: &'a IdentityTable,
        markers: &'a Markers,
        opts: RenderOptions,
    ) -> Self {
        Self {
            identities,
            markers,
            opts,
        }
    }

    /// Renders all sessions, numbering them from 1.
    #[must_use]
    pub fn render_document(&self, sessions: &[Session]) -> Document {
        Document {
            title: self.opts.title.clone(),
            sessions: sessions
                .iter()
                .enumerate()
                .map(|(i, session)| self.render_session(i + 1, session))
                .collect(),
        }
    }

    /// Renders a single session under the given number.
    #[must_use]
    pub fn render_session(&self, number: usize, session: &Session) -> RenderedSession {
        RenderedSession {
            heading: format!("{} {number}", self.opts.session_heading),
            messages: session
                .messages()
                .iter()
                .map(|message| self.render_message(message))
                .collect(),
        }
    }

    /// Renders a single message.
    #[must_use]
    pub fn render_message(&self, message: &Message) -> MessageRuns {
        let identity = self.identities.resolve(&message.author);
        let color = identity.color;
        let run = |text: String, bold: bool| Run { text, bold, color };

        let timestamp = message
            .timestamp
            .as_ref()
            .filter(|ts| !ts.is_empty())
            .filter(|_| self.markers.classify(&message.body).is_some())
            .map(|ts| run(format!(" [{ts}]"), false));

        MessageRuns {
            identity: run(identity.name, true),
            timestamp,
            separator: run(": ".into(), false),
            body: run(message.body.clone(), false),
        }
    }
}

/// Renders a document as Markdown.
///
/// Colors are emitted as inline `<span>` elements and body line breaks as
/// `<br>`, so each message stays a single paragraph.
#[must_use]
pub fn render_markdown(doc: &Document) -> String {
    let mut out = String::new();
    writeln!(out, "# {}\n", escape(doc.title.as_str())).unwrap();

    for session in &doc.sessions {
        writeln!(out, "## {}\n", escape(session.heading.as_str())).unwrap();
        for message in &session.messages {
            for run in message.runs() {
                render_run(&mut out, run);
            }
            out.push_str("\n\n");
        }
    }

    out
}

fn render_run(out: &mut String, run: &Run) {
    let text = escape(escape_markdown(&run.text).as_str()).replace('\n', "<br>\n");
    let text = if run.bold {
        format!("**{text}**")
    } else {
        text
    };

    match run.color {
        Some(color) => write!(out, "<span style=\"color:#{color}\">{text}</span>").unwrap(),
        None => out.push_str(&text),
    }
}

/// Backslash-escapes Markdown syntax so run text stays literal.
///
/// `<`, `>` and `&` are left alone; they become entities when the text is
/// XML escaped. A `.` is escaped only after a line's leading digits, where
/// it would start an ordered list.
fn escape_markdown(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);

    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
        }
        let mut leading_digits = true;
        for c in line.chars() {
            match c {
                '\\' | '`' | '*' | '_' | '#' | '-' | '+' | '[' | ']' | '|' => {
                    result.push('\\');
                }
                '.' if leading_digits => result.push('\\'),
                _ => {}
            }
            leading_digits = leading_digits && c.is_ascii_digit();
            result.push(c);
        }
    }

    result
}
