// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Grouping messages into role-play sessions.
//!
//! A session opens with a message containing an in-world date tag such as
//! `——CST5016/08/14——` and closes with a message that is exactly
//! `——save——`. Everything between the two belongs to the session, and
//! chatter outside any session is dropped.
//!
//! Players do not always remember to save. A new date tag inside an open
//! session closes it where it stands, and a session still open at the end
//! of the transcript is kept.
//!
//! # Example
//!
//! ```
//! use rpg2docx::parser::parse_messages;
//! use rpg2docx::session::{segment, Markers};
//!
//! let log = "\
//! Alice:
//! 时间: 2024/1/1
//! 内容: ——CST5016/08/14——
//! Alice:
//! 时间: 2024/1/1
//! 内容: ——save——
//! ";
//! let sessions = segment(parse_messages(log), &Markers::default());
//!
//! assert_eq!(sessions.len(), 1);
//! assert_eq!(sessions[0].messages().len(), 2);
//! ```

use crate::parser::Message;
use regex::Regex;

/// Pattern of the in-world date tag that opens a session.
///
/// Matches forms like `——CST5016/08/14——`, `——CST5016/08/14/1900时——`
/// and `——CST5017/01/11，AST0500——`.
pub const DEFAULT_START_PATTERN: &str = r"——CST501[67]/\d+/\d+(/\d+时?)?(，[^—]+)?——";

/// Message body that closes a session.
pub const DEFAULT_END_MARKER: &str = "——save——";

/// Which session boundary a message body denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// The body contains a start tag.
    Start,
    /// The body is exactly the end marker.
    End,
}

/// Session boundary matchers.
#[derive(Debug, Clone)]
pub struct Markers {
    start: Regex,
    end: String,
}

impl Markers {
    /// Builds matchers from a start pattern and an end literal.
    ///
    /// # Errors
    ///
    /// Returns an error if `start_pattern` is not a valid regular expression.
    pub fn new(start_pattern: &str, end_marker: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            start: Regex::new(start_pattern)?,
            end: end_marker.into(),
        })
    }

    /// Classifies a message body.
    ///
    /// The start tag may appear anywhere in the body, while the end marker
    /// must be the whole body. A body satisfying both counts as a start.
    #[must_use]
    pub fn classify(&self, body: &str) -> Option<Marker> {
        if self.start.is_match(body) {
            Some(Marker::Start)
        } else if body == self.end {
            Some(Marker::End)
        } else {
            None
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(DEFAULT_START_PATTERN, DEFAULT_END_MARKER)
            .expect("built-in start pattern is a valid regex")
    }
}

/// A run of messages opened by a start tag.
///
/// Always holds at least one message, and the first one always carries a
/// start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    /// Messages in chat order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consumes the session, returning its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Splits a message stream into sessions.
#[must_use]
pub fn segment<I>(messages: I, markers: &Markers) -> Vec<Session>
where
    I: IntoIterator<Item = Message>,
{
    let mut sessions = Vec::new();
    // `None` while outside a session.
    let mut current: Option<Vec<Message>> = None;

    for message in messages {
        match markers.classify(&message.body) {
            Some(Marker::Start) => {
                if let Some(open) = current.replace(vec![message]) {
                    close(&mut sessions, open);
                }
            }
            Some(Marker::End) => {
                if let Some(mut open) = current.take() {
                    open.push(message);
                    close(&mut sessions, open);
                }
            }
            None => {
                if let Some(open) = current.as_mut() {
                    open.push(message);
                }
            }
        }
    }

    if let Some(open) = current {
        close(&mut sessions, open);
    }

    sessions
}

fn close(sessions: &mut Vec<Session>, messages: Vec<Message>) {
    if !messages.is_empty() {
        sessions.push(Session { messages });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(body: &str) -> Message {
        Message {
            author: "Alice".into(),
            timestamp: Some("2024/1/1".into()),
            body: body.into(),
        }
    }

    fn bodies(session: &Session) -> Vec<&str> {
        session.messages().iter().map(|m| m.body.as_str()).collect()
    }

    #[test]
    fn recognizes_all_start_tag_forms() {
        let markers = Markers::default();

        for body in [
            "——CST5016/08/14——",
            "——CST5016/08/14/1900时——",
            "——CST5016/10/21/1200——",
            "——CST5017/01/10——",
            "——CST5017/01/11，AST0500——",
            "prologue ——CST5016/08/14—— the story begins",
        ] {
            assert_eq!(markers.classify(body), Some(Marker::Start), "{body}");
        }
    }

    #[test]
    fn rejects_malformed_start_tags() {
        let markers = Markers::default();

        for body in [
            "CST5016/08/14",
            "——CST5018/08/14——",
            "——CST5016/08——",
            "——CST5016/08/14",
        ] {
            assert_eq!(markers.classify(body), None, "{body}");
        }
    }

    #[test]
    fn end_marker_requires_exact_body() {
        let markers = Markers::default();

        assert_eq!(markers.classify("——save——"), Some(Marker::End));
        assert_eq!(markers.classify("——save—— done"), None);
        assert_eq!(markers.classify(" ——save——"), None);
    }

    #[test]
    fn start_wins_over_end() {
        let markers = Markers::new("save", "save").unwrap();
        assert_eq!(markers.classify("save"), Some(Marker::Start));
    }

    #[test]
    fn invalid_start_pattern_is_an_error() {
        assert!(Markers::new("(unclosed", "x").is_err());
    }

    #[test]
    fn extracts_terminated_session() {
        let sessions = segment(
            vec![
                msg("before"),
                msg("——CST5016/08/14——"),
                msg("in character"),
                msg("——save——"),
                msg("after"),
            ],
            &Markers::default(),
        );

        assert_eq!(sessions.len(), 1);
        assert_eq!(
            bodies(&sessions[0]),
            ["——CST5016/08/14——", "in character", "——save——"]
        );
    }

    #[test]
    fn keeps_unterminated_session_at_end_of_input() {
        let sessions = segment(
            vec![msg("——CST5016/08/14——"), msg("still going")],
            &Markers::default(),
        );

        assert_eq!(sessions.len(), 1);
        assert_eq!(bodies(&sessions[0]), ["——CST5016/08/14——", "still going"]);
    }

    #[test]
    fn new_start_tag_closes_open_session() {
        let sessions = segment(
            vec![
                msg("——CST5016/08/14——"),
                msg("first"),
                msg("——CST5016/09/01——"),
                msg("second"),
            ],
            &Markers::default(),
        );

        assert_eq!(sessions.len(), 2);
        assert_eq!(bodies(&sessions[0]), ["——CST5016/08/14——", "first"]);
        assert_eq!(bodies(&sessions[1]), ["——CST5016/09/01——", "second"]);
    }

    #[test]
    fn back_to_back_start_tags_yield_single_message_sessions() {
        let sessions = segment(
            vec![msg("——CST5016/08/14——"), msg("——CST5016/08/15——")],
            &Markers::default(),
        );

        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.messages().len() == 1));
    }

    #[test]
    fn end_marker_outside_session_is_ignored() {
        let sessions = segment(
            vec![msg("——save——"), msg("chatter")],
            &Markers::default(),
        );

        assert!(sessions.is_empty());
    }

    #[test]
    fn first_message_of_every_session_is_a_start() {
        let markers = Markers::default();
        let sessions = segment(
            vec![
                msg("x"),
                msg("——CST5016/08/14——"),
                msg("——save——"),
                msg("——save——"),
                msg("——CST5017/01/10——"),
                msg("y"),
                msg("——CST5017/01/11，AST0500——"),
            ],
            &markers,
        );

        assert_eq!(sessions.len(), 3);
        for session in &sessions {
            assert!(!session.messages().is_empty());
            assert_eq!(
                markers.classify(&session.messages()[0].body),
                Some(Marker::Start)
            );
        }
    }

    #[test]
    fn resegmenting_a_session_is_idempotent() {
        let markers = Markers::default();
        let sessions = segment(
            vec![
                msg("——CST5016/08/14——"),
                msg("a"),
                msg("b"),
                msg("——save——"),
            ],
            &markers,
        );
        let again = segment(sessions[0].clone().into_messages(), &markers);

        assert_eq!(again, sessions);
    }

    #[test]
    fn no_messages_are_lost_or_duplicated_across_forced_closes() {
        let input = vec![
            msg("——CST5016/08/14——"),
            msg("a"),
            msg("——CST5016/08/15——"),
            msg("b"),
            msg("——save——"),
        ];
        let sessions = segment(input.clone(), &Markers::default());
        let flattened: Vec<Message> = sessions
            .into_iter()
            .flat_map(Session::into_messages)
            .collect();

        assert_eq!(flattened, input);
    }
}
