// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Runtime configuration.
//!
//! Every campaign has its own cast and its own calendar, so the identity
//! table, session markers and headings can be supplied as a JSON file.
//! Any field left out keeps its built-in value:
//!
//! ```json
//! {
//!     "identities": {
//!         "names": { "heavy🐜": "【调停者】阿德勒", "2704587599": "【调停者】阿德勒" },
//!         "colors": { "【调停者】阿德勒": [128, 0, 128] }
//!     },
//!     "start_pattern": "——CST501[67]/\\d+/\\d+(/\\d+时?)?(，[^—]+)?——",
//!     "end_marker": "——save——",
//!     "title": "RPG会话记录",
//!     "session_heading": "会话"
//! }
//! ```

use crate::identity::IdentityTable;
use crate::renderer::RenderOptions;
use crate::session::{DEFAULT_END_MARKER, DEFAULT_START_PATTERN, Markers};
use serde::Deserialize;
use snafu::prelude::*;
use std::path::{Path, PathBuf};

/// Error type for configuration loading.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[snafu(display("failed to read config {}: {source}", path.display()))]
    Read {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration JSON.
    #[snafu(display("failed to parse config: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },

    /// The start pattern is not a valid regular expression.
    #[snafu(display("invalid start_pattern: {source}"))]
    StartPattern {
        /// The underlying regex error.
        source: regex::Error,
    },
}

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw identifier to character mapping and character colors.
    pub identities: IdentityTable,

    /// Regular expression searched for in a message body to open a session.
    pub start_pattern: String,

    /// Exact message body that closes a session.
    pub end_marker: String,

    /// Document title.
    pub title: String,

    /// Session heading prefix; sessions render as `<prefix> N`.
    pub session_heading: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identities: IdentityTable::builtin(),
            start_pattern: DEFAULT_START_PATTERN.to_owned(),
            end_marker: DEFAULT_END_MARKER.to_owned(),
            title: "RPG会话记录".to_owned(),
            session_heading: "会话".to_owned(),
        }
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).context(JsonSnafu)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Self::from_json(&json)
    }

    /// Compiles the session markers.
    ///
    /// # Errors
    ///
    /// Returns an error if `start_pattern` is not a valid regular expression.
    pub fn markers(&self) -> Result<Markers, ConfigError> {
        Markers::new(&self.start_pattern, self.end_marker.as_str()).context(StartPatternSnafu)
    }

    /// Rendering options derived from this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            title: self.title.clone(),
            session_heading: self.session_heading.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Rgb;
    use crate::session::Marker;

    #[test]
    fn empty_object_keeps_builtin_values() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn overrides_identities_only() {
        let config = Config::from_json(
            r#"{
                "identities": {
                    "names": { "alice": "Alice" },
                    "colors": { "Alice": [10, 20, 30] }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.identities.resolve("alice").color, Some(Rgb(10, 20, 30)));
        // The built-in cast is replaced, not merged
        assert!(config.identities.resolve("失语").color.is_none());
        assert_eq!(config.end_marker, DEFAULT_END_MARKER);
    }

    #[test]
    fn overrides_markers() {
        let config = Config::from_json(
            r#"{ "start_pattern": "^BEGIN$", "end_marker": "END" }"#,
        )
        .unwrap();
        let markers = config.markers().unwrap();

        assert_eq!(markers.classify("BEGIN"), Some(Marker::Start));
        assert_eq!(markers.classify("END"), Some(Marker::End));
        assert_eq!(markers.classify("——save——"), None);
    }

    #[test]
    fn rejects_invalid_start_pattern() {
        let config = Config::from_json(r#"{ "start_pattern": "[" }"#).unwrap();
        assert!(matches!(
            config.markers(),
            Err(ConfigError::StartPattern { .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Config::from_json("{ not json"),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn rejects_bad_color() {
        let result = Config::from_json(
            r#"{ "identities": { "colors": { "A": [300, 0, 0] } } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn render_options_carry_headings() {
        let config = Config::from_json(r#"{ "title": "Log", "session_heading": "Session" }"#)
            .unwrap();
        let opts = config.render_options();

        assert_eq!(opts.title, "Log");
        assert_eq!(opts.session_heading, "Session");
    }
}
