// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Mapping raw chat identifiers to character identities.
//!
//! QQ transcripts show a participant either by their nickname or by their
//! numeric account id, and both refer to the same person. An
//! [`IdentityTable`] folds both forms into one character name and assigns
//! that character a text color.
//!
//! # Example
//!
//! ```
//! use rpg2docx::identity::{IdentityTable, Rgb};
//!
//! let table = IdentityTable::new(
//!     [("alice", "Lady Alice"), ("10001", "Lady Alice")],
//!     [("Lady Alice", Rgb(255, 0, 0))],
//! );
//!
//! assert_eq!(table.resolve("10001").name, "Lady Alice");
//! assert_eq!(table.resolve("alice").color, Some(Rgb(255, 0, 0)));
//! assert_eq!(table.resolve("bob").color, None);
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// An RGB text color.
///
/// Deserializes from a three element array, e.g. `[128, 0, 128]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    /// Formats as six uppercase hex digits without a leading `#`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// The resolved display form of a message author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    /// Character name, or the raw identifier when unmapped.
    pub name: String,

    /// Text color for everything the author says, if one is assigned.
    pub color: Option<Rgb>,
}

/// Static lookup from raw identifiers to display identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityTable {
    /// Raw identifier (nickname or account id) to character name.
    #[serde(default)]
    names: BTreeMap<String, String>,

    /// Character name to color.
    #[serde(default)]
    colors: BTreeMap<String, Rgb>,
}

impl IdentityTable {
    /// Builds a table from name and color pairs.
    #[must_use]
    pub fn new<N, C, K, V, D>(names: N, colors: C) -> Self
    where
        N: IntoIterator<Item = (K, V)>,
        C: IntoIterator<Item = (D, Rgb)>,
        K: Into<String>,
        V: Into<String>,
        D: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|(raw, name)| (raw.into(), name.into()))
                .collect(),
            colors: colors
                .into_iter()
                .map(|(name, color)| (name.into(), color))
                .collect(),
        }
    }

    /// The default cast: six characters, each known by a nickname and an account id.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            [
                ("失语", "【神谕圣咏】吾即五声"),
                ("heavy🐜", "【调停者】阿德勒"),
                ("Ga1axian", "【九号球】玖渚巡"),
                ("随波逐流制作委员会", "【黑印】加尔文"),
                ("梦之海", "【菟丝子】十七"),
                ("无糖常温百事FES", "【时代】艾帕克"),
                // Account ids show up in place of nicknames
                ("907564155", "【神谕圣咏】吾即五声"),
                ("2704587599", "【调停者】阿德勒"),
                ("1456846090", "【九号球】玖渚巡"),
                ("1695539040", "【黑印】加尔文"),
                ("1214581195", "【菟丝子】十七"),
                ("651464169", "【时代】艾帕克"),
            ],
            [
                ("【神谕圣咏】吾即五声", Rgb(255, 0, 0)),
                ("【调停者】阿德勒", Rgb(128, 0, 128)),
                ("【九号球】玖渚巡", Rgb(139, 69, 19)),
                ("【黑印】加尔文", Rgb(0, 0, 0)),
                ("【菟丝子】十七", Rgb(0, 0, 255)),
                ("【时代】艾帕克", Rgb(128, 128, 128)),
            ],
        )
    }

    /// Resolves a raw author identifier.
    ///
    /// Identifiers missing from the table keep their raw text and get no
    /// color, even if the raw text happens to equal a character name.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> DisplayIdentity {
        match self.names.get(raw) {
            Some(name) => DisplayIdentity {
                name: name.clone(),
                color: self.colors.get(name).copied(),
            },
            None => DisplayIdentity {
                name: raw.to_owned(),
                color: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> IdentityTable {
        IdentityTable::new(
            [("alice", "Alice the Bold"), ("42", "Alice the Bold"), ("carol", "Carol")],
            [("Alice the Bold", Rgb(0, 0, 255))],
        )
    }

    #[test]
    fn maps_nickname_and_account_id_to_same_identity() {
        let table = sample_table();

        assert_eq!(table.resolve("alice"), table.resolve("42"));
        assert_eq!(table.resolve("42").name, "Alice the Bold");
        assert_eq!(table.resolve("42").color, Some(Rgb(0, 0, 255)));
    }

    #[test]
    fn passes_unknown_identifier_through_without_color() {
        let identity = sample_table().resolve("mallory");

        assert_eq!(identity.name, "mallory");
        assert!(identity.color.is_none());
    }

    #[test]
    fn mapped_name_without_color_has_no_color() {
        let identity = sample_table().resolve("carol");

        assert_eq!(identity.name, "Carol");
        assert!(identity.color.is_none());
    }

    #[test]
    fn unmapped_identifier_equal_to_character_name_gets_no_color() {
        let identity = sample_table().resolve("Alice the Bold");

        assert_eq!(identity.name, "Alice the Bold");
        assert!(identity.color.is_none());
    }

    #[test]
    fn builtin_maps_every_account_id_to_a_colored_character() {
        let table = IdentityTable::builtin();

        for id in [
            "907564155",
            "2704587599",
            "1456846090",
            "1695539040",
            "1214581195",
            "651464169",
        ] {
            let identity = table.resolve(id);
            assert_ne!(identity.name, id);
            assert!(identity.color.is_some(), "no color for {id}");
        }
        assert_eq!(table.resolve("失语"), table.resolve("907564155"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = IdentityTable::builtin();
        assert_eq!(table.resolve("Ga1axian"), table.resolve("Ga1axian"));
    }

    #[test]
    fn formats_color_as_hex() {
        assert_eq!(Rgb(139, 69, 19).to_string(), "8B4513");
        assert_eq!(Rgb(0, 0, 0).to_string(), "000000");
    }

    #[test]
    fn deserializes_from_json() {
        let table: IdentityTable = serde_json::from_str(
            r#"{
                "names": { "alice": "Alice" },
                "colors": { "Alice": [1, 2, 3] }
            }"#,
        )
        .unwrap();

        assert_eq!(table.resolve("alice").color, Some(Rgb(1, 2, 3)));
    }
}
