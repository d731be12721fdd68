// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Extract role-play sessions from QQ chat transcripts.
//!
//! Text role-play campaigns often run inside an ordinary group chat, with
//! in-character sessions opened by a date tag and closed by a save marker.
//! This crate pulls those sessions out of an exported transcript and
//! renders them as a color-coded document, one color per character.
//!
//! # Overview
//!
//! The pipeline is a single linear pass:
//!
//! 1. [`parser`] rebuilds messages from the line-oriented transcript
//! 2. [`session`] groups the messages into sessions between markers
//! 3. [`renderer`] maps speakers to characters via [`identity`] and
//!    produces styled text runs
//! 4. [`docx`] or [`renderer::render_markdown`] writes the result
//!
//! # Example
//!
//! ```no_run
//! use rpg2docx::config::Config;
//! use rpg2docx::docx::{write_docx, DocxOptions};
//! use rpg2docx::parser::parse_messages;
//! use rpg2docx::renderer::Renderer;
//! use rpg2docx::session::segment;
//!
//! let config = Config::default();
//! let markers = config.markers().unwrap();
//!
//! let log = std::fs::read_to_string("chat_log.txt").unwrap();
//! let sessions = segment(parse_messages(&log), &markers);
//!
//! let renderer = Renderer::new(&config.identities, &markers, config.render_options());
//! let document = renderer.render_document(&sessions);
//!
//! let file = std::fs::File::create("chat_log_rpg.docx").unwrap();
//! write_docx(&document, &DocxOptions::default(), file).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`parser`]: transcript parsing into [`parser::Message`]s
//! - [`session`]: session markers and segmentation
//! - [`identity`]: speaker to character mapping and colors
//! - [`renderer`]: styled document model and Markdown output
//! - [`docx`]: Word document output
//! - [`config`]: JSON configuration with built-in defaults

#![deny(missing_docs)]

pub mod config;
pub mod docx;
pub mod identity;
pub mod parser;
pub mod renderer;
pub mod session;
