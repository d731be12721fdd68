// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Writing rendered documents as Word (`.docx`) files.
//!
//! A `.docx` file is a zip archive of WordprocessingML parts. Only the
//! parts Word needs to open the file are produced: content types,
//! relationships, the document body, a style sheet with `Title` and
//! `Heading1` styles, and core properties.
//!
//! # Example
//!
//! ```
//! use rpg2docx::docx::{write_docx, DocxOptions};
//! use rpg2docx::renderer::Document;
//! use std::io::Cursor;
//!
//! let doc = Document { title: "Log".into(), sessions: vec![] };
//! let bytes = write_docx(&doc, &DocxOptions::default(), Cursor::new(Vec::new()))
//!     .unwrap()
//!     .into_inner();
//!
//! assert!(bytes.starts_with(b"PK"));
//! ```

use crate::renderer::{Document, Run};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use snafu::prelude::*;
use std::fmt::Write as _;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Error type for document writing failures.
#[derive(Debug, Snafu)]
pub enum DocxError {
    /// Failed to add a part to the archive.
    #[snafu(display("failed to write {part}: {source}"))]
    Zip {
        /// Name of the archive part being written.
        part: String,
        /// The underlying zip error.
        source: zip::result::ZipError,
    },

    /// Failed to write part contents.
    #[snafu(display("failed to write {part}: {source}"))]
    Io {
        /// Name of the archive part being written.
        part: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to finalize the archive.
    #[snafu(display("failed to finish archive: {source}"))]
    Finish {
        /// The underlying zip error.
        source: zip::result::ZipError,
    },
}

/// Options for `.docx` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxOptions {
    /// Creation time recorded in the core properties.
    pub created: DateTime<Utc>,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            created: Utc::now(),
        }
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:sz w:val="22"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:sz w:val="56"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="365F91"/><w:sz w:val="28"/></w:rPr></w:style></w:styles>"#;

/// Writes `doc` as a `.docx` archive into `writer` and returns the writer.
///
/// # Errors
///
/// Returns an error if any archive part cannot be written.
pub fn write_docx<W: Write + Seek>(
    doc: &Document,
    opts: &DocxOptions,
    writer: W,
) -> Result<W, DocxError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_owned()),
        ("_rels/.rels", PACKAGE_RELS.to_owned()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_owned()),
        ("word/styles.xml", STYLES.to_owned()),
        ("word/document.xml", document_xml(doc)),
        ("docProps/core.xml", core_xml(doc, opts)),
    ];

    for (part, contents) in parts {
        zip.start_file(part, options).context(ZipSnafu { part })?;
        zip.write_all(contents.as_bytes()).context(IoSnafu { part })?;
    }

    zip.finish().context(FinishSnafu)
}

/// Builds `word/document.xml`.
fn document_xml(doc: &Document) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    styled_paragraph(&mut out, "Title", &doc.title);
    for session in &doc.sessions {
        styled_paragraph(&mut out, "Heading1", &session.heading);
        for message in &session.messages {
            out.push_str("<w:p>");
            for run in message.runs() {
                write_run(&mut out, run);
            }
            out.push_str("</w:p>");
        }
    }

    // US Letter with one inch margins
    out.push_str(
        r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
    );
    out
}

fn styled_paragraph(out: &mut String, style: &str, text: &str) {
    write!(
        out,
        r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        xml_text(text)
    )
    .unwrap();
}

/// Appends a `<w:r>` element. Newlines in the text become `<w:br/>`.
fn write_run(out: &mut String, run: &Run) {
    out.push_str("<w:r>");
    if run.bold || run.color.is_some() {
        out.push_str("<w:rPr>");
        if run.bold {
            out.push_str("<w:b/>");
        }
        if let Some(color) = run.color {
            write!(out, r#"<w:color w:val="{color}"/>"#).unwrap();
        }
        out.push_str("</w:rPr>");
    }

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        if !line.is_empty() {
            write!(out, r#"<w:t xml:space="preserve">{}</w:t>"#, xml_text(line)).unwrap();
        }
    }
    out.push_str("</w:r>");
}

/// Escapes text for XML, dropping characters XML 1.0 does not allow.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r') || !(c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}')
        })
        .collect();
    escape(cleaned.as_str()).into_owned()
}

/// Builds `docProps/core.xml`.
fn core_xml(doc: &Document, opts: &DocxOptions) -> String {
    let created = opts.created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>{name}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
        title = xml_text(&doc.title),
        name = env!("CARGO_PKG_NAME"),
    )
}
