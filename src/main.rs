// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for rpg2docx.
//!
//! This binary provides the `rpg2docx` command for extracting role-play
//! sessions from a QQ chat transcript into a color-coded Word document.

use lexopt::prelude::*;
use rpg2docx::config::{self, Config};
use rpg2docx::docx::{self, DocxOptions};
use rpg2docx::parser::parse_messages;
use rpg2docx::renderer::{self, Document, Renderer};
use rpg2docx::session::segment;
use snafu::{OptionExt, ensure, prelude::*};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write a Word document to the given file.
    Docx(PathBuf),
    /// Write Markdown to the given file.
    Markdown(PathBuf),
    /// Write Markdown to stdout.
    Stdout,
}

struct Cli {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    title: Option<String>,
    quiet: bool,
    dry_run: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("an input transcript is required (see --help)"))]
    MissingInput,

    #[snafu(display("input file not found: {}", path.display()))]
    InputNotFound { path: PathBuf },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to load configuration: {source}"))]
    LoadConfig { source: config::ConfigError },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to render document: {source}"))]
    Render { source: docx::DocxError },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Extract role-play sessions from a QQ chat transcript into a color-coded document

Usage: {name} [OPTIONS] <INPUT> [OUTPUT]

Arguments:
  <INPUT>   Exported chat transcript (UTF-8 text)
  [OUTPUT]  Output file (default: <INPUT stem>_rpg.docx next to the input)
            Files ending in .md are written as Markdown, - writes Markdown to stdout

Options:
  -c, --config <FILE>  JSON file with identities, markers and headings
      --title <TEXT>   Document title
  -q, --quiet          Suppress progress messages
  -n, --dry-run        Extract and report without writing
  -h, --help           Print help
  -V, --version        Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Option<Cli>, lexopt::Error> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut quiet = false;
    let mut dry_run = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('c') | Long("config") => config = Some(parser.value()?.parse()?),
            Long("title") => title = Some(parser.value()?.string()?),
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if input.is_none() => input = Some(PathBuf::from(val)),
            Value(val) if output.is_none() => output = Some(PathBuf::from(val)),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(input.map(|input| Cli {
        input,
        output,
        config,
        title,
        quiet,
        dry_run,
    }))
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let cli = parse_args()
        .context(ParseArgsSnafu)?
        .context(MissingInputSnafu)?;

    let config = match &cli.config {
        Some(path) => Config::load(path).context(LoadConfigSnafu)?,
        None => Config::default(),
    };
    let markers = config.markers().context(LoadConfigSnafu)?;
    let target = output_target(&cli)?;

    if !cli.quiet {
        eprintln!("Input: {}", cli.input.display());
        match &target {
            OutputTarget::Docx(path) | OutputTarget::Markdown(path) => {
                eprintln!("Output: {}", path.display());
            }
            OutputTarget::Stdout => eprintln!("Output: stdout"),
        }
    }

    ensure!(cli.input.is_file(), InputNotFoundSnafu { path: &cli.input });
    let text = std::fs::read_to_string(&cli.input).context(ReadFileSnafu { path: &cli.input })?;

    let messages = parse_messages(&text);
    if !cli.quiet {
        eprintln!("Parsed {} messages", messages.len());
    }

    let sessions = segment(messages, &markers);
    if !cli.quiet {
        eprintln!("Extracted {} sessions", sessions.len());
    }

    if sessions.is_empty() {
        eprintln!(
            "Warning: no role-play sessions found in {}",
            cli.input.display()
        );
        return Ok(());
    }

    let mut opts = config.render_options();
    if let Some(title) = &cli.title {
        opts.title.clone_from(title);
    }
    let document = Renderer::new(&config.identities, &markers, opts).render_document(&sessions);

    write_output(&document, &target, &cli)
}

/// Resolves the output target, deriving a path from the input when omitted.
fn output_target(cli: &Cli) -> Result<OutputTarget, Error> {
    let Some(output) = &cli.output else {
        let stem = cli.input.file_stem().context(InvalidFilenameSnafu)?;
        let path = cli
            .input
            .with_file_name(format!("{}_rpg.docx", stem.to_string_lossy()));
        return Ok(OutputTarget::Docx(path));
    };

    Ok(if output == Path::new("-") {
        OutputTarget::Stdout
    } else if output.extension().is_some_and(|ext| ext == "md") {
        OutputTarget::Markdown(output.clone())
    } else {
        OutputTarget::Docx(output.clone())
    })
}

/// Serializes the document fully in memory, then writes it in one step.
fn write_output(document: &Document, target: &OutputTarget, cli: &Cli) -> Result<(), Error> {
    let (path, bytes) = match target {
        OutputTarget::Stdout => {
            if cli.dry_run {
                eprintln!("Would output {} sessions", document.sessions.len());
            } else {
                print!("{}", renderer::render_markdown(document));
            }
            return Ok(());
        }
        OutputTarget::Markdown(path) => (path, renderer::render_markdown(document).into_bytes()),
        OutputTarget::Docx(path) => {
            let buffer = docx::write_docx(document, &DocxOptions::default(), Cursor::new(Vec::new()))
                .context(RenderSnafu)?;
            (path, buffer.into_inner())
        }
    };

    if cli.dry_run {
        eprintln!(
            "Would write {} ({} sessions)",
            path.display(),
            document.sessions.len()
        );
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
    }
    std::fs::write(path, bytes).context(WriteFileSnafu { path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
