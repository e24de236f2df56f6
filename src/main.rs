use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use yamlsync::config::Config;
use yamlsync::document::path::LogicalPath;
use yamlsync::editor::assist::hover;
use yamlsync::editor::state::{SyncEngine, Validation};
use yamlsync::editor::surface::{BufferSurface, TextSurface};
use yamlsync::file::loader::load_source;
use yamlsync::file::saver::save_text;
use yamlsync::sync::planner::{NewNode, Template};
use yamlsync::sync::resolver::Position;

/// yamlsync - keeps YAML text and its logical tree in step
#[derive(Parser)]
#[command(name = "yamlsync")]
#[command(version)]
#[command(about = "Bidirectional YAML text and tree synchronization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Indentation width, overriding the config file
    #[arg(long, global = true)]
    indent: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the document parses
    Validate { file: String },
    /// Print the line to path map
    LineMap { file: String },
    /// Resolve a text position to a path
    Path {
        file: String,
        #[arg(long)]
        line: usize,
        #[arg(long, default_value_t = 1)]
        column: usize,
    },
    /// Resolve a path to a text range
    Range {
        file: String,
        path: String,
        /// Resolve PATH.LEAF to its single line
        #[arg(long)]
        leaf: Option<String>,
    },
    /// Print the visible tree rows
    Tree {
        file: String,
        #[arg(long)]
        expand_all: bool,
        /// Select a path, expanding its ancestors
        #[arg(long)]
        select: Option<String>,
    },
    /// Show where content added under PARENT would go
    Plan { file: String, parent: String },
    /// Add content under PARENT
    Add {
        file: String,
        parent: String,
        #[arg(long, value_enum)]
        kind: NodeKindArg,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Write the result back to FILE instead of printing it
        #[arg(long)]
        in_place: bool,
    },
    /// Rewrite the document in canonical block style
    Format {
        file: String,
        #[arg(long)]
        in_place: bool,
    },
    /// Export the document as pretty JSON
    ToJson { file: String },
    /// Describe the node at a position
    Hover {
        file: String,
        #[arg(long)]
        line: usize,
        #[arg(long, default_value_t = 1)]
        column: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NodeKindArg {
    KeyValue,
    ArrayItem,
    Object,
    Department,
    Technology,
    Strategy,
    Region,
}

impl NodeKindArg {
    fn build(self, key: Option<String>, value: Option<String>, name: Option<String>) -> Result<NewNode> {
        let template = |template: Template| -> Result<NewNode> {
            let name = name.clone().context("--name is required for templates")?;
            Ok(NewNode::Template { template, name })
        };

        match self {
            NodeKindArg::KeyValue => Ok(NewNode::KeyValue {
                key: key.context("--key is required for key-value")?,
                value: value.unwrap_or_default(),
            }),
            NodeKindArg::ArrayItem => Ok(NewNode::ArrayItem {
                value: value.context("--value is required for array-item")?,
            }),
            NodeKindArg::Object => Ok(NewNode::Object {
                name: name.clone().context("--name is required for object")?,
            }),
            NodeKindArg::Department => template(Template::Department),
            NodeKindArg::Technology => template(Template::Technology),
            NodeKindArg::Strategy => template(Template::Strategy),
            NodeKindArg::Region => template(Template::Region),
        }
    }
}

fn parse_path(input: &str) -> Result<LogicalPath> {
    LogicalPath::parse(input).with_context(|| format!("Invalid path '{}'", input))
}

/// Loads FILE into a surface and validates it.
fn open(file: &str, config: Config) -> Result<(SyncEngine, BufferSurface)> {
    let text = load_source(file)?;
    let mut surface = BufferSurface::new(&text);
    let mut engine = SyncEngine::new(config);
    if let Validation::Invalid(err) = engine.on_content_changed(&mut surface, Instant::now()) {
        bail!("{}", err);
    }
    Ok((engine, surface))
}

fn emit(out: &mut impl Write, text: &str, file: &str, in_place: bool) -> Result<()> {
    if in_place {
        if file == "-" {
            bail!("--in-place needs a file, not stdin");
        }
        save_text(file, text)
    } else {
        out.write_all(text.as_bytes()).context("Failed to write output")
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load();
    if let Some(indent) = cli.indent {
        config.indent_size = indent;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Validate { file } => {
            let text = load_source(&file)?;
            let mut engine = SyncEngine::new(config);
            match engine.validate(&text) {
                Validation::Valid => {
                    writeln!(
                        out,
                        "valid: {} lines, {}",
                        engine.line_count(),
                        engine.file_size_label()
                    )?;
                }
                Validation::Invalid(err) => bail!("{}", err),
            }
        }
        Command::LineMap { file } => {
            let (engine, _) = open(&file, config)?;
            for (line, path) in engine.line_map().iter() {
                writeln!(out, "{:>5} -> {}", line, path)?;
            }
        }
        Command::Path { file, line, column } => {
            let (engine, _) = open(&file, config)?;
            let path = engine
                .resolve_backward(Position::new(line, column))
                .with_context(|| format!("No path at line {}, column {}", line, column))?;
            writeln!(out, "{}", path)?;
        }
        Command::Range { file, path, leaf } => {
            let (engine, _) = open(&file, config)?;
            let parsed = parse_path(&path)?;
            let range = engine
                .resolve_forward(&parsed, leaf.as_deref())
                .with_context(|| format!("Path '{}' not found in text", path))?;
            writeln!(
                out,
                "{}:{}-{}:{} (key at column {})",
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
                range.anchor_column
            )?;
        }
        Command::Tree {
            file,
            expand_all,
            select,
        } => {
            let (mut engine, _) = open(&file, config)?;
            if expand_all {
                engine.expand_all();
            }
            if let Some(select) = select {
                engine.select(&parse_path(&select)?);
            }
            for row in engine.rows() {
                let marker = match (row.expandable, row.expanded) {
                    (true, true) => "▼ ",
                    (true, false) => "▶ ",
                    _ => "  ",
                };
                let cursor = if row.selected { ">" } else { " " };
                writeln!(
                    out,
                    "{}{}{}{}: {}",
                    cursor,
                    "  ".repeat(row.depth),
                    marker,
                    row.label,
                    row.value_preview
                )?;
            }
        }
        Command::Plan { file, parent } => {
            let (engine, _) = open(&file, config)?;
            let parent = parse_path(&parent)?;
            let point = engine
                .plan_insertion(&parent)
                .with_context(|| format!("Cannot add under '{}'", parent))?;
            writeln!(
                out,
                "line {}, indent {}, context {}{}",
                point.line,
                point.indent,
                point.context,
                if point.is_sequence { ", sequence" } else { "" }
            )?;
        }
        Command::Add {
            file,
            parent,
            kind,
            key,
            value,
            name,
            in_place,
        } => {
            let node = kind.build(key, value, name)?;
            let (mut engine, mut surface) = open(&file, config)?;
            let parent = parse_path(&parent)?;
            engine
                .add_node(&mut surface, &parent, &node, Instant::now())
                .with_context(|| format!("Cannot add under '{}'", parent))?;
            if let Some(err) = engine.error() {
                bail!("Insertion produced invalid YAML: {}", err);
            }
            emit(&mut out, &surface.text(), &file, in_place)?;
        }
        Command::Format { file, in_place } => {
            let (mut engine, mut surface) = open(&file, config)?;
            engine.format_document(&mut surface, Instant::now());
            emit(&mut out, &surface.text(), &file, in_place)?;
        }
        Command::ToJson { file } => {
            let (engine, _) = open(&file, config)?;
            let tree = engine.tree().context("Document has no tree")?;
            writeln!(out, "{}", tree.to_json_pretty()?)?;
        }
        Command::Hover { file, line, column } => {
            let (engine, _) = open(&file, config)?;
            let summary = hover(&engine, Position::new(line, column))
                .with_context(|| format!("Nothing to describe at line {}, column {}", line, column))?;
            writeln!(out, "{}", summary.path)?;
            for text in summary.lines() {
                writeln!(out, "{}", text)?;
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    yamlsync::logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
