use anyhow::{Context, Result};
use blockwright::blocks::{Block, BuildStatus};
use blockwright::{discover, load_from_path, BlockId, Document, EditCommand, EditorConfig, Session};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "blockwright")]
#[command(about = "Block-structured editing of Java sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to .blockwright.toml next to the source)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the block tree of a Java file
    Blocks {
        file: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply edit intents to a Java file
    Apply {
        file: PathBuf,

        /// One intent or an array of intents as JSON, or @path to a JSON file
        #[arg(short, long)]
        intent: String,

        /// Show what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Show which block owns a source line
    Line { file: PathBuf, line: usize },

    /// Report how completely each Java file under a directory maps to blocks
    Check { dir: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Blocks { file, json } => cmd_blocks(&file, config, json),
        Commands::Apply {
            file,
            intent,
            dry_run,
            diff,
        } => cmd_apply(&file, config, &intent, dry_run, diff),
        Commands::Line { file, line } => cmd_line(&file, config, line),
        Commands::Check { dir } => cmd_check(&dir, config),
    }
}

/// Explicit --config wins; otherwise look next to `near`.
fn resolve_config(explicit: Option<&Path>, near: &Path) -> Result<EditorConfig> {
    if let Some(path) = explicit {
        return Ok(load_from_path(path)?);
    }
    let dir = if near.is_dir() {
        near
    } else {
        near.parent().unwrap_or_else(|| Path::new("."))
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    Ok(discover(dir)?)
}

fn open_session(file: &Path, config: Option<&Path>) -> Result<(Document, Session)> {
    let config = resolve_config(config, file)?;
    let document = Document::load(file)?;
    let session = Session::open(document.text(), &config)
        .with_context(|| format!("failed to open {}", file.display()))?;
    Ok((document, session))
}

fn status_line(status: &BuildStatus) -> String {
    match status {
        BuildStatus::Complete => format!("{} complete", "✓".green()),
        BuildStatus::Partial { errors } => {
            format!("{} partial ({errors} parse error(s))", "⊙".yellow())
        }
        BuildStatus::NoTypeDeclaration => format!("{} no type declaration", "✗".red()),
        BuildStatus::EntryClassMissing { class } => {
            format!("{} entry class {class} not found", "✗".red())
        }
        BuildStatus::EntryMethodMissing { method } => {
            format!("{} entry method {method} not found", "✗".red())
        }
    }
}

fn cmd_blocks(file: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let (_, session) = open_session(file, config)?;
    let blocks = session.blocks();

    if json {
        let report = serde_json::json!({
            "status": blocks.status,
            "root": blocks.root,
            "omitted": blocks.omitted,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", status_line(&blocks.status));
    if let Some(root) = &blocks.root {
        print_block(&session, root, 0);
    }
    if !blocks.omitted.is_empty() {
        println!();
        println!("{}", "Omitted:".bold());
        for omitted in &blocks.omitted {
            println!("  line {}: {}", omitted.line, omitted.kind.dimmed());
        }
    }
    Ok(())
}

fn print_block(session: &Session, block: &Block, depth: usize) {
    let tree = session.tree();
    let span = tree.span(block.node);
    let preview = tree
        .text(block.node)
        .lines()
        .next()
        .unwrap_or_default()
        .trim();
    let preview: String = preview.chars().take(60).collect();
    println!(
        "{}{} {} {}",
        "  ".repeat(depth),
        block.id.as_str().cyan(),
        format!("L{}", tree.line_of(span.start)).dimmed(),
        preview
    );
    for child in &block.children {
        print_block(session, child, depth + 1);
    }
}

fn read_intents(raw: &str) -> Result<Vec<EditCommand<BlockId>>> {
    let json = match raw.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read intent file {path}"))?
        }
        None => raw.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&json).context("intent is not JSON")?;
    let intents = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(intents)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
    }
}

fn cmd_apply(
    file: &Path,
    config: Option<&Path>,
    intent: &str,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let intents = read_intents(intent)?;
    let (mut document, mut session) = open_session(file, config)?;
    let original = session.text().to_string();

    if dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    }

    // Ids are resolved against the tree as it stands after the previous
    // intent, so later intents must name blocks that survive earlier ones.
    let (mut applied, mut unchanged, mut failed) = (0, 0, 0);
    for intent in intents {
        let name = intent.name();
        let target = intent.target().clone();
        let update = session.apply_edit(intent);
        match (&update.failure, update.changed()) {
            (None, true) => {
                applied += 1;
                println!("{} {} {}", "✓".green(), name, target);
            }
            (None, false) => {
                unchanged += 1;
                println!("{} {} {}: no change", "⊙".yellow(), name, target);
            }
            (Some(reason), _) => {
                failed += 1;
                eprintln!("{} {} {}: {}", "✗".red(), name, target, reason);
            }
        }
    }

    let edited = session.text();
    if show_diff && edited != original {
        display_diff(file, &original, edited);
    }
    if !dry_run && edited != original {
        document.save(edited)?;
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", applied.to_string().green());
    println!("  {} unchanged", unchanged.to_string().yellow());
    println!("  {} failed", failed.to_string().red());

    if failed > 0 {
        anyhow::bail!("{failed} intent(s) failed");
    }
    Ok(())
}

fn cmd_line(file: &Path, config: Option<&Path>, line: usize) -> Result<()> {
    let (_, session) = open_session(file, config)?;
    let index = session.capture_breakpoints();
    match index.resolve_line(line) {
        Some(entry) => {
            println!(
                "{} {} (lines {}-{})",
                entry.id.as_str().cyan(),
                entry.kind,
                entry.start_line,
                entry.end_line
            );
            Ok(())
        }
        None => anyhow::bail!("no statement block on line {line}"),
    }
}

fn cmd_check(dir: &Path, config: Option<&Path>) -> Result<()> {
    let config = resolve_config(config, dir)?;
    let (mut complete, mut partial, mut missing) = (0, 0, 0);

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("java")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    for path in &files {
        let document = Document::load(path)?;
        let session = Session::open(document.text(), &config)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let blocks = session.blocks();
        match blocks.status {
            BuildStatus::Complete => complete += 1,
            BuildStatus::Partial { .. } => partial += 1,
            _ => missing += 1,
        }
        println!(
            "{} {} ({} block(s), {} omitted)",
            status_line(&blocks.status),
            path.display(),
            blocks.map.len(),
            blocks.omitted.len()
        );
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} complete", complete.to_string().green());
    println!("  {} partial", partial.to_string().yellow());
    println!("  {} without blocks", missing.to_string().red());
    Ok(())
}
