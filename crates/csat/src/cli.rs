#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use csat_core::Direction;
use csat_grid::CommitRecord;
use csat_sheet::FileCache;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::Result;
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "csat",
    about = "Character sheet editor: snap-to-grid panel layout and document storage",
    version
)]
pub struct Cli {
    /// Editor configuration (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Load this document before running the command.
    #[arg(long, global = true)]
    pub document: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pointer displacement of a driven gesture, in pixels.
#[derive(Debug, Clone, Copy, Args)]
pub struct Displacement {
    #[arg(long = "dx-px", default_value_t = 0.0, allow_negative_numbers = true)]
    pub dx_px: f64,

    #[arg(long = "dy-px", default_value_t = 0.0, allow_negative_numbers = true)]
    pub dy_px: f64,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List panels and their grid areas.
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Drag a panel by its move handle.
    Move {
        id: String,
        #[command(flatten)]
        by: Displacement,
    },

    /// Drag one of a panel's resize handles (u, d, l, r, ul, ur, ld, rd).
    Resize {
        id: String,
        direction: String,
        #[command(flatten)]
        by: Displacement,
    },

    /// Add a panel below every other one.
    #[command(name = "add-element")]
    AddElement {
        id: String,
        /// Initial panel data as a JSON object.
        #[arg(long)]
        data: Option<String>,
    },

    /// Remove a panel and its data.
    #[command(name = "remove-element")]
    RemoveElement { id: String },

    /// Apply a raw reducer action given as JSON.
    Dispatch { action: String },

    /// Write characterData.json.
    Save {
        /// Target directory; defaults to storage.document_dir.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load a document file and cache it.
    Load { file: PathBuf },

    /// Forget the cached document.
    #[command(name = "clear-cache")]
    ClearCache,

    /// Fill missing document fields and report layout problems.
    Validate,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    logging::init(&config.log)?;

    let cache = FileCache::new(&config.storage.cache_dir);
    let mut editor = Editor::boot(Box::new(cache), config.grid)?;
    if let Some(path) = &cli.document {
        editor.load(Some(path.as_path()))?;
    }
    execute(&mut editor, cli.command, &config, out)
}

/// Run one command against a booted editor.
pub fn execute(
    editor: &mut Editor,
    command: Commands,
    config: &EditorConfig,
    out: &mut dyn Write,
) -> Result<()> {
    debug!(?command, "running command");
    match command {
        Commands::Show { json } => show(editor, json, out),
        Commands::Move { id, by } => {
            let record = editor.drive_gesture(&id, Direction::empty(), by.dx_px, by.dy_px)?;
            editor.persist()?;
            report_commit(&record, out)
        }
        Commands::Resize { id, direction, by } => {
            let direction: Direction = direction.parse()?;
            let record = editor.drive_gesture(&id, direction, by.dx_px, by.dy_px)?;
            editor.persist()?;
            report_commit(&record, out)
        }
        Commands::AddElement { id, data } => {
            let data = data.map(|raw| serde_json::from_str::<Value>(&raw)).transpose()?;
            let placement = editor.add_element(&id, data)?;
            editor.persist()?;
            writeln!(out, "added {id} at {}", placement.grid_area())?;
            Ok(())
        }
        Commands::RemoveElement { id } => {
            editor.remove_element(&id)?;
            editor.persist()?;
            writeln!(out, "removed {id}")?;
            Ok(())
        }
        Commands::Dispatch { action } => {
            let action: Value = serde_json::from_str(&action)?;
            editor.dispatch(&action)?;
            editor.persist()?;
            Ok(())
        }
        Commands::Save { out: dir } => {
            let dir = dir.unwrap_or_else(|| config.storage.document_dir.clone());
            let path = editor.save(&dir)?;
            writeln!(out, "saved {}", path.display())?;
            Ok(())
        }
        Commands::Load { file } => {
            editor.load(Some(file.as_path()))?;
            writeln!(out, "loaded {}", file.display())?;
            Ok(())
        }
        Commands::ClearCache => {
            editor.clear_cache()?;
            writeln!(out, "cache cleared")?;
            Ok(())
        }
        Commands::Validate => {
            editor.dispatch(&json!({"type": "validate"}))?;
            editor.persist()?;
            let issues = editor.document().layout().validate();
            for issue in &issues {
                writeln!(out, "{}: {:?} at {}", issue.id, issue.problem, issue.placement.grid_area())?;
            }
            writeln!(out, "{} layout problem(s)", issues.len())?;
            Ok(())
        }
    }
}

fn show(editor: &mut Editor, as_json: bool, out: &mut dyn Write) -> Result<()> {
    let views = editor.cells();
    if as_json {
        let rows: Vec<Value> = views
            .iter()
            .map(|view| {
                json!({
                    "id": view.id,
                    "gridArea": view.area.to_string(),
                    "locked": view.overlay.is_none(),
                })
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }
    for view in &views {
        writeln!(out, "{:<20} {}", view.id, view.area)?;
    }
    Ok(())
}

fn report_commit(record: &CommitRecord, out: &mut dyn Write) -> Result<()> {
    write!(
        out,
        "{}: {} -> {}",
        record.id,
        record.previous.grid_area(),
        record.placement.grid_area()
    )?;
    if record.x_reverted || record.y_reverted {
        write!(out, " (reverted past the grid edge)")?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_gesture_arguments() {
        let cli = Cli::try_parse_from([
            "csat", "resize", "BattleStats", "ur", "--dx-px", "-110", "--dy-px", "40",
        ])
        .unwrap();
        match cli.command {
            Commands::Resize { id, direction, by } => {
                assert_eq!(id, "BattleStats");
                assert_eq!(direction, "ur");
                assert_eq!(by.dx_px, -110.0);
                assert_eq!(by.dy_px, 40.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["csat", "show", "--config", "csat.toml", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("csat.toml")));
        assert!(matches!(cli.command, Commands::Show { json: true }));
    }
}
