//! Command-line front end for creating, inspecting and resizing levels

use clap::{Parser, Subcommand, ValueEnum};
use delver_map_editor::{Edge, EditorConfig, EditorResult, Level, LevelFactory};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delver_map_editor")]
#[command(author, version, about = "Create, inspect and resize delver levels")]
struct Cli {
    /// Editor configuration (TOML). Defaults apply when omitted.
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new level and save it under the configured folder
    New {
        /// Level name, also the save folder name
        name: String,
    },
    /// Print a saved level's name, grid size, hash and issues
    Info {
        #[arg(value_name = "LEVEL_JSON")]
        path: PathBuf,
    },
    /// Resize a saved level towards one or more edges and save it in place
    Resize {
        #[arg(value_name = "LEVEL_JSON")]
        path: PathBuf,
        mode: ResizeMode,
        /// Edges to grow or shrink towards: left, right, top, bottom
        #[arg(required = true, num_args = 1..)]
        directions: Vec<Edge>,
        /// Cells per direction
        #[arg(short, long, default_value_t = 1)]
        size: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResizeMode {
    Expand,
    Reduce,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> EditorResult<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::New { name } => create(&config, name),
        Command::Info { path } => print_info(&config, &path),
        Command::Resize {
            path,
            mode,
            directions,
            size,
        } => resize(&config, &path, mode, &directions, size),
    }
}

fn create(config: &EditorConfig, name: String) -> EditorResult<()> {
    let mut level = LevelFactory::new(config).create_level()?;
    level.set_name(name);
    if level.same_name_saved(&config.level_save_folder) {
        info!("Overwriting the saved level '{}'", level.name());
    }
    let path = level.save(config)?;
    println!("{}", path.display());
    Ok(())
}

fn print_info(config: &EditorConfig, path: &Path) -> EditorResult<()> {
    let paths = config.asset_paths();
    let level = Level::load(path, &paths)?;
    let map = level.map();

    println!("name:      {}", level.name());
    println!(
        "grid size: {} (min {}, max {})",
        map.grid_size(),
        map.min_grid_size(),
        map.max_grid_size()
    );
    let locked: Vec<&str> = map
        .tilemap()
        .locked_edges()
        .iter()
        .map(|edge| edge.as_str())
        .collect();
    if !locked.is_empty() {
        println!("locked:    {}", locked.join(", "));
    }
    println!("hash:      {}", level.to_hash(&paths)?);
    for issue in level.issues() {
        println!("issue:     {issue}");
    }
    Ok(())
}

fn resize(
    config: &EditorConfig,
    path: &Path,
    mode: ResizeMode,
    directions: &[Edge],
    size: u32,
) -> EditorResult<()> {
    let paths = config.asset_paths();
    let mut level = Level::load(path, &paths)?;
    let before = level.map().grid_size();

    match mode {
        ResizeMode::Expand => {
            let added = level
                .map_mut()
                .multidirectional_expand_towards(directions, size);
            info!("{} cells added", added.len());
        }
        ResizeMode::Reduce => {
            let removed = level
                .map_mut()
                .multidirectional_reduce_towards(directions, size);
            info!("{} occupants removed", removed.len());
        }
    }

    level.write_to(path, &paths)?;
    println!("{before} -> {}", level.map().grid_size());
    Ok(())
}
