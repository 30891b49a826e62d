use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamedata_norm::commands::{self, GenreMode};
use gamedata_norm::config::{
    AliasTable, DEFAULT_ID_FIELD, DataPaths, GAMES_FILE, GENRES_FILE, GenrePolicy, TAGS_FILE,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the data files are resolved against
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Print the report without rewriting any file
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile genres.json against the genres used in games_cleaned.json
    Genres {
        #[command(subcommand)]
        action: GenreAction,
    },
    /// Canonicalize tag names and score keys in game_tags.json
    Tags {
        #[arg(long, default_value = TAGS_FILE)]
        tags: PathBuf,

        /// JSON object of alias -> canonical spelling, replacing the built-in table
        #[arg(long)]
        aliases: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_ID_FIELD)]
        id_field: String,
    },
}

#[derive(Subcommand, Debug)]
enum GenreAction {
    /// Rebuild the list as exactly the sorted genres in use
    Sync(GenreArgs),
    /// Remove list entries no game references
    Prune(GenreArgs),
}

#[derive(clap::Args, Debug)]
struct GenreArgs {
    #[arg(long, default_value = GAMES_FILE)]
    games: PathBuf,

    #[arg(long, default_value = GENRES_FILE)]
    genres: PathBuf,

    #[arg(long, value_enum, default_value_t = GenrePolicy::Lenient)]
    policy: GenrePolicy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut paths = DataPaths::new(&args.data_dir);
    let mut stdout = io::stdout().lock();

    match args.command {
        Command::Genres { action } => {
            let (mode, genre_args) = match action {
                GenreAction::Sync(a) => (GenreMode::Sync, a),
                GenreAction::Prune(a) => (GenreMode::Prune, a),
            };
            paths.games = genre_args.games;
            paths.genres = genre_args.genres;
            commands::run_genres(&paths, mode, genre_args.policy, args.dry_run, &mut stdout)?;
        }
        Command::Tags {
            tags,
            aliases,
            id_field,
        } => {
            paths.tags = tags;
            let aliases = match aliases {
                Some(path) => AliasTable::load(&path)
                    .with_context(|| format!("loading alias table {}", path.display()))?,
                None => AliasTable::default(),
            };
            commands::run_tags(&paths, &aliases, &id_field, args.dry_run, &mut stdout)?;
        }
    }

    Ok(())
}
