//! Relic CLI - the thin command layer over the object store.
//!
//! Commands accept only fully resolved 40-hex digests where an object
//! is named; resolving branches, tags, and short hashes belongs to a
//! separate layer.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Relic - a content tracker
#[derive(Parser, Debug)]
#[command(name = "relic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new, empty repository
    Init {
        /// Where to create the repository (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Compute an object's digest, optionally storing it
    HashObject {
        /// Actually write the object into the store
        #[arg(short, long)]
        write: bool,

        /// Object kind: blob, tree, commit, or tag
        #[arg(short = 't', long = "type", default_value = "blob")]
        kind: String,

        /// The file to hash
        path: PathBuf,
    },

    /// Print the payload of a stored object
    CatFile {
        /// Expected object kind
        #[arg(value_name = "type")]
        kind: String,

        /// Digest of the object to display
        object: String,
    },

    /// Emit the ancestry of a commit as a Graphviz digraph
    Log {
        /// Digest of the commit to start from
        commit: String,
    },

    /// Pretty-print a tree object
    LsTree {
        /// Recurse into sub-trees
        #[arg(short, long)]
        recursive: bool,

        /// Digest of the tree (or a commit's tree) to list
        tree: String,
    },

    /// Materialize a commit or tree inside an empty directory
    Checkout {
        /// Digest of the commit or tree to check out
        object: String,

        /// The empty directory to materialize into
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("relic={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::HashObject { write, kind, path } => commands::hash_object(write, &kind, &path),
        Commands::CatFile { kind, object } => commands::cat_file(&kind, &object),
        Commands::Log { commit } => commands::log(&commit),
        Commands::LsTree { recursive, tree } => commands::ls_tree(recursive, &tree),
        Commands::Checkout { object, path } => commands::checkout(&object, &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
