use crate::commands::{
    add, delete, import_export, list, moves, search, update, AppContext, CommandEnum,
};
use crate::format::OutputFormat;
use bmtree::config::Config;
use bmtree::error::Result;
use bmtree::{Repository, SqliteStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Show the program version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Optional custom database file path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Optional custom configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable color output
    #[arg(long)]
    pub nc: bool,

    /// Show debug information
    #[arg(short = 'g', long = "debug")]
    pub debug: bool,

    /// Output format: json, yaml, toml or plain (default: colored text)
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a folder tree (the whole store by default)
    List {
        /// Folder id or unique id prefix
        folder: Option<String>,

        /// Number of folder levels to show below FOLDER
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show one folder's details and direct contents
    Show {
        /// Folder id or unique id prefix (default: root)
        folder: Option<String>,
    },

    /// Create a folder
    AddFolder {
        name: String,

        /// Parent folder (default: root)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Add a URL to a folder
    AddUrl {
        name: String,
        address: String,

        /// Target folder (default: root)
        #[arg(long)]
        folder: Option<String>,

        /// Icon URL
        #[arg(long)]
        icon: Option<String>,

        /// Keyword, may be repeated or comma-separated
        #[arg(short, long = "keyword", value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Rename a folder
    Rename { folder: String, name: String },

    /// Change fields of a URL (INDEX is 1-based, as printed by list)
    EditUrl {
        folder: String,
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        /// New icon URL; an empty string removes the icon
        #[arg(long)]
        icon: Option<String>,

        /// Replace all keywords (comma-separated)
        #[arg(short, long = "keyword", value_delimiter = ',')]
        keywords: Option<Vec<String>>,
    },

    /// Move a folder under another folder
    Move { folder: String, new_parent: String },

    /// Move a URL to the end of another folder
    MoveUrl {
        folder: String,
        index: usize,
        target: String,
    },

    /// Delete a folder and its URLs
    Delete {
        folder: String,

        /// Also delete all folders below it
        #[arg(short, long)]
        recursive: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a URL from a folder
    DeleteUrl { folder: String, index: usize },

    /// Search URL names and addresses
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Import a browser JSON bookmark export
    Import {
        /// File path to import from
        file: String,

        /// Folder to attach the import under (default: root)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Export a folder tree as browser JSON
    Export {
        /// File path to export to
        file: String,

        /// Folder to export (default: root)
        #[arg(long)]
        folder: Option<String>,

        /// Write JSON on a single line
        #[arg(long)]
        compact: bool,
    },
}

impl From<Commands> for CommandEnum {
    fn from(command: Commands) -> Self {
        match command {
            Commands::List { folder, depth } => {
                CommandEnum::List(list::ListCommand { folder, depth })
            }
            Commands::Show { folder } => CommandEnum::Show(list::ShowCommand { folder }),
            Commands::AddFolder { name, parent } => {
                CommandEnum::AddFolder(add::AddFolderCommand { name, parent })
            }
            Commands::AddUrl {
                name,
                address,
                folder,
                icon,
                keywords,
            } => CommandEnum::AddUrl(add::AddUrlCommand {
                name,
                address,
                folder,
                icon,
                keywords,
            }),
            Commands::Rename { folder, name } => {
                CommandEnum::Rename(update::RenameCommand { folder, name })
            }
            Commands::EditUrl {
                folder,
                index,
                name,
                address,
                icon,
                keywords,
            } => CommandEnum::EditUrl(update::EditUrlCommand {
                folder,
                index,
                name,
                address,
                icon,
                keywords,
            }),
            Commands::Move { folder, new_parent } => CommandEnum::Move(moves::MoveCommand {
                folder,
                parent: new_parent,
            }),
            Commands::MoveUrl {
                folder,
                index,
                target,
            } => CommandEnum::MoveUrl(moves::MoveUrlCommand {
                folder,
                index,
                target,
            }),
            Commands::Delete {
                folder,
                recursive,
                force,
            } => CommandEnum::Delete(delete::DeleteCommand {
                folder,
                recursive,
                force,
            }),
            Commands::DeleteUrl { folder, index } => {
                CommandEnum::DeleteUrl(delete::DeleteUrlCommand { folder, index })
            }
            Commands::Search { query } => CommandEnum::Search(search::SearchCommand { query }),
            Commands::Import { file, parent } => {
                CommandEnum::Import(import_export::ImportCommand { file, parent })
            }
            Commands::Export {
                file,
                folder,
                compact,
            } => CommandEnum::Export(import_export::ExportCommand {
                file,
                folder,
                compact,
            }),
        }
    }
}

pub fn handle_args(
    cli: Cli,
    repo: &Repository<SqliteStore>,
    config: &Config,
) -> Result<()> {
    let format = cli
        .format
        .as_deref()
        .map(OutputFormat::from_string)
        .unwrap_or(OutputFormat::Colored)
        .with_color(cli.nc || !console::Term::stdout().is_term());

    let ctx = AppContext {
        repo,
        config,
        format,
    };

    // Without a subcommand, print the whole tree
    let command = cli
        .command
        .map(CommandEnum::from)
        .unwrap_or(CommandEnum::List(list::ListCommand {
            folder: None,
            depth: None,
        }));
    command.execute(&ctx)
}
