use crate::format::OutputFormat;
use bmtree::config::Config;
use bmtree::error::Result;
use bmtree::{Repository, SqliteStore};

pub struct AppContext<'a> {
    pub repo: &'a Repository<SqliteStore>,
    pub config: &'a Config,
    pub format: OutputFormat,
}

pub mod add;
pub mod delete;
pub mod helpers;
pub mod import_export;
pub mod list;
pub mod moves;
pub mod search;
pub mod update;

pub trait BmCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()>;
}

/// Enum-based dispatch for commands (avoids Box<dyn BmCommand>)
pub enum CommandEnum {
    List(list::ListCommand),
    Show(list::ShowCommand),
    AddFolder(add::AddFolderCommand),
    AddUrl(add::AddUrlCommand),
    Rename(update::RenameCommand),
    EditUrl(update::EditUrlCommand),
    Move(moves::MoveCommand),
    MoveUrl(moves::MoveUrlCommand),
    Delete(delete::DeleteCommand),
    DeleteUrl(delete::DeleteUrlCommand),
    Search(search::SearchCommand),
    Import(import_export::ImportCommand),
    Export(import_export::ExportCommand),
}

impl CommandEnum {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            Self::List(cmd) => cmd.execute(ctx),
            Self::Show(cmd) => cmd.execute(ctx),
            Self::AddFolder(cmd) => cmd.execute(ctx),
            Self::AddUrl(cmd) => cmd.execute(ctx),
            Self::Rename(cmd) => cmd.execute(ctx),
            Self::EditUrl(cmd) => cmd.execute(ctx),
            Self::Move(cmd) => cmd.execute(ctx),
            Self::MoveUrl(cmd) => cmd.execute(ctx),
            Self::Delete(cmd) => cmd.execute(ctx),
            Self::DeleteUrl(cmd) => cmd.execute(ctx),
            Self::Search(cmd) => cmd.execute(ctx),
            Self::Import(cmd) => cmd.execute(ctx),
            Self::Export(cmd) => cmd.execute(ctx),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_env {
    use super::*;

    pub struct TestEnv {
        pub repo: Repository<SqliteStore>,
        pub config: Config,
    }

    impl TestEnv {
        pub fn new() -> Self {
            let store = SqliteStore::init_in_memory().expect("Failed to init in-memory store");
            Self {
                repo: Repository::new(store),
                config: Config::default(),
            }
        }

        pub fn ctx(&self) -> AppContext<'_> {
            AppContext {
                repo: &self.repo,
                config: &self.config,
                format: OutputFormat::Plain,
            }
        }
    }
}
