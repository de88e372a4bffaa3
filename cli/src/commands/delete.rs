use super::{helpers, AppContext, BmCommand};
use bmtree::error::{BmtreeError, Result};
use bmtree::DeletePolicy;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCommand {
    pub folder: String,
    pub recursive: bool,
    pub force: bool,
}

impl DeleteCommand {
    fn policy(&self, ctx: &AppContext) -> DeletePolicy {
        if self.recursive {
            DeletePolicy::Cascade
        } else {
            ctx.config.delete_policy
        }
    }
}

impl BmCommand for DeleteCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx.repo.resolve(&self.folder)?;
        let tree = ctx.repo.read_subtree(&id)?;
        let name = tree.root().name.clone();
        let subfolders = tree.len() - 1;
        let policy = self.policy(ctx);

        if policy == DeletePolicy::Block && subfolders > 0 {
            return Err(BmtreeError::FolderNotEmpty(name));
        }

        eprintln!("Folder to be deleted:");
        eprintln!(
            "  {} [{}] with {} subfolder(s) and {} url(s)",
            name,
            id.short(),
            subfolders,
            tree.url_count()
        );

        let confirmed = self.force || helpers::confirm(&format!("\nDelete '{}'?", name))?;
        if !confirmed {
            eprintln!("Deletion cancelled.");
            return Ok(());
        }

        let count = if subfolders > 0 {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Deleting {} folder(s)", subfolders + 1));
            let result = ctx.repo.delete_folder(&id, policy);
            pb.finish_and_clear();
            result?
        } else {
            ctx.repo.delete_folder(&id, policy)?
        };
        eprintln!("Deleted {} folder(s).", count);
        Ok(())
    }
}

/// Remove one URL (1-based `index`) from a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUrlCommand {
    pub folder: String,
    pub index: usize,
}

impl BmCommand for DeleteUrlCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx.repo.resolve(&self.folder)?;
        let removed = ctx.repo.remove_url(&id, helpers::url_index(self.index)?)?;
        eprintln!("Deleted '{}' ({})", removed.name, removed.address);
        Ok(())
    }
}
