use super::{helpers, AppContext, BmCommand};
use bmtree::error::Result;
use serde::{Deserialize, Serialize};

/// Re-parent a folder with everything below it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveCommand {
    pub folder: String,
    pub parent: String,
}

impl BmCommand for MoveCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx.repo.resolve(&self.folder)?;
        let parent = ctx.repo.resolve(&self.parent)?;
        let folder = ctx.repo.move_folder(&id, &parent)?;
        eprintln!("✓ Moved '{}' under [{}]", folder.name, parent.short());
        Ok(())
    }
}

/// Move one URL (1-based `index`) to the end of another folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveUrlCommand {
    pub folder: String,
    pub index: usize,
    pub target: String,
}

impl BmCommand for MoveUrlCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let from = ctx.repo.resolve(&self.folder)?;
        let to = ctx.repo.resolve(&self.target)?;
        let index = helpers::url_index(self.index)?;
        let new_index = ctx.repo.move_url(&from, index, &to)?;
        eprintln!(
            "✓ Moved url {} of [{}] to [{}] at index {}",
            self.index,
            from.short(),
            to.short(),
            new_index + 1
        );
        Ok(())
    }
}
