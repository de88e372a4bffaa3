use super::{helpers, AppContext, BmCommand};
use bmtree::error::Result;
use bmtree::models::UrlPatch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCommand {
    pub folder: String,
    pub name: String,
}

impl BmCommand for RenameCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx.repo.resolve(&self.folder)?;
        let folder = ctx.repo.rename_folder(&id, &self.name)?;
        eprintln!("✓ Renamed folder [{}] to '{}'", id.short(), folder.name);
        Ok(())
    }
}

/// Change fields of one URL; `index` is 1-based
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditUrlCommand {
    pub folder: String,
    pub index: usize,
    pub name: Option<String>,
    pub address: Option<String>,
    pub icon: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl EditUrlCommand {
    fn patch(&self) -> UrlPatch {
        UrlPatch {
            name: self.name.clone(),
            address: self.address.as_ref().map(|a| a.trim().to_string()),
            icon: self.icon.as_ref().map(|i| i.trim().to_string()),
            keywords: self.keywords.as_ref().map(|keywords| {
                keywords
                    .iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            }),
        }
    }
}

impl BmCommand for EditUrlCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx.repo.resolve(&self.folder)?;
        let index = helpers::url_index(self.index)?;
        let entry = ctx.repo.update_url(&id, index, &self.patch())?;
        eprintln!("✓ Updated url {} of folder [{}]: {}", self.index, id.short(), entry.name);
        Ok(())
    }
}
