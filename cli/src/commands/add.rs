use super::{helpers, AppContext, BmCommand};
use bmtree::error::Result;
use bmtree::models::UrlEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFolderCommand {
    pub name: String,
    pub parent: Option<String>,
}

impl BmCommand for AddFolderCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let parent = helpers::folder_or_root(ctx, self.parent.as_deref())?;
        let folder = ctx.repo.create_folder(Some(&parent), &self.name)?;
        eprintln!("Created folder '{}' [{}]", folder.name, folder.id.short());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUrlCommand {
    pub name: String,
    pub address: String,
    pub folder: Option<String>,
    pub icon: Option<String>,
    pub keywords: Vec<String>,
}

impl AddUrlCommand {
    fn entry(&self) -> UrlEntry {
        let mut entry = UrlEntry::new(self.name.as_str(), self.address.as_str());
        entry.icon = self.icon.clone().filter(|icon| !icon.trim().is_empty());
        entry.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        entry
    }
}

impl BmCommand for AddUrlCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let folder = helpers::folder_or_root(ctx, self.folder.as_deref())?;
        let index = ctx.repo.add_url(&folder, self.entry())?;
        eprintln!(
            "Added '{}' at index {} of folder [{}]",
            self.name.trim(),
            index + 1,
            folder.short()
        );
        Ok(())
    }
}
