use super::{helpers, AppContext, BmCommand};
use bmtree::error::{BmtreeError, Result};
use bmtree::import_export;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Import a browser JSON export (whole bookmark file or a single folder node)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCommand {
    pub file: String,
    pub parent: Option<String>,
}

impl BmCommand for ImportCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let parent = self
            .parent
            .as_deref()
            .map(|p| ctx.repo.resolve(p))
            .transpose()?;

        let pb = spinner(format!("Importing from {}", self.file));
        let result = import_export::import_file(Path::new(&self.file))
            .and_then(|tree| ctx.repo.import_tree(&tree, parent.as_ref()));
        pb.finish_and_clear();
        let summary = result?;

        eprintln!(
            "✓ Successfully imported {} folder(s) and {} url(s) from {} [{}]",
            summary.folders,
            summary.urls,
            self.file,
            summary.root.short()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCommand {
    pub file: String,
    pub folder: Option<String>,
    pub compact: bool,
}

impl BmCommand for ExportCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = helpers::existing_folder_or_root(ctx, self.folder.as_deref())?
            .ok_or_else(|| BmtreeError::NotFound("no bookmarks to export".to_string()))?;
        let tree = ctx.repo.read_subtree(&id)?;
        let pretty = ctx.config.pretty_export && !self.compact;
        import_export::export_file(&tree, Path::new(&self.file), pretty)?;
        eprintln!(
            "✓ Exported {} folder(s) and {} url(s) to {}",
            tree.len(),
            tree.url_count(),
            self.file
        );
        Ok(())
    }
}
