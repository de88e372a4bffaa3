use super::{helpers, AppContext, BmCommand};
use bmtree::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCommand {
    pub query: Vec<String>,
}

impl BmCommand for SearchCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let query = self.query.join(" ");
        log::debug!("Searching for: {:?}", query);
        let matches = ctx.repo.find_urls(&query)?;

        if matches.is_empty() {
            eprintln!("No bookmarks found matching '{}'.", query.trim());
            return Ok(());
        }
        helpers::emit(&ctx.format.render_matches(&matches)?);
        Ok(())
    }
}
