use super::AppContext;
use bmtree::error::{BmtreeError, Result};
use bmtree::models::FolderId;
use std::io::{self, Write};

/// Folder given on the command line, or the root folder (created on first use)
pub fn folder_or_root(ctx: &AppContext, input: Option<&str>) -> Result<FolderId> {
    match input {
        Some(input) => ctx.repo.resolve(input),
        None => Ok(ctx.repo.ensure_root(&ctx.config.root_name)?.id),
    }
}

/// Like `folder_or_root`, but never writes: an empty store has no root to return
pub fn existing_folder_or_root(ctx: &AppContext, input: Option<&str>) -> Result<Option<FolderId>> {
    match input {
        Some(input) => ctx.repo.resolve(input).map(Some),
        None => Ok(ctx.repo.root()?.map(|root| root.id)),
    }
}

/// Convert a 1-based URL index from the command line
pub fn url_index(one_based: usize) -> Result<usize> {
    one_based
        .checked_sub(1)
        .ok_or_else(|| BmtreeError::InvalidInput("URL indexes start at 1".to_string()))
}

/// Ask a yes/no question on stdout; anything but y/yes is a no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Print rendered output, adding a final newline only when missing
pub fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}
