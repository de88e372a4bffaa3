use super::{helpers, AppContext, BmCommand};
use crate::format::{FolderSummary, FolderView};
use bmtree::error::Result;
use bmtree::tree::FolderOutline;
use serde::{Deserialize, Serialize};

/// Print a folder and everything below it, optionally limited to `depth` levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCommand {
    pub folder: Option<String>,
    pub depth: Option<usize>,
}

impl ListCommand {
    fn outline(&self, ctx: &AppContext) -> Result<Option<FolderOutline>> {
        let Some(id) = helpers::existing_folder_or_root(ctx, self.folder.as_deref())? else {
            return Ok(None);
        };
        let mut outline = ctx.repo.read_subtree(&id)?.outline();
        if let Some(depth) = self.depth {
            prune(&mut outline, depth);
        }
        Ok(Some(outline))
    }
}

fn prune(outline: &mut FolderOutline, depth: usize) {
    if depth == 0 {
        outline.folders.clear();
    } else {
        for child in &mut outline.folders {
            prune(child, depth - 1);
        }
    }
}

impl BmCommand for ListCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self.outline(ctx)? {
            Some(outline) => helpers::emit(&ctx.format.render_outline(&outline)?),
            None => eprintln!(
                "No bookmarks yet in {}.",
                ctx.repo.store().get_path().display()
            ),
        }
        Ok(())
    }
}

/// Print one folder's details and direct contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowCommand {
    pub folder: Option<String>,
}

impl BmCommand for ShowCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let Some(id) = helpers::existing_folder_or_root(ctx, self.folder.as_deref())? else {
            eprintln!("No bookmarks yet in {}.", ctx.repo.store().get_path().display());
            return Ok(());
        };
        let folder = ctx.repo.folder(&id)?;
        let children = ctx.repo.list_children(&id)?;
        let view = FolderView {
            folder: &folder,
            subfolders: children
                .folders
                .iter()
                .map(|f| FolderSummary {
                    id: f.id.as_str(),
                    name: &f.name,
                })
                .collect(),
        };
        helpers::emit(&ctx.format.render_folder(&view)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_env::TestEnv;
    use bmtree::error::BmtreeError;
    use bmtree::models::{FolderId, UrlEntry};
    use rstest::rstest;

    /// roots -> A -> B -> C, with one url in A
    fn chain(env: &TestEnv) -> Vec<FolderId> {
        let root = env.repo.ensure_root("roots").unwrap().id;
        let a = env.repo.create_folder(Some(&root), "A").unwrap().id;
        env.repo
            .add_url(&a, UrlEntry::new("Site", "https://site.example/"))
            .unwrap();
        let b = env.repo.create_folder(Some(&a), "B").unwrap().id;
        let c = env.repo.create_folder(Some(&b), "C").unwrap().id;
        vec![root, a, b, c]
    }

    fn depth_of(outline: &FolderOutline) -> usize {
        outline.folders.iter().map(|f| 1 + depth_of(f)).max().unwrap_or(0)
    }

    #[rstest]
    #[case(None, 3)]
    #[case(Some(0), 0)]
    #[case(Some(1), 1)]
    #[case(Some(2), 2)]
    #[case(Some(10), 3)]
    fn test_list_depth(#[case] depth: Option<usize>, #[case] expected: usize) {
        let env = TestEnv::new();
        chain(&env);
        let cmd = ListCommand {
            folder: None,
            depth,
        };
        let outline = cmd.outline(&env.ctx()).unwrap().unwrap();
        assert_eq!(depth_of(&outline), expected);
        assert!(cmd.execute(&env.ctx()).is_ok());
    }

    #[test]
    fn test_list_subfolder() {
        let env = TestEnv::new();
        let ids = chain(&env);
        let cmd = ListCommand {
            folder: Some(ids[1].to_string()),
            depth: None,
        };
        let outline = cmd.outline(&env.ctx()).unwrap().unwrap();
        assert_eq!(outline.name, "A");
        assert_eq!(outline.urls.len(), 1);
    }

    #[test]
    fn test_list_empty_store() {
        let env = TestEnv::new();
        let cmd = ListCommand {
            folder: None,
            depth: None,
        };
        assert!(cmd.outline(&env.ctx()).unwrap().is_none());
        assert!(cmd.execute(&env.ctx()).is_ok());
        // Listing never creates the root
        assert!(env.repo.root().unwrap().is_none());
    }

    #[test]
    fn test_show_unknown_folder() {
        let env = TestEnv::new();
        chain(&env);
        let cmd = ShowCommand {
            folder: Some("does-not-exist".to_string()),
        };
        assert!(matches!(
            cmd.execute(&env.ctx()),
            Err(BmtreeError::NotFound(_))
        ));
    }

    #[test]
    fn test_show_folder() {
        let env = TestEnv::new();
        let ids = chain(&env);
        let cmd = ShowCommand {
            folder: Some(ids[1].short().to_string()),
        };
        assert!(cmd.execute(&env.ctx()).is_ok());
    }
}
