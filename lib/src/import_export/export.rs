use super::browser::{self, NodeKind};
use crate::error::Result;
use crate::models::UrlEntry;
use crate::tree::{BookmarkTree, TreeFolder};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render a tree as a browser-style folder node.
///
/// Node ids are a pre-order counter starting at 1. Inside each folder the child
/// folders come first, then the URLs in list order.
pub fn export_tree(tree: &BookmarkTree) -> Value {
    let mut next_id = 0u64;
    export_folder(tree, tree.root(), &mut next_id)
}

fn export_folder(tree: &BookmarkTree, folder: &TreeFolder, next_id: &mut u64) -> Value {
    *next_id += 1;
    let id = next_id.to_string();

    let mut children: Vec<Value> = folder
        .children
        .iter()
        .filter_map(|child| tree.folder(child))
        .map(|child| export_folder(tree, child, next_id))
        .collect();
    for entry in &folder.urls {
        *next_id += 1;
        children.push(export_url(entry, *next_id));
    }

    json!({
        "type": NodeKind::Folder.tag(),
        "id": id,
        "guid": folder.id.as_str(),
        "name": folder.name,
        "date_added": browser::format_timestamp(&folder.date_added),
        "date_modified": browser::format_timestamp(&folder.date_modified),
        "children": children,
    })
}

fn export_url(entry: &UrlEntry, id: u64) -> Value {
    let mut node = json!({
        "type": NodeKind::Url.tag(),
        "id": id.to_string(),
        "name": entry.name,
        "url": entry.address,
        "date_added": browser::format_timestamp(&entry.date_added),
    });

    let mut meta = Map::new();
    if let Some(icon) = &entry.icon {
        meta.insert("icon".to_string(), Value::String(icon.clone()));
    }
    if !entry.keywords.is_empty() {
        meta.insert("keywords".to_string(), Value::String(entry.keywords.join(",")));
    }
    if !meta.is_empty() {
        node["meta_info"] = Value::Object(meta);
    }
    node
}

/// Write `tree` to `path` as JSON
pub fn export_file(tree: &BookmarkTree, path: &Path, pretty: bool) -> Result<()> {
    let value = export_tree(tree);
    let mut writer = BufWriter::new(File::create(path)?);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &value)?;
    } else {
        serde_json::to_writer(&mut writer, &value)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    log::info!(
        "Exported {} folder(s) and {} url(s) to {}",
        tree.len(),
        tree.url_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import_export::import::{import_file, import_value};
    use crate::models::UrlEntry;
    use rstest::{fixture, rstest};

    /// Top [a] -> [Left [b, c] -> [Deep], Right]
    #[fixture]
    fn tree() -> BookmarkTree {
        let mut tree = BookmarkTree::new("Top");
        let top = tree.root_id().clone();
        tree.insert_url(&top, UrlEntry::new("a", "https://a.example/"))
            .unwrap();
        let left = tree.insert_folder(&top, "Left").unwrap();
        tree.insert_url(&left, UrlEntry::new("b", "https://b.example/"))
            .unwrap();
        let mut c = UrlEntry::new("c", "https://c.example/");
        c.icon = Some("https://c.example/favicon.ico".to_string());
        c.keywords = vec!["one".to_string(), "two".to_string()];
        tree.insert_url(&left, c).unwrap();
        tree.insert_folder(&left, "Deep").unwrap();
        tree.insert_folder(&top, "Right").unwrap();
        tree
    }

    #[rstest]
    fn test_export_shape(tree: BookmarkTree) {
        let value = export_tree(&tree);

        assert_eq!(value["type"], "folder");
        assert_eq!(value["id"], "1");
        assert_eq!(value["name"], "Top");
        assert_eq!(value["guid"], tree.root_id().as_str());

        let children = value["children"].as_array().unwrap();
        let kinds: Vec<_> = children.iter().map(|c| c["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["folder", "folder", "url"]);
        assert_eq!(children[0]["name"], "Left");
        assert_eq!(children[1]["name"], "Right");
        assert_eq!(children[2]["url"], "https://a.example/");
    }

    #[rstest]
    fn test_export_ids_are_preorder(tree: BookmarkTree) {
        let value = export_tree(&tree);
        let left = &value["children"][0];
        assert_eq!(left["id"], "2");
        assert_eq!(left["children"][0]["name"], "Deep");
        assert_eq!(left["children"][0]["id"], "3");
        assert_eq!(left["children"][1]["id"], "4");
        assert_eq!(left["children"][2]["id"], "5");
        assert_eq!(value["children"][1]["id"], "6");
        assert_eq!(value["children"][2]["id"], "7");
    }

    #[rstest]
    fn test_export_timestamps(tree: BookmarkTree) {
        let value = export_tree(&tree);
        let expected = browser::format_timestamp(&tree.root().date_added);
        assert_eq!(value["date_added"], expected.as_str());
    }

    #[rstest]
    fn test_meta_info_only_when_present(tree: BookmarkTree) {
        let value = export_tree(&tree);
        let left = &value["children"][0]["children"];
        assert!(left[1].get("meta_info").is_none());
        assert_eq!(left[2]["meta_info"]["keywords"], "one,two");
        assert_eq!(left[2]["meta_info"]["icon"], "https://c.example/favicon.ico");
    }

    #[rstest]
    fn test_round_trip_is_isomorphic(tree: BookmarkTree) {
        let first = import_value(&export_tree(&tree)).unwrap();
        assert!(first.is_isomorphic(&tree));

        let second = import_value(&export_tree(&first)).unwrap();
        assert!(second.is_isomorphic(&first));

        let deep = first
            .walk()
            .into_iter()
            .find(|(_, f)| f.name == "Left")
            .map(|(_, f)| f.urls[1].clone())
            .unwrap();
        assert_eq!(deep.keywords, vec!["one", "two"]);
        assert_eq!(deep.date_added.timestamp_micros(), {
            let left = tree.children(tree.root_id()).unwrap()[0];
            left.urls[1].date_added.timestamp_micros()
        });
    }

    #[test]
    fn test_keyword_list_survives_round_trip() {
        let mut tree = BookmarkTree::new("Top");
        let top = tree.root_id().clone();
        let mut entry = UrlEntry::new("Rust", "https://www.rust-lang.org/");
        entry.keywords = vec![
            "systems programming".to_string(),
            "rust-lang".to_string(),
            "docs.rs".to_string(),
        ];
        tree.insert_url(&top, entry.clone()).unwrap();

        let imported = import_value(&export_tree(&tree)).unwrap();
        assert_eq!(imported.root().urls[0].keywords, entry.keywords);
    }

    #[rstest]
    fn test_export_file(tree: BookmarkTree) {
        let dir = tempfile::tempdir().unwrap();
        let pretty = dir.path().join("pretty.json");
        let compact = dir.path().join("compact.json");

        export_file(&tree, &pretty, true).unwrap();
        export_file(&tree, &compact, false).unwrap();

        let pretty_text = std::fs::read_to_string(&pretty).unwrap();
        let compact_text = std::fs::read_to_string(&compact).unwrap();
        assert!(pretty_text.lines().count() > 1);
        assert_eq!(compact_text.lines().count(), 1);

        assert!(import_file(&pretty).unwrap().is_isomorphic(&tree));
        assert!(import_file(&compact).unwrap().is_isomorphic(&tree));
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tree = BookmarkTree::new("Top");
        let result = export_file(&tree, &dir.path().join("no/such/dir.json"), true);
        assert!(matches!(result, Err(crate::error::BmtreeError::Io(_))));
    }
}
