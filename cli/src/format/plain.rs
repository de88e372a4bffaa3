use crate::format::FolderView;
use crate::output::colorize::Painter;
use bmtree::models::{FolderId, UrlEntry};
use bmtree::repository::UrlMatch;
use bmtree::tree::FolderOutline;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Human-readable layout shared by the plain and colored formats.
/// URL indexes are shown 1-based, as the CLI accepts them.
pub struct TextLayout {
    pub painter: Painter,
}

impl TextLayout {
    pub fn outline(&self, outline: &FolderOutline) -> String {
        let mut out = String::new();
        self.outline_into(&mut out, outline, 0);
        out
    }

    fn outline_into(&self, out: &mut String, folder: &FolderOutline, depth: usize) {
        let pad = INDENT.repeat(depth);
        let _ = writeln!(out, "{}{}", pad, self.folder_header(&folder.id, &folder.name));
        for (index, entry) in folder.urls.iter().enumerate() {
            self.url_line(out, &format!("{}{}", pad, INDENT), index, entry);
        }
        for child in &folder.folders {
            self.outline_into(out, child, depth + 1);
        }
    }

    fn folder_header(&self, id: &FolderId, name: &str) -> String {
        format!(
            "{} {}",
            self.painter.folder(name),
            self.painter.id(&format!("[{}]", id.short()))
        )
    }

    fn url_line(&self, out: &mut String, pad: &str, index: usize, entry: &UrlEntry) {
        let p = &self.painter;
        let number = format!("{}.", p.index(index + 1));
        let _ = writeln!(out, "{}{} {}", pad, number, entry.name);

        // Pad before painting so escape codes do not count toward the width
        let width = pad.len() + (index + 1).to_string().len() + 2;
        let marker = |m: &str| p.marker(&format!("{:>width$}", m));
        let _ = writeln!(out, "{} {}", marker(">"), p.address(&entry.address));
        if let Some(icon) = &entry.icon {
            let _ = writeln!(out, "{} {}", marker("*"), icon);
        }
        if !entry.keywords.is_empty() {
            let _ = writeln!(
                out,
                "{} {}",
                marker("#"),
                p.keywords(&entry.keywords.join(", "))
            );
        }
    }

    pub fn folder(&self, view: &FolderView) -> String {
        let folder = view.folder;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.folder_header(&folder.id, &folder.name));
        let _ = writeln!(out, "{}id:       {}", INDENT, folder.id);
        match &folder.parent_id {
            Some(parent) => {
                let _ = writeln!(out, "{}parent:   {}", INDENT, parent);
            }
            None => {
                let _ = writeln!(out, "{}parent:   (root)", INDENT);
            }
        }
        let _ = writeln!(out, "{}added:    {}", INDENT, folder.date_added.to_rfc3339());
        let _ = writeln!(out, "{}modified: {}", INDENT, folder.date_modified.to_rfc3339());

        for sub in &view.subfolders {
            let _ = writeln!(
                out,
                "{}{} {}",
                INDENT,
                self.painter.folder(sub.name),
                self.painter.id(&format!("[{}]", FolderId::from(sub.id).short()))
            );
        }
        for (index, entry) in folder.urls.iter().enumerate() {
            self.url_line(&mut out, INDENT, index, entry);
        }
        out
    }

    pub fn matches(&self, matches: &[UrlMatch]) -> String {
        let mut out = String::new();
        for found in matches {
            let _ = writeln!(
                out,
                "{}",
                self.folder_header(&found.folder_id, &found.folder_name)
            );
            self.url_line(&mut out, INDENT, found.index, &found.entry);
        }
        out
    }
}
