use crate::{
    format::{
        json::JsonOutput, plain::TextLayout, toml::TomlOutput, traits::StructuredFormat,
        yaml::YamlOutput,
    },
    output::colorize::Painter,
};
use bmtree::error::Result;
use bmtree::models::FolderDocument;
use bmtree::repository::UrlMatch;
use bmtree::tree::FolderOutline;
use serde::Serialize;

pub mod json;
pub mod plain;
pub mod toml;
pub mod traits;
pub mod yaml;

/// One folder with its direct contents, as shown by `show`
#[derive(Debug, Serialize)]
pub struct FolderView<'a> {
    pub folder: &'a FolderDocument,
    pub subfolders: Vec<FolderSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FolderSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// Search results; TOML cannot serialize a bare list
#[derive(Serialize)]
struct MatchList<'a> {
    matches: &'a [UrlMatch],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
    Plain,
    Colored,
}

impl OutputFormat {
    pub fn from_string(format: &str) -> Self {
        match format {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            "toml" => OutputFormat::Toml,
            "plain" | "text" => OutputFormat::Plain,
            _ => OutputFormat::Colored,
        }
    }

    /// `Colored` falls back to `Plain` when colors are disabled
    pub fn with_color(self, no_color: bool) -> Self {
        match self {
            OutputFormat::Colored if no_color => OutputFormat::Plain,
            other => other,
        }
    }

    fn structured<T: Serialize>(self, value: &T) -> Option<Result<String>> {
        match self {
            OutputFormat::Json => Some(JsonOutput(value).render()),
            OutputFormat::Yaml => Some(YamlOutput(value).render()),
            OutputFormat::Toml => Some(TomlOutput(value).render()),
            OutputFormat::Plain | OutputFormat::Colored => None,
        }
    }

    fn layout(self) -> TextLayout {
        TextLayout {
            painter: Painter {
                color: self == OutputFormat::Colored,
            },
        }
    }

    pub fn render_outline(self, outline: &FolderOutline) -> Result<String> {
        self.structured(outline)
            .unwrap_or_else(|| Ok(self.layout().outline(outline)))
    }

    pub fn render_folder(self, view: &FolderView) -> Result<String> {
        self.structured(view)
            .unwrap_or_else(|| Ok(self.layout().folder(view)))
    }

    pub fn render_matches(self, matches: &[UrlMatch]) -> Result<String> {
        if self == OutputFormat::Toml {
            return TomlOutput(&MatchList { matches }).render();
        }
        self.structured(&matches)
            .unwrap_or_else(|| Ok(self.layout().matches(matches)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmtree::models::{FolderId, UrlEntry};
    use rstest::{fixture, rstest};

    #[fixture]
    fn outline() -> FolderOutline {
        FolderOutline {
            id: FolderId::from("11111111-aaaa-bbbb-cccc-000000000000"),
            name: "Top".to_string(),
            urls: vec![UrlEntry::new("Rust", "https://www.rust-lang.org/")],
            folders: vec![FolderOutline {
                id: FolderId::from("22222222-aaaa-bbbb-cccc-000000000000"),
                name: "Sub".to_string(),
                urls: Vec::new(),
                folders: Vec::new(),
            }],
        }
    }

    #[rstest]
    #[case("json", OutputFormat::Json)]
    #[case("yaml", OutputFormat::Yaml)]
    #[case("yml", OutputFormat::Yaml)]
    #[case("toml", OutputFormat::Toml)]
    #[case("plain", OutputFormat::Plain)]
    #[case("anything", OutputFormat::Colored)]
    fn test_from_string(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(OutputFormat::from_string(input), expected);
    }

    #[test]
    fn test_no_color_falls_back_to_plain() {
        assert_eq!(OutputFormat::Colored.with_color(true), OutputFormat::Plain);
        assert_eq!(OutputFormat::Colored.with_color(false), OutputFormat::Colored);
        assert_eq!(OutputFormat::Json.with_color(true), OutputFormat::Json);
    }

    #[rstest]
    fn test_json_outline(outline: FolderOutline) {
        let text = OutputFormat::Json.render_outline(&outline).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "Top");
        assert_eq!(value["folders"][0]["name"], "Sub");
        assert_eq!(value["urls"][0]["address"], "https://www.rust-lang.org/");
    }

    #[rstest]
    fn test_yaml_outline(outline: FolderOutline) {
        let text = OutputFormat::Yaml.render_outline(&outline).unwrap();
        assert!(text.contains("name: Top"));
        assert!(text.contains("name: Sub"));
    }

    #[rstest]
    fn test_toml_outline(outline: FolderOutline) {
        let text = OutputFormat::Toml.render_outline(&outline).unwrap();
        assert!(text.contains("name = \"Top\""));
        assert!(text.contains("Sub"));
    }

    #[test]
    fn test_toml_matches_are_wrapped() {
        let matches = vec![UrlMatch {
            folder_id: FolderId::from("11111111-aaaa-bbbb-cccc-000000000000"),
            folder_name: "Top".to_string(),
            index: 0,
            entry: UrlEntry::new("Rust", "https://www.rust-lang.org/"),
        }];
        let text = OutputFormat::Toml.render_matches(&matches).unwrap();
        assert!(text.contains("matches"));
        assert!(text.contains("folder_name = \"Top\""));
    }

    #[rstest]
    fn test_plain_outline_has_no_escapes(outline: FolderOutline) {
        let text = OutputFormat::Plain.render_outline(&outline).unwrap();
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("Top"));
        assert!(text.contains("https://www.rust-lang.org/"));
    }
}
