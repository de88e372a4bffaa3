use owo_colors::OwoColorize;

/// Terminal styling for listings; with `color` off every method returns its input as is
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub color: bool,
}

impl Painter {
    pub fn folder(&self, name: &str) -> String {
        if self.color {
            name.bold().green().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn id(&self, id: &str) -> String {
        if self.color {
            id.bright_blue().to_string()
        } else {
            id.to_string()
        }
    }

    pub fn index(&self, index: usize) -> String {
        if self.color {
            index.to_string().bright_blue().to_string()
        } else {
            index.to_string()
        }
    }

    pub fn address(&self, address: &str) -> String {
        if self.color {
            address.yellow().to_string()
        } else {
            address.to_string()
        }
    }

    pub fn marker(&self, marker: &str) -> String {
        if self.color {
            marker.red().to_string()
        } else {
            marker.to_string()
        }
    }

    pub fn keywords(&self, keywords: &str) -> String {
        if self.color {
            keywords.blue().to_string()
        } else {
            keywords.to_string()
        }
    }
}
