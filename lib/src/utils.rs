use std::path::PathBuf;

pub fn get_default_dbdir() -> PathBuf {
    if let Ok(path) = std::env::var("BMTREE_DB_DIR") {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(path).join("bmtree");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/bmtree");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("bmtree");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn get_config_dir() -> PathBuf {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path).join("bmtree");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/bmtree");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("bmtree");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Trimmed name, or `None` when nothing but whitespace is left
pub fn clean_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
