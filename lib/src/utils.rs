use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path).join("pocketmark");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("pocketmark");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/pocketmark");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Shorten long titles for one-line terminal output
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
