use std::path::PathBuf;
use std::sync::OnceLock;

/// XDG-compliant directory layout for pitchcoach.
///
///   Config:  $XDG_CONFIG_HOME/pitchcoach  (~/.config/pitchcoach)
///   Data:    $XDG_DATA_HOME/pitchcoach    (~/.local/share/pitchcoach)
///
/// Reference recordings live under the data dir by default, but every
/// location can be overridden from the `[storage]` section of config.toml.

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Root data directory: $XDG_DATA_HOME/pitchcoach
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pitchcoach")
    })
}

/// Root config directory: $XDG_CONFIG_HOME/pitchcoach
pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pitchcoach")
    })
}

/// Config file path: <config_dir>/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Optional phrase override file: <config_dir>/phrases.toml
pub fn phrases_file() -> PathBuf {
    config_dir().join("phrases.toml")
}

/// Reference recordings: <data_dir>/references
pub fn references_dir() -> PathBuf {
    data_dir().join("references")
}

/// Streak and score history: <data_dir>/progress.json
pub fn progress_file() -> PathBuf {
    data_dir().join("progress.json")
}

/// Rendered comparison graphs: <data_dir>/graphs
pub fn graphs_dir() -> PathBuf {
    data_dir().join("graphs")
}

/// Graph file for one analysis, e.g. `graphs/HelloMale_take1.png`.
pub fn graph_path(dir: &std::path::Path, phrase_id: &str, source: &std::path::Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording");
    dir.join(format!("{phrase_id}_{stem}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(data_dir().ends_with("pitchcoach"));
    }

    #[test]
    fn config_dir_ends_with_app_name() {
        assert!(config_dir().ends_with("pitchcoach"));
    }

    #[test]
    fn config_file_structure() {
        assert!(config_file().ends_with("config.toml"));
        assert!(phrases_file().ends_with("phrases.toml"));
    }

    #[test]
    fn storage_locations_live_under_data_dir() {
        assert!(references_dir().starts_with(data_dir()));
        assert!(progress_file().ends_with("progress.json"));
        assert!(graphs_dir().ends_with("graphs"));
    }

    #[test]
    fn graph_path_uses_phrase_and_recording_stem() {
        let path = graph_path(Path::new("/tmp/graphs"), "YesMale", Path::new("/x/take_03.wav"));
        assert_eq!(path, Path::new("/tmp/graphs/YesMale_take_03.png"));
    }
}
