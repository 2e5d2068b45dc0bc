use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("badge-shell"))
}

pub fn settings_path() -> Result<PathBuf> {
    config_dir().map(|p| p.join("settings.toml"))
}

pub fn state_path() -> Result<PathBuf> {
    config_dir().map(|p| p.join("state.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_correct_suffixes() {
        let cases: Vec<(Result<PathBuf>, &str)> = vec![
            (config_dir(), "badge-shell"),
            (settings_path(), "badge-shell/settings.toml"),
            (state_path(), "badge-shell/state.json"),
        ];

        for (result, expected_suffix) in cases {
            let path = result.unwrap();
            assert!(path.ends_with(expected_suffix), "path {:?} should end with {}", path, expected_suffix);
        }
    }
}
