use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("boxbreath");
            Some(state_dir.join("boxbreath.log"))
        } else {
            ProjectDirs::from("", "", "boxbreath")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("boxbreath.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_names_the_app() {
        if let Some(path) = AppDirs::log_path() {
            assert_eq!(
                path.file_name().and_then(|n| n.to_str()),
                Some("boxbreath.log")
            );
        }
    }
}
