use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub workspace_root: PathBuf,
    pub embedding_dir: PathBuf,
    pub store_path: PathBuf,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::with_root(discover_workspace_root())
    }

    /// Derives every storage location from a single workspace root.
    pub fn with_root(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let knowledge_dir = workspace_root.join("knowledge");
        let embedding_dir = knowledge_dir.join("indices").join("embedding");
        let store_path = knowledge_dir.join("objects.db");
        let log_dir = workspace_root.join("logs");
        let config_path = workspace_root.join("config.yml");

        for dir in [&embedding_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            workspace_root,
            embedding_dir,
            store_path,
            log_dir,
            config_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_workspace_root() -> PathBuf {
    if let Ok(root) = env::var("KNOWLEDGE_ROOT") {
        return PathBuf::from(root);
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("KnowledgeQuery");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("KnowledgeQuery");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    data_dir_under(Path::new(&xdg))
}

fn data_dir_under(base: &Path) -> PathBuf {
    base.join("knowledge-query")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_locations_hang_off_the_workspace_root() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_root(tmp.path());

        assert_eq!(
            paths.embedding_dir,
            tmp.path().join("knowledge/indices/embedding")
        );
        assert_eq!(paths.store_path, tmp.path().join("knowledge/objects.db"));
        assert!(paths.embedding_dir.is_dir());
        assert!(paths.log_dir.is_dir());
    }
}
