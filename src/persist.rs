use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::AppState;

const CACHE_DIR: &str = "footdb_terminal";
const CACHE_FILE: &str = "history.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HistoryFile {
    version: u32,
    #[serde(default)]
    queries: Vec<String>,
}

/// Best-effort: a missing, stale, or unreadable cache simply leaves the
/// history empty.
pub fn load_into_state(state: &mut AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(cache) = load_history_file(&path) else {
        return;
    };
    if cache.version != CACHE_VERSION {
        return;
    }
    state.sql_history = cache.queries;
    state.history_pos = None;
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let cache = HistoryFile {
        version: CACHE_VERSION,
        queries: state.sql_history.clone(),
    };
    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn load_history_file(path: &Path) -> Option<HistoryFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<HistoryFile>(&raw).ok()
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("FOOTDB_HISTORY_PATH") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::{load_history_file, HistoryFile, CACHE_VERSION};

    #[test]
    fn history_file_round_trips() {
        let cache = HistoryFile {
            version: CACHE_VERSION,
            queries: vec!["SELECT 1".to_string(), "DELETE FROM results".to_string()],
        };
        let json = serde_json::to_string(&cache).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, json).unwrap();

        let loaded = load_history_file(&path).expect("cache should parse");
        assert_eq!(loaded.version, CACHE_VERSION);
        assert_eq!(loaded.queries, cache.queries);
    }

    #[test]
    fn garbage_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_history_file(&path).is_none());
    }
}
