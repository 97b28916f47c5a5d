use std::path::PathBuf;

/// Connection parameters for the football database. Built once at startup and
/// never mutated afterwards; every gateway call reads the same value.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads `FOOTDB_PATH` (after `.env` / `.env.local` have been loaded),
    /// falling back to `football.sqlite` in the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var("FOOTDB_PATH")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| "football.sqlite".to_string());
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::DbConfig;

    #[test]
    fn explicit_path_is_kept() {
        let config = DbConfig::new("/tmp/some.sqlite");
        assert_eq!(config.path.to_str(), Some("/tmp/some.sqlite"));
    }
}
