#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// DuckDB size string such as `"1GB"` or `"512MB"`.
    pub duckdb_memory_limit: String,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub default_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: "./data".to_string(),
            duckdb_memory_limit: "1GB".to_string(),
            cors_origins: Vec::new(),
            default_page_size: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: match lookup("COLDREACH_PORT") {
                Some(raw) => raw.parse().map_err(|e| format!("invalid port: {e}"))?,
                None => defaults.port,
            },
            data_dir: lookup("COLDREACH_DATA_DIR").unwrap_or(defaults.data_dir),
            duckdb_memory_limit: lookup("COLDREACH_DUCKDB_MEMORY")
                .unwrap_or(defaults.duckdb_memory_limit),
            cors_origins: lookup("COLDREACH_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            default_page_size: lookup("COLDREACH_DEFAULT_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|n: &i64| *n > 0)
                .unwrap_or(defaults.default_page_size),
        })
    }
}
