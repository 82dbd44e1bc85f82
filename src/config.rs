use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub download_dir: PathBuf,
    pub export_dir: PathBuf,
    pub base_url: String,
    pub max_age_hours: i64,
    pub batch_size: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinedex.db?mode=rwc".to_string());

        let download_dir = std::env::var("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_dir("cinedex"));

        let export_dir = std::env::var("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_dir("cinedex-export"));

        let base_url = std::env::var("DATASET_BASE_URL")
            .unwrap_or_else(|_| "https://datasets.imdbws.com".to_string());

        let max_age_hours: i64 =
            std::env::var("MAX_AGE_HOURS").ok().and_then(|s| s.parse().ok()).unwrap_or(24);

        let batch_size: usize =
            std::env::var("BATCH_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(100_000);

        Ok(Self { database_url, download_dir, export_dir, base_url, max_age_hours, batch_size })
    }
}

fn default_cache_dir(name: &str) -> PathBuf {
    dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join(name)
}
