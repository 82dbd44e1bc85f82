use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use futures::StreamExt;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::{datasets::Dataset, error::AppResult};

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub max_age_hours: i64,
}

/// Return the local path of a dataset file, downloading it first if it is
/// missing or older than the configured max age.
pub async fn ensure_dataset(
    http: &reqwest::Client,
    opts: &FetchOptions,
    dataset: Dataset,
) -> AppResult<PathBuf> {
    fs::create_dir_all(&opts.download_dir).await?;
    let path = opts.download_dir.join(dataset.filename());

    if fs::try_exists(&path).await? {
        let modified = fs::metadata(&path).await?.modified()?;
        if !is_stale(modified, opts.max_age_hours) {
            debug!(dataset = %dataset, path = %path.display(), "dataset file is fresh, reusing");
            return Ok(path);
        }
        debug!(dataset = %dataset, path = %path.display(), "dataset file exceeds max age, re-downloading");
        fs::remove_file(&path).await?;
    }

    let url = format!("{}/{}", opts.base_url.trim_end_matches('/'), dataset.filename());
    download(http, &url, &path).await?;
    Ok(path)
}

/// Stream a response body to `<path minus .gz>.part`, then rename into
/// place. An interrupted download never looks like a complete file.
async fn download(http: &reqwest::Client, url: &str, path: &Path) -> AppResult<()> {
    info!(url = %url, "downloading dataset");
    let resp = http.get(url).send().await?.error_for_status()?;

    let part = path.with_extension("part");
    let mut file = fs::File::create(&part).await?;
    let mut stream = resp.bytes_stream();
    let mut bytes = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    fs::rename(&part, path).await?;
    debug!(url = %url, bytes = bytes, path = %path.display(), "download complete");
    Ok(())
}

pub fn is_stale(modified: SystemTime, max_age_hours: i64) -> bool {
    let Ok(modified) = jiff::Timestamp::try_from(modified) else {
        return true;
    };
    let age = jiff::Timestamp::now().as_second().saturating_sub(modified.as_second());
    age > max_age_hours.saturating_mul(3600)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn fresh_file_is_not_stale() {
        assert!(!is_stale(SystemTime::now(), 24));
    }

    #[test]
    fn old_file_is_stale() {
        let two_days_ago = SystemTime::now() - Duration::from_secs(2 * 86_400);
        assert!(is_stale(two_days_ago, 24));
        assert!(!is_stale(two_days_ago, 72));
    }
}
