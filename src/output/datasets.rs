//! Persisted crawl targets
//!
//! The crawl result is written as a JSON array of URLs so a later run can
//! replay it without crawling the listing again.

use crate::Result;
use std::path::Path;
use url::Url;

/// Writes `targets` to `path` as pretty-printed JSON, creating parent directories
pub async fn write_datasets(path: &Path, targets: &[Url]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let urls: Vec<&str> = targets.iter().map(Url::as_str).collect();
    let json = serde_json::to_string_pretty(&urls)?;
    tokio::fs::write(path, json).await?;

    tracing::info!("Wrote {} dataset URLs to {}", targets.len(), path.display());
    Ok(())
}

/// Reads a target list previously written by [`write_datasets`]
pub async fn read_datasets(path: &Path) -> Result<Vec<Url>> {
    let content = tokio::fs::read_to_string(path).await?;
    let raw: Vec<String> = serde_json::from_str(&content)?;

    let mut targets = Vec::with_capacity(raw.len());
    for url in raw {
        targets.push(Url::parse(&url)?);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MirrorError;
    use tempfile::TempDir;

    fn urls() -> Vec<Url> {
        vec![
            Url::parse("https://data.example.com/dataset/parks").unwrap(),
            Url::parse("https://data.example.com/dataset/trees").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("datasets.json");

        write_datasets(&path, &urls()).await.unwrap();
        let read = read_datasets(&path).await.unwrap();

        assert_eq!(read, urls());
    }

    #[tokio::test]
    async fn test_written_format_is_json_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datasets.json");

        write_datasets(&path, &urls()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(raw[0], "https://data.example.com/dataset/parks");
        assert_eq!(raw.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let result = read_datasets(Path::new("/nonexistent/datasets.json")).await;
        assert!(matches!(result, Err(MirrorError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datasets.json");
        std::fs::write(&path, r#"["not a url"]"#).unwrap();

        let result = read_datasets(&path).await;
        assert!(matches!(result, Err(MirrorError::UrlParse(_))));
    }
}
