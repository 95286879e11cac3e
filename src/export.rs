use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::llm::media::decode_data_uri;
use crate::session::GeneratedHeadshot;

fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

pub fn export_filename(mime_type: &str, at: DateTime<Utc>) -> String {
    format!(
        "headshot-{}.{}",
        at.timestamp_millis(),
        extension_for_mime(mime_type)
    )
}

/// The download action: decodes the current result and writes it under a
/// timestamped filename, creating the directory if needed.
pub async fn save_headshot(result: &GeneratedHeadshot, dir: &Path) -> Result<PathBuf> {
    let (mime_type, bytes) =
        decode_data_uri(&result.data_uri).context("current result is not a saveable image")?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_filename(&mime_type, Utc::now()));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::media::encode_data_uri;

    #[test]
    fn filename_is_timestamped_with_mime_extension() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            export_filename("image/png", at),
            "headshot-1700000000123.png"
        );
        assert_eq!(
            export_filename("image/jpeg", at),
            "headshot-1700000000123.jpg"
        );
        assert_eq!(
            export_filename("application/octet-stream", at),
            "headshot-1700000000123.png"
        );
    }

    #[tokio::test]
    async fn save_writes_decoded_bytes() {
        let bytes = vec![7u8, 8, 9, 10];
        let result = GeneratedHeadshot {
            data_uri: encode_data_uri("image/png", &bytes),
            created_at: Utc::now(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = save_headshot(&result, dir.path()).await.unwrap();
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn save_rejects_non_data_uri_result() {
        let result = GeneratedHeadshot {
            data_uri: "https://example.com/result.png".to_string(),
            created_at: Utc::now(),
        };
        let dir = tempfile::tempdir().unwrap();
        assert!(save_headshot(&result, dir.path()).await.is_err());
    }
}
