//! Delivery of finished recordings
//!
//! A sink is the "download" step: it takes the assembled artifact and puts it
//! somewhere the user can reach it.

use super::recorder::RecordingArtifact;
use super::traits::CaptureResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Receives finished recordings
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Deliver the artifact, returning where it ended up
    async fn deliver(&self, artifact: &RecordingArtifact) -> CaptureResult<PathBuf>;
}

/// Writes recordings into a directory under their download file name
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink targeting the user's download directory, if the platform has one
    pub fn downloads() -> Option<Self> {
        let dirs = directories::UserDirs::new()?;
        dirs.download_dir().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, artifact: &RecordingArtifact) -> CaptureResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(disk_file_name(&artifact.file_name()));
        tokio::fs::write(&path, &artifact.data).await?;

        tracing::info!("Saved recording ({} bytes) to {:?}", artifact.len(), path);
        Ok(path)
    }
}

/// Download name made safe for every filesystem
///
/// `:` in the timestamp is not allowed on NTFS, where it names an alternate
/// data stream.
fn disk_file_name(name: &str) -> String {
    name.replace(':', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::format::RecordingFormat;
    use chrono::{DateTime, Utc};
    use tempfile::tempdir;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("downloads"));
        let now = Utc::now();
        let artifact = RecordingArtifact {
            recording_id: Uuid::new_v4(),
            format: RecordingFormat::parse("video/webm").unwrap(),
            data: b"webm-bytes".to_vec(),
            chunk_count: 2,
            started_at: now,
            finished_at: now,
        };

        let path = sink.deliver(&artifact).await.unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("webm"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .starts_with("webcam-recording-"));
        assert_eq!(std::fs::read(&path).unwrap(), b"webm-bytes");
    }

    #[tokio::test]
    async fn test_directory_sink_strips_colons_from_disk_name() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let finished_at = DateTime::parse_from_rfc3339("2024-01-05T10:20:30.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let artifact = RecordingArtifact {
            recording_id: Uuid::new_v4(),
            format: RecordingFormat::parse("video/webm").unwrap(),
            data: b"webm-bytes".to_vec(),
            chunk_count: 1,
            started_at: finished_at,
            finished_at,
        };
        assert_eq!(
            artifact.file_name(),
            "webcam-recording-2024-01-05T10:20:30.123Z.webm"
        );

        let path = sink.deliver(&artifact).await.unwrap();

        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(!name.contains(':'));
        assert_eq!(name, "webcam-recording-2024-01-05T10-20-30.123Z.webm");
        assert!(path.exists());
    }
}
