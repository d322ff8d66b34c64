use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyVisited,
}

/// Visited area names persisted as a JSON array on disk.
///
/// The file is the only copy of the set. Every mutation is a read-modify-write
/// under `write_lock`, so concurrent adds cannot drop each other's entries.
/// Writes land in a sibling temp file that is renamed over the target, so
/// unlocked readers see either the old list or the new one, never a prefix.
#[derive(Debug)]
pub struct VisitedStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl VisitedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current visited areas, sorted. Unreadable or malformed files read as empty.
    pub async fn load(&self) -> Vec<String> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read visited areas");
                return Vec::new();
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Vec::new();
        }

        match serde_json::from_slice::<Vec<String>>(&raw) {
            Ok(areas) => normalize(areas),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "visited areas file is not a JSON string array");
                Vec::new()
            }
        }
    }

    pub async fn add(&self, area_name: &str) -> Result<AddOutcome, String> {
        let _guard = self.write_lock.lock().await;
        let mut areas = self.load().await;
        if areas.iter().any(|area| area == area_name) {
            return Ok(AddOutcome::AlreadyVisited);
        }
        areas.push(area_name.to_owned());
        self.save(areas).await?;
        Ok(AddOutcome::Added)
    }

    pub async fn clear(&self) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;
        self.save(Vec::new()).await
    }

    async fn save(&self, areas: Vec<String>) -> Result<(), String> {
        let body = encode(&normalize(areas))?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, body)
            .await
            .map_err(|e| format!("write {}: {e}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| format!("replace {}: {e}", self.path.display()))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn normalize(mut areas: Vec<String>) -> Vec<String> {
    areas.sort();
    areas.dedup();
    areas
}

fn encode(areas: &[String]) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"    "));
    areas
        .serialize(&mut serializer)
        .map_err(|e| format!("encode visited areas: {e}"))?;
    Ok(body)
}
