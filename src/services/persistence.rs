//! JSON file persistence for the learning registry.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::learning::LearningRegistry;
use crate::error::{EngineError, Result};
use crate::types::RegistrySnapshot;

/// Write `snapshot` to `path`, creating parent directories.
///
/// Writes to a uniquely named sibling temp file first and renames it into
/// place, so concurrent saves never share a temp file.
pub fn save_snapshot(path: &Path, snapshot: &RegistrySnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!(
        "Saved learning state to {} ({} trades)",
        path.display(),
        snapshot.trades.len()
    );
    Ok(())
}

/// Read a snapshot from `path`; `None` when the file does not exist.
pub fn load_snapshot(path: &Path) -> Result<Option<RegistrySnapshot>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let snapshot = serde_json::from_str(&content).map_err(|e| {
        EngineError::Persistence(format!("corrupt learning state {}: {}", path.display(), e))
    })?;
    Ok(Some(snapshot))
}

/// Load `path` into `registry` if present. Failures are logged, not fatal.
pub fn restore_registry(registry: &LearningRegistry, path: &Path) -> bool {
    match load_snapshot(path) {
        Ok(Some(snapshot)) => {
            info!(
                "Restored learning state from {}: {} strategies, {} trades",
                path.display(),
                snapshot.strategies.len(),
                snapshot.trades.len()
            );
            registry.restore(snapshot);
            true
        }
        Ok(None) => {
            debug!("No learning state at {}", path.display());
            false
        }
        Err(e) => {
            warn!("Failed to load learning state: {}", e);
            false
        }
    }
}

/// Save `registry` to `path`. Failures are logged, not fatal.
///
/// The snapshot is taken under the registry's save guard, so the last save
/// to finish always carries the newest state.
pub fn persist_registry(registry: &LearningRegistry, path: &Path) {
    let _guard = registry.save_guard();
    if let Err(e) = save_snapshot(path, &registry.snapshot()) {
        warn!("Failed to save learning state to {}: {}", path.display(), e);
    }
}
