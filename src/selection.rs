use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::record::WorkRecord;

/// Persists the currently selected work between the catalog and detail views
/// — the session-storage analog of the browser original. Only ever holds one
/// record; anything beyond that is out of scope.
pub struct SelectionStore;

impl SelectionStore {
  fn file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "blockshelf").map(|dirs| dirs.data_dir().join("selection.toml"))
  }

  /// The saved selection, if any. Unreadable or stale files degrade to `None`.
  pub fn load() -> Option<WorkRecord> {
    let file = Self::file()?;
    let content = std::fs::read_to_string(file).ok()?;
    toml::from_str(&content).ok()
  }

  pub fn save(record: &WorkRecord) -> Result<()> {
    let file = Self::file().context("no usable data directory for the selection store")?;
    if let Some(dir) = file.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let content = toml::to_string(record).context("serializing selected work")?;
    std::fs::write(&file, content).with_context(|| format!("writing {}", file.display()))?;
    Ok(())
  }

  pub fn clear() {
    if let Some(file) = Self::file() {
      let _ = std::fs::remove_file(file);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::RawWorkRecord;

  #[test]
  fn selected_record_round_trips_through_toml() {
    let record: WorkRecord = serde_json::from_str::<RawWorkRecord>(
      r#"{"id": "b-01", "title": "Dream Castle", "type": "building", "tags": [1, "featured"], "downloads": 7}"#,
    )
    .unwrap()
    .canonicalize();

    let content = toml::to_string(&record).unwrap();
    let restored: WorkRecord = toml::from_str(&content).unwrap();
    assert_eq!(restored, record);
  }
}
