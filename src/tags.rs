use serde::{Deserialize, Serialize};

use crate::record::{FeedId, WorkType};

// --- Tag model ---

/// One entry of the tag dictionary feed. `category` ties the tag to a work
/// type and drives which filter buttons a page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
  pub id: FeedId,
  pub name: String,
  #[serde(default)]
  pub color: String,
  #[serde(default)]
  pub category: String,
}

/// Resolves opaque tag ids to display tags. Tolerates an empty or failed tag
/// feed: every lookup degrades to "no tags".
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
  tags: Vec<Tag>,
}

impl TagIndex {
  pub fn new(tags: Vec<Tag>) -> Self {
    Self { tags }
  }

  pub fn is_empty(&self) -> bool {
    self.tags.is_empty()
  }

  pub fn get(&self, id: &FeedId) -> Option<&Tag> {
    self.tags.iter().find(|t| &t.id == id)
  }

  /// Resolve tag ids to tags, preserving input order and silently dropping
  /// ids the dictionary doesn't know.
  pub fn resolve(&self, ids: &[FeedId]) -> Vec<&Tag> {
    ids.iter().filter_map(|id| self.get(id)).collect()
  }

  /// Resolved display names for a record's tag ids.
  pub fn resolve_names(&self, ids: &[FeedId]) -> Vec<&str> {
    self.resolve(ids).into_iter().map(|t| t.name.as_str()).collect()
  }

  /// Tags belonging to one work type, for building a page's filter-button set.
  pub fn by_category(&self, kind: &WorkType) -> Vec<&Tag> {
    self.tags.iter().filter(|t| t.category == kind.as_str()).collect()
  }
}

// --- Color contrast ---

/// Perceived brightness of a `#rrggbb` color on the 0–255 scale, using the
/// 299/587/114 weighting. `None` for anything that isn't a 6-digit hex color.
pub fn brightness(color: &str) -> Option<f64> {
  let hex = color.trim().trim_start_matches('#');
  if hex.len() < 6 || !hex.is_ascii() {
    return None;
  }
  let r = u32::from_str_radix(&hex[0..2], 16).ok()?;
  let g = u32::from_str_radix(&hex[2..4], 16).ok()?;
  let b = u32::from_str_radix(&hex[4..6], 16).ok()?;
  Some((r * 299 + g * 587 + b * 114) as f64 / 1000.0)
}

/// Whether a tag background color is light enough to need dark text.
/// Unparsable colors count as dark.
pub fn is_color_light(color: &str) -> bool {
  brightness(color).is_some_and(|b| b > 155.0)
}

/// Foreground color for text rendered over the given tag background.
pub fn tag_text_color(background: &str) -> &'static str {
  if is_color_light(background) { "#333" } else { "#fff" }
}
