//! Catalog constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable catalog constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Feeds
  pub primary_feed_url: String,
  pub fallback_feed_url: String,
  pub tags_feed_url: String,
  pub feed_timeout_secs: u64,

  // Resource bases
  pub content_base_url: String,
  pub placeholder_image_url: String,
  pub download_base_url: String,

  // Catalog view
  pub page_size: usize,
  pub max_visible_pages: usize,
  pub related_count: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed catalog constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
