use crate::constants::constants;
use crate::record::{FeedId, WorkRecord, WorkType};
use crate::tags::{TagIndex, tag_text_color};

/// Fallback string for display fields the feed left out.
pub const UNKNOWN: &str = "未知";

/// A resolved tag label ready to paint: display name plus background and
/// contrast-picked foreground colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
  pub name: String,
  pub background: String,
  pub foreground: &'static str,
}

/// Everything a card needs to render, with no DOM types anywhere. Built by
/// [`present`]; the presentation layer only interpolates these strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardViewModel {
  pub id: FeedId,
  pub title: String,
  pub author: String,
  pub type_label: &'static str,
  pub chips: Vec<TagChip>,
  pub size: String,
  /// Only meaningful for buildings; `None` hides the stat entirely.
  pub building_size: Option<String>,
  pub format: String,
  pub image_url: String,
  pub description_lines: Vec<String>,
  pub downloads: u64,
  pub likes: u64,
  pub views: u64,
}

/// Resolve a record's card image: placeholder when absent or blank, content
/// CDN prefix for relative paths, absolute URLs untouched.
pub fn resolve_image_url(image: Option<&str>) -> String {
  match image.map(str::trim).filter(|s| !s.is_empty()) {
    None => constants().placeholder_image_url.clone(),
    Some(url) if url.starts_with("http") => url.to_string(),
    Some(path) => format!("{}{}", constants().content_base_url, path),
  }
}

fn chips_for(record: &WorkRecord, tags: &TagIndex) -> Vec<TagChip> {
  tags
    .resolve(&record.tags)
    .into_iter()
    .map(|t| TagChip { name: t.name.clone(), background: t.color.clone(), foreground: tag_text_color(&t.color) })
    .collect()
}

/// Map one record into its card view model. Pure: same record and tag
/// dictionary in, same card out.
pub fn present(record: &WorkRecord, tags: &TagIndex) -> CardViewModel {
  let building_size = if record.work_type == WorkType::Building {
    Some(record.building_size.clone().unwrap_or_else(|| UNKNOWN.to_string()))
  } else {
    None
  };

  CardViewModel {
    id: record.id.clone(),
    title: record.title.clone(),
    author: record.author.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    type_label: record.work_type.label(),
    chips: chips_for(record, tags),
    size: record.size.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    building_size,
    format: record.file_format.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    image_url: resolve_image_url(record.image.as_deref()),
    description_lines: record.description_lines().into_iter().map(str::to_string).collect(),
    downloads: record.downloads,
    likes: record.likes,
    views: record.views,
  }
}
