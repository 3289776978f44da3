use rand::seq::SliceRandom;

use crate::card::{TagChip, UNKNOWN, resolve_image_url};
use crate::constants::constants;
use crate::record::{FeedId, WorkRecord, WorkType};
use crate::tags::{TagIndex, tag_text_color};

/// Detail-page view model. Like the cards, plain data only — the routing and
/// DOM work stays with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
  pub id: FeedId,
  pub title: String,
  pub author: String,
  pub type_label: &'static str,
  pub chips: Vec<TagChip>,
  pub file_size: String,
  pub format: String,
  pub date: String,
  pub description_lines: Vec<String>,
  /// Only present for buildings; the detail page hides the row otherwise.
  pub building_size: Option<String>,
  pub cover_image_url: String,
  /// `None` when the work has no downloadable file.
  pub download_url: Option<String>,
  pub downloads: u64,
  pub likes: u64,
  pub views: u64,
  /// Browser-tab title for the detail view.
  pub page_title: String,
}

/// Find the record a detail route points at. Ids are matched loosely because
/// the feed mixes numeric and string ids while the route always carries a
/// string. `None` means "route to the not-found page".
pub fn find_by_id<'a>(records: &'a [WorkRecord], id_param: &str) -> Option<&'a WorkRecord> {
  records.iter().find(|r| r.id.matches(id_param))
}

/// Content directory for a work's downloadable file. Unknown types have no
/// content directory and therefore no download link.
fn download_dir(kind: &WorkType) -> Option<&'static str> {
  match kind {
    WorkType::Building => Some("building"),
    WorkType::Tool => Some("tool"),
    WorkType::Music => Some("music"),
    WorkType::Command => Some("command"),
    WorkType::Other(_) => None,
  }
}

/// The raw-content URL of a work's file, when it has one.
pub fn download_url(record: &WorkRecord) -> Option<String> {
  let file_name = record.file_name.as_deref()?;
  let dir = download_dir(&record.work_type)?;
  Some(format!("{}{}/{}", constants().download_base_url, dir, file_name))
}

/// Up to `count` other works for the "related" strip: the current record is
/// excluded and the rest sampled in random order.
pub fn related_works<'a>(records: &'a [WorkRecord], current: &FeedId, count: usize) -> Vec<&'a WorkRecord> {
  let mut others: Vec<&WorkRecord> = records.iter().filter(|r| &r.id != current).collect();
  others.shuffle(&mut rand::rng());
  others.truncate(count);
  others
}

/// Map one record into its detail view model.
pub fn present_detail(record: &WorkRecord, tags: &TagIndex) -> DetailView {
  let building_size = if record.work_type == WorkType::Building {
    Some(record.building_size.clone().unwrap_or_else(|| UNKNOWN.to_string()))
  } else {
    None
  };
  let chips = tags
    .resolve(&record.tags)
    .into_iter()
    .map(|t| TagChip { name: t.name.clone(), background: t.color.clone(), foreground: tag_text_color(&t.color) })
    .collect();

  DetailView {
    id: record.id.clone(),
    title: record.title.clone(),
    author: record.author.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    type_label: record.work_type.label(),
    chips,
    file_size: record.file_size.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    format: record.file_format.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    date: record.date.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    description_lines: record.description_lines().into_iter().map(str::to_string).collect(),
    building_size,
    // The detail hero falls back to the card image when no cover is set.
    cover_image_url: resolve_image_url(record.cover_image.as_deref().or(record.image.as_deref())),
    download_url: download_url(record),
    downloads: record.downloads,
    likes: record.likes,
    views: record.views,
    page_title: format!("{} - 创艺方块", record.title),
  }
}
