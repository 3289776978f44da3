use crate::record::WorkRecord;
use crate::tags::TagIndex;

/// Sentinel value meaning "no filter" for both the tag and format filters.
pub const ALL: &str = "all";

/// The three independent predicates driving the visible subset. Changing any
/// field resets pagination to page 1 (enforced by the controller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  /// `"all"` or a tag display name.
  pub category: String,
  /// `"all"` or a file format, matched case-insensitively.
  pub format: String,
  /// Free-text search term, matched as a lower-cased substring.
  pub search: String,
}

impl Default for FilterState {
  fn default() -> Self {
    Self { category: ALL.to_string(), format: ALL.to_string(), search: String::new() }
  }
}

impl FilterState {
  pub fn is_default(&self) -> bool {
    self.category == ALL && self.format == ALL && self.search.trim().is_empty()
  }
}

// --- Filter passes ---

fn matches_tag_filter(record: &WorkRecord, filter: &str, tags: &TagIndex) -> bool {
  if filter == ALL {
    return true;
  }
  // A record with no tags (or only unknown tag ids) never matches a specific tag.
  tags.resolve_names(&record.tags).iter().any(|name| *name == filter)
}

fn matches_format_filter(record: &WorkRecord, filter: &str) -> bool {
  if filter == ALL {
    return true;
  }
  record.file_format.as_deref().is_some_and(|f| f.to_lowercase() == filter.to_lowercase())
}

/// `term` must already be trimmed and lower-cased; empty means "no search".
fn matches_search(record: &WorkRecord, term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  let contains = |field: Option<&str>| field.is_some_and(|s| s.to_lowercase().contains(term));
  record.title.to_lowercase().contains(term)
    || contains(record.author.as_deref())
    || contains(record.description.as_deref())
    || contains(record.file_format.as_deref())
}

/// Indices of the records that survive all three filter passes, in input
/// order. The controller keeps indices so the record set stays borrowable.
pub fn matching_indices(records: &[WorkRecord], state: &FilterState, tags: &TagIndex) -> Vec<usize> {
  let term = state.search.trim().to_lowercase();
  records
    .iter()
    .enumerate()
    .filter(|(_, r)| {
      matches_tag_filter(r, &state.category, tags) && matches_format_filter(r, &state.format) && matches_search(r, &term)
    })
    .map(|(i, _)| i)
    .collect()
}

/// The ordered, filtered subset. Pure and stable: matches keep their input
/// order, no re-ranking.
pub fn apply<'a>(records: &'a [WorkRecord], state: &FilterState, tags: &TagIndex) -> Vec<&'a WorkRecord> {
  matching_indices(records, state, tags).into_iter().map(|i| &records[i]).collect()
}

// --- Format discovery ---

/// Distinct file formats present in the record set, sorted, for populating
/// the format selector.
pub fn discover_formats(records: &[WorkRecord]) -> Vec<String> {
  let mut formats: Vec<String> = Vec::new();
  for record in records {
    if let Some(ref f) = record.file_format
      && !formats.contains(f)
    {
      formats.push(f.clone());
    }
  }
  formats.sort();
  formats
}

/// The known format a search term exactly names, if any. Drives the
/// search-term-equals-format auto-selection of the format filter.
pub fn matching_format<'a>(formats: &'a [String], term: &str) -> Option<&'a str> {
  let term = term.trim().to_lowercase();
  if term.is_empty() {
    return None;
  }
  formats.iter().find(|f| f.to_lowercase() == term).map(|f| f.as_str())
}
