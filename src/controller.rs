use rand::Rng;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::card::{self, CardViewModel};
use crate::constants::constants;
use crate::loader::{CatalogLoader, LoadOutcome};
use crate::paginate::{self, PageMarker};
use crate::pipeline::{self, FilterState};
use crate::record::{WorkRecord, WorkType};
use crate::selection::SelectionStore;
use crate::tags::{Tag, TagIndex};

// --- View state ---

/// Load lifecycle of one catalog page. User actions only ever move between
/// `Ready` states; zero filter matches is still `Ready` (with
/// `filtered_count == 0`), not `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
  Idle,
  Loading,
  Ready,
  /// Load failed or matched nothing — rendered as "no results", never as an error.
  Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
  #[default]
  Grid,
  List,
}

impl ViewMode {
  pub fn from_name(name: &str) -> Self {
    match name.to_lowercase().as_str() {
      "list" => ViewMode::List,
      _ => ViewMode::Grid,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      ViewMode::Grid => "grid",
      ViewMode::List => "list",
    }
  }
}

/// Per-page construction parameters, replacing the original's shared module
/// globals: each page gets its own controller with an explicit subject.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
  pub subject: Option<WorkType>,
  pub page_size: usize,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self { subject: None, page_size: constants().page_size }
  }
}

impl CatalogConfig {
  pub fn for_subject(subject: WorkType) -> Self {
    Self { subject: Some(subject), ..Self::default() }
  }
}

/// Everything the presentation layer needs to repaint after a state change:
/// the visible cards, the pagination bar, and the result-count labels.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
  pub state: CatalogState,
  pub view_mode: ViewMode,
  pub cards: Vec<CardViewModel>,
  pub page_buttons: Vec<PageMarker>,
  pub current_page: usize,
  pub page_count: usize,
  /// 1-based "showing X–Y" bounds; `(0, 0)` when nothing matches.
  pub item_range: (usize, usize),
  pub total: usize,
  pub filtered_count: usize,
  pub formats: Vec<String>,
  pub filter: FilterState,
}

type ChangeListener = Box<dyn FnMut(&ViewSnapshot)>;

// --- Controller ---

/// Owns one page's catalog state and drives re-filter → re-paginate →
/// re-present on every change. All user actions are synchronous; the only
/// async operation is the initial load, polled via `check_pending` in the
/// host's event loop.
pub struct CatalogController {
  config: CatalogConfig,
  records: Vec<WorkRecord>,
  tags: TagIndex,
  formats: Vec<String>,
  filter: FilterState,
  filtered: Vec<usize>,
  current_page: usize,
  view_mode: ViewMode,
  state: CatalogState,
  /// Monotonic load token: a completed load is applied only if it is still
  /// the most recently requested one, so a slow stale response can never
  /// overwrite fresher state.
  load_generation: u64,
  load_rx: Option<oneshot::Receiver<(u64, LoadOutcome)>>,
  on_change: Option<ChangeListener>,
}

impl CatalogController {
  pub fn new(config: CatalogConfig) -> Self {
    Self {
      config,
      records: Vec::new(),
      tags: TagIndex::default(),
      formats: Vec::new(),
      filter: FilterState::default(),
      filtered: Vec::new(),
      current_page: 1,
      view_mode: ViewMode::Grid,
      state: CatalogState::Idle,
      load_generation: 0,
      load_rx: None,
      on_change: None,
    }
  }

  /// Register the presentation layer's repaint callback. Fired after every
  /// state transition with a fresh snapshot.
  pub fn on_change(&mut self, listener: impl FnMut(&ViewSnapshot) + 'static) {
    self.on_change = Some(Box::new(listener));
  }

  // --- Accessors ---

  pub fn state(&self) -> CatalogState {
    self.state
  }

  pub fn view_mode(&self) -> ViewMode {
    self.view_mode
  }

  pub fn current_page(&self) -> usize {
    self.current_page
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  pub fn records(&self) -> &[WorkRecord] {
    &self.records
  }

  pub fn formats(&self) -> &[String] {
    &self.formats
  }

  pub fn tag_index(&self) -> &TagIndex {
    &self.tags
  }

  /// Tags for this page's filter-button row.
  pub fn filter_tags(&self) -> Vec<&Tag> {
    match &self.config.subject {
      Some(subject) => self.tags.by_category(subject),
      None => Vec::new(),
    }
  }

  // --- Loading ---

  /// Start (or restart) a catalog load. A newer trigger supersedes any load
  /// still in flight — the older result is dropped when it arrives.
  pub fn trigger_load(&mut self, loader: CatalogLoader) {
    self.load_generation += 1;
    let generation = self.load_generation;
    self.state = CatalogState::Loading;
    info!(generation, "catalog load triggered");

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let outcome = loader.load().await;
      let _ = tx.send((generation, outcome));
    });
    self.load_rx = Some(rx);
    self.emit();
  }

  /// Poll the in-flight load, if any. Call from the host's event loop.
  pub fn check_pending(&mut self) {
    let Some(mut rx) = self.load_rx.take() else { return };
    match rx.try_recv() {
      Ok((generation, outcome)) => {
        self.finish_load(generation, outcome);
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.load_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        warn!("load task dropped without a result");
        self.state = CatalogState::Empty;
        self.emit();
      }
    }
  }

  /// Apply a completed load, unless a newer one has been requested since.
  fn finish_load(&mut self, generation: u64, outcome: LoadOutcome) {
    if generation != self.load_generation {
      debug!(generation, current = self.load_generation, "dropping stale load result");
      return;
    }
    self.apply_load(outcome);
  }

  fn apply_load(&mut self, outcome: LoadOutcome) {
    self.tags = TagIndex::new(outcome.tags);
    self.formats = pipeline::discover_formats(&outcome.records);
    self.records = outcome.records;
    // A reload invalidates whatever the user had narrowed down to.
    self.filter = FilterState::default();
    self.current_page = 1;
    self.state = if self.records.is_empty() { CatalogState::Empty } else { CatalogState::Ready };
    self.recompute();
    self.emit();
  }

  // --- User actions ---

  /// Select a tag-name filter (or `"all"`).
  pub fn set_category(&mut self, category: &str) {
    self.filter.category = category.to_string();
    self.reset_page_and_refresh();
  }

  /// Select a file-format filter (or `"all"`).
  pub fn set_format(&mut self, format: &str) {
    self.filter.format = format.to_string();
    self.reset_page_and_refresh();
  }

  /// Update the free-text search term. A term that exactly names a known
  /// format also selects it in the format filter, keeping the format widget
  /// in sync with what the user typed.
  pub fn set_search(&mut self, term: &str) {
    self.filter.search = term.to_string();
    if let Some(format) = pipeline::matching_format(&self.formats, term) {
      self.filter.format = format.to_string();
    }
    self.reset_page_and_refresh();
  }

  /// Navigate to a page. Only valid within `[1, page_count]`; anything else
  /// is ignored. Returns whether navigation happened.
  pub fn set_page(&mut self, page: usize) -> bool {
    let pages = paginate::page_count(self.filtered.len(), self.config.page_size);
    if page < 1 || page > pages {
      return false;
    }
    self.current_page = page;
    self.emit();
    true
  }

  pub fn set_view(&mut self, mode: ViewMode) {
    self.view_mode = mode;
    self.reset_page_and_refresh();
  }

  /// The "random refresh" action: Fisher–Yates over the record order. The
  /// reorder persists for the session, not just the current view.
  pub fn shuffle(&mut self) {
    let mut rng = rand::rng();
    for i in (1..self.records.len()).rev() {
      let j = rng.random_range(0..=i);
      self.records.swap(i, j);
    }
    self.reset_page_and_refresh();
  }

  /// Count a download optimistically: bump the in-memory counter so the UI
  /// updates right away, and repaint. Session-only — the increment is never
  /// persisted back to the feed. Returns the new count, or `None` for ids
  /// the catalog doesn't know.
  pub fn record_download(&mut self, id_param: &str) -> Option<u64> {
    let record = self.records.iter_mut().find(|r| r.id.matches(id_param))?;
    record.downloads += 1;
    let downloads = record.downloads;
    debug!(id = id_param, downloads, "download counted");
    self.emit();
    Some(downloads)
  }

  /// Resolve a record for routing to its detail view, remembering it as the
  /// current selection. Returns `None` for ids the catalog doesn't know.
  pub fn select(&self, id_param: &str) -> Option<&WorkRecord> {
    let record = crate::detail::find_by_id(&self.records, id_param)?;
    if let Err(e) = SelectionStore::save(record) {
      warn!(err = %e, "failed to persist current selection");
    }
    Some(record)
  }

  // --- Recompute / notify ---

  fn reset_page_and_refresh(&mut self) {
    self.current_page = 1;
    self.recompute();
    self.emit();
  }

  fn recompute(&mut self) {
    self.filtered = pipeline::matching_indices(&self.records, &self.filter, &self.tags);
    let pages = paginate::page_count(self.filtered.len(), self.config.page_size);
    self.current_page = self.current_page.clamp(1, pages);
  }

  /// The current view, computed fresh from the immutable record snapshot.
  pub fn snapshot(&self) -> ViewSnapshot {
    let filtered: Vec<&WorkRecord> = self.filtered.iter().map(|&i| &self.records[i]).collect();
    let paged = paginate::paginate(&filtered, self.config.page_size, self.current_page);
    let cards = paged.items.iter().map(|r| card::present(r, &self.tags)).collect();

    ViewSnapshot {
      state: self.state,
      view_mode: self.view_mode,
      cards,
      page_buttons: paginate::page_buttons(paged.page_count, self.current_page),
      current_page: self.current_page,
      page_count: paged.page_count,
      item_range: paginate::item_range(filtered.len(), self.config.page_size, self.current_page),
      total: self.records.len(),
      filtered_count: filtered.len(),
      formats: self.formats.clone(),
      filter: self.filter.clone(),
    }
  }

  fn emit(&mut self) {
    if self.on_change.is_some() {
      let snapshot = self.snapshot();
      if let Some(listener) = self.on_change.as_mut() {
        listener(&snapshot);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::loader::FeedConfig;
  use crate::record::{FeedId, RawWorkRecord};
  use std::collections::HashSet;
  use std::time::Duration;

  fn make_record(json: &str) -> WorkRecord {
    serde_json::from_str::<RawWorkRecord>(json).unwrap().canonicalize()
  }

  fn building_outcome(count: usize) -> LoadOutcome {
    let records = (1..=count)
      .map(|i| {
        make_record(&format!(
          r#"{{"id": {i}, "title": "Build {i}", "type": "building", "tags": [1], "fileFormat": "mcstructure"}}"#
        ))
      })
      .collect();
    let tags =
      vec![Tag { id: FeedId::Num(1), name: "现代".into(), color: "#4a90d9".into(), category: "building".into() }];
    LoadOutcome { records, tags }
  }

  fn ready_controller(count: usize) -> CatalogController {
    let mut controller = CatalogController::new(CatalogConfig::for_subject(WorkType::Building));
    controller.apply_load(building_outcome(count));
    controller
  }

  // --- Load lifecycle ---

  #[test]
  fn load_success_transitions_to_ready() {
    let controller = ready_controller(3);
    assert_eq!(controller.state(), CatalogState::Ready);
    let snap = controller.snapshot();
    assert_eq!(snap.total, 3);
    assert_eq!(snap.filtered_count, 3);
  }

  #[test]
  fn empty_load_transitions_to_empty() {
    let mut controller = CatalogController::new(CatalogConfig::default());
    controller.apply_load(LoadOutcome::default());
    assert_eq!(controller.state(), CatalogState::Empty);
    assert_eq!(controller.snapshot().filtered_count, 0);
  }

  #[test]
  fn stale_load_results_are_dropped() {
    let mut controller = ready_controller(3);
    controller.load_generation = 5;
    // A result from generation 4 arrives after generation 5 was requested.
    controller.finish_load(4, LoadOutcome::default());
    assert_eq!(controller.state(), CatalogState::Ready);
    assert_eq!(controller.records().len(), 3);

    controller.finish_load(5, LoadOutcome::default());
    assert_eq!(controller.state(), CatalogState::Empty);
  }

  #[tokio::test]
  async fn failed_network_load_ends_empty_not_panicking() {
    let feeds = FeedConfig {
      primary_url: "http://127.0.0.1:9/content_data.json".into(),
      fallback_url: "http://127.0.0.1:9/fallback.json".into(),
      tags_url: "http://127.0.0.1:9/tags.json".into(),
      timeout: Duration::from_millis(500),
    };
    let mut controller = CatalogController::new(CatalogConfig::for_subject(WorkType::Building));
    controller.trigger_load(CatalogLoader::with_feeds(feeds, Some(WorkType::Building)));
    assert_eq!(controller.state(), CatalogState::Loading);

    for _ in 0..100 {
      controller.check_pending();
      if controller.state() != CatalogState::Loading {
        break;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(controller.state(), CatalogState::Empty);
  }

  // --- Pagination ---

  #[test]
  fn fourteen_records_paginate_twelve_then_two() {
    let mut controller = ready_controller(14);
    let snap = controller.snapshot();
    assert_eq!(snap.cards.len(), 12);
    assert_eq!(snap.page_count, 2);
    assert_eq!(snap.item_range, (1, 12));

    assert!(controller.set_page(2));
    let snap = controller.snapshot();
    assert_eq!(snap.cards.len(), 2);
    assert_eq!(snap.item_range, (13, 14));
  }

  #[test]
  fn out_of_range_navigation_is_ignored() {
    let mut controller = ready_controller(14);
    assert!(!controller.set_page(0));
    assert!(!controller.set_page(3));
    assert_eq!(controller.current_page(), 1);
  }

  #[test]
  fn filter_changes_reset_to_page_one() {
    let mut controller = ready_controller(30);
    controller.set_page(3);
    assert_eq!(controller.current_page(), 3);
    controller.set_search("build");
    assert_eq!(controller.current_page(), 1);
  }

  // --- Filtering ---

  #[test]
  fn category_filter_narrows_and_counts() {
    let mut controller = ready_controller(5);
    controller.set_category("现代");
    assert_eq!(controller.snapshot().filtered_count, 5);
    controller.set_category("不存在");
    let snap = controller.snapshot();
    assert_eq!(snap.filtered_count, 0);
    assert_eq!(snap.total, 5);
    // Zero matches is still Ready — it renders as "no results", not a failure.
    assert_eq!(controller.state(), CatalogState::Ready);
  }

  #[test]
  fn search_term_naming_a_format_selects_it() {
    let mut controller = ready_controller(3);
    controller.set_search("MCSTRUCTURE");
    assert_eq!(controller.filter().format, "mcstructure");
    assert_eq!(controller.snapshot().filtered_count, 3);
  }

  #[test]
  fn reload_resets_stale_filters() {
    let mut controller = ready_controller(5);
    controller.set_search("build 3");
    assert_eq!(controller.snapshot().filtered_count, 1);
    controller.apply_load(building_outcome(2));
    assert!(controller.filter().is_default());
    assert_eq!(controller.snapshot().filtered_count, 2);
  }

  // --- Shuffle ---

  #[test]
  fn shuffle_permutes_without_loss() {
    let mut controller = ready_controller(5);
    let before: HashSet<String> = controller.records().iter().map(|r| r.id.to_string()).collect();
    controller.shuffle();
    controller.shuffle();
    let after: HashSet<String> = controller.records().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(before, after);
    assert_eq!(controller.records().len(), 5);
    assert_eq!(controller.state(), CatalogState::Ready);
  }

  // --- Downloads ---

  #[test]
  fn download_counts_bump_in_memory_and_repaint() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut controller = ready_controller(3);
    let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    controller.on_change(move |snap| sink.borrow_mut().push(snap.cards[1].downloads));

    assert_eq!(controller.record_download("2"), Some(1));
    assert_eq!(controller.record_download("2"), Some(2));
    assert_eq!(controller.record_download("99"), None);

    let record = controller.records().iter().find(|r| r.id.matches("2")).unwrap();
    assert_eq!(record.downloads, 2);
    // Only the two known-id bumps repainted, each with the fresh count.
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }

  // --- Notifications ---

  #[test]
  fn listener_fires_on_every_state_change() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut controller = ready_controller(14);
    let seen: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    controller.on_change(move |snap| sink.borrow_mut().push((snap.current_page, snap.filtered_count)));

    controller.set_page(2);
    controller.set_search("build 1");
    let seen = seen.borrow();
    assert_eq!(seen[0], (2, 14));
    // "build 1" matches Build 1 and Build 10..14
    assert_eq!(seen[1], (1, 6));
  }

  #[test]
  fn filter_tags_come_from_the_pages_subject() {
    let controller = ready_controller(2);
    let names: Vec<_> = controller.filter_tags().into_iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["现代"]);
  }
}
