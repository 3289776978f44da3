use serde::{Deserialize, Serialize};

// --- Identifiers ---

/// An identifier as it appears in the feed: some entries carry numeric ids,
/// others strings. Tag ids in a record's `tags` array have the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedId {
  Num(i64),
  Text(String),
}

impl FeedId {
  /// Loose match against a routing parameter string, so `detail?id=3` finds
  /// a record whose feed id is the number 3.
  pub fn matches(&self, param: &str) -> bool {
    match self {
      FeedId::Num(n) => n.to_string() == param,
      FeedId::Text(s) => s == param,
    }
  }
}

impl std::fmt::Display for FeedId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FeedId::Num(n) => write!(f, "{}", n),
      FeedId::Text(s) => write!(f, "{}", s),
    }
  }
}

impl Default for FeedId {
  fn default() -> Self {
    FeedId::Text(String::new())
  }
}

// --- Work type ---

/// The closed set of work types, plus a passthrough for anything the feed
/// invents later. Unknown types still render (with the fallback label) —
/// they just never match a typed page subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkType {
  Building,
  Tool,
  Music,
  Command,
  Other(String),
}

impl WorkType {
  pub fn parse(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "building" => WorkType::Building,
      "tool" => WorkType::Tool,
      "music" => WorkType::Music,
      "command" => WorkType::Command,
      _ => WorkType::Other(s.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      WorkType::Building => "building",
      WorkType::Tool => "tool",
      WorkType::Music => "music",
      WorkType::Command => "command",
      WorkType::Other(s) => s,
    }
  }

  /// User-facing type label for cards and the detail page.
  pub fn label(&self) -> &'static str {
    match self {
      WorkType::Building => "建筑",
      WorkType::Tool => "工具",
      WorkType::Music => "音乐",
      WorkType::Command => "指令",
      WorkType::Other(_) => "其他",
    }
  }
}

impl From<String> for WorkType {
  fn from(s: String) -> Self {
    WorkType::parse(&s)
  }
}

impl From<WorkType> for String {
  fn from(t: WorkType) -> Self {
    t.as_str().to_string()
  }
}

// --- Raw feed record ---

/// One element of the remote feed, exactly as published. Every field is
/// optional — the feed is hand-maintained and fields come and go per entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkRecord {
  #[serde(default)]
  pub id: Option<FeedId>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default, rename = "type")]
  pub work_type: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub tags: Option<Vec<FeedId>>,
  #[serde(default)]
  pub file_format: Option<String>,
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub file_size: Option<String>,
  #[serde(default)]
  pub building_size: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub cover_image: Option<String>,
  #[serde(default)]
  pub file_url: Option<String>,
  #[serde(default)]
  pub file_name: Option<String>,
  #[serde(default)]
  pub date: Option<String>,
  #[serde(default)]
  pub downloads: Option<i64>,
  #[serde(default)]
  pub likes: Option<i64>,
  #[serde(default)]
  pub views: Option<i64>,
}

// --- Canonical record ---

/// A canonicalized work record. `work_type` is always set and the counters
/// are always present and non-negative; everything else keeps its
/// present-or-absent feed shape. Immutable after load, except for record
/// order under `shuffle` and the ephemeral counters — download counts are
/// bumped optimistically in memory and never written back to the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
  #[serde(default)]
  pub id: FeedId,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "type")]
  pub work_type: WorkType,
  #[serde(default)]
  pub tags: Vec<FeedId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_format: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub size: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_size: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub building_size: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cover_image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(default)]
  pub downloads: u64,
  #[serde(default)]
  pub likes: u64,
  #[serde(default)]
  pub views: u64,
}

/// Treat empty strings like absent fields, matching the original feed's
/// loose "`type || category || 'building'`" fallback chain.
fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty())
}

fn clamp_counter(n: Option<i64>) -> u64 {
  n.unwrap_or(0).max(0) as u64
}

/// Normalize embedded `\n` markers into real newlines so presenters can
/// split descriptions into display lines.
fn normalize_description(s: String) -> String {
  s.replace("\\n", "\n")
}

impl RawWorkRecord {
  /// Canonicalize one raw feed entry (§ type derivation, counter defaulting).
  /// Idempotent: canonicalizing a canonical record's serialized form is a
  /// no-op.
  pub fn canonicalize(self) -> WorkRecord {
    let work_type = non_empty(self.work_type)
      .or(non_empty(self.category))
      .map(|s| WorkType::parse(&s))
      .unwrap_or(WorkType::Building);

    WorkRecord {
      id: self.id.unwrap_or_default(),
      title: self.title.unwrap_or_default(),
      author: non_empty(self.author),
      description: non_empty(self.description).map(normalize_description),
      work_type,
      tags: self.tags.unwrap_or_default(),
      file_format: non_empty(self.file_format),
      size: non_empty(self.size),
      file_size: non_empty(self.file_size),
      building_size: non_empty(self.building_size),
      image: non_empty(self.image),
      cover_image: non_empty(self.cover_image),
      file_url: non_empty(self.file_url),
      file_name: non_empty(self.file_name),
      date: non_empty(self.date),
      downloads: clamp_counter(self.downloads),
      likes: clamp_counter(self.likes),
      views: clamp_counter(self.views),
    }
  }
}

impl WorkRecord {
  /// Description split into display lines. Empty when there is no description.
  pub fn description_lines(&self) -> Vec<&str> {
    self.description.as_deref().map(|d| d.lines().collect()).unwrap_or_default()
  }
}
