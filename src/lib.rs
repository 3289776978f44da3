//! Client-side catalog pipeline for a creative-works gallery.
//!
//! The crate covers everything between the remote JSON feed and the painted
//! page: feed ingestion with fallback ([`loader`]), tag resolution ([`tags`]),
//! the filter/search/format reduction pipeline ([`pipeline`]), pagination
//! ([`paginate`]), card and detail view models ([`card`], [`detail`]), and the
//! per-page orchestration ([`controller`]). Rendering, routing, and input
//! wiring belong to the embedding presentation layer, which calls
//! [`controller::CatalogController`] methods and repaints from the
//! [`controller::ViewSnapshot`] it receives back.

pub mod card;
pub mod constants;
pub mod controller;
pub mod detail;
pub mod loader;
pub mod paginate;
pub mod pipeline;
pub mod record;
pub mod selection;
pub mod tags;

pub use card::{CardViewModel, TagChip, present};
pub use controller::{CatalogConfig, CatalogController, CatalogState, ViewMode, ViewSnapshot};
pub use loader::{CatalogLoader, FeedConfig, FeedError, LoadOutcome};
pub use paginate::{PageMarker, Paged, paginate};
pub use pipeline::{FilterState, apply};
pub use record::{FeedId, RawWorkRecord, WorkRecord, WorkType};
pub use tags::{Tag, TagIndex};
