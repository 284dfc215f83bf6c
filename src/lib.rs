//! Client-side core for a clinical records management UI.
//!
//! This crate owns everything between the REST wire and the rendering
//! layer: normalizing transport failures into user-facing errors,
//! encoding filter state to and from URL query strings, issuing
//! list/create/update/delete/stats requests with superseding
//! cancellation, validating form drafts, and driving the records-feed
//! state machine that a view renders from.
//!
//! Rendering, routing, and notifications stay outside; embedders wire
//! [`RecordsController`], [`RecordsFeed`], and [`StatsFeed`] to their
//! own view layer.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod models;
pub mod query;
pub mod validate;

pub use api::RecordsApi;
pub use config::ClientConfig;
pub use controller::{MemoryUrlState, RecordsController, UrlState};
pub use error::ApiError;
pub use fetch::{
    CancelHandle, CancelSource, Debouncer, FeedSnapshot, RecordsFeed, StatsFeed, StatsSnapshot,
};
pub use models::{
    ListResponse, PageInfo, Record, RecordDraft, RecordPayload, RecordStats, RecordStatus,
    RecordsList, StatusCounts,
};
pub use query::{FilterState, SortField, SortOrder, StatusFilter};
pub use validate::{field_errors_from_api, validate_draft, FieldErrors};
