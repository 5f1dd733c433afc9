//! Messaging platform and narrative API clients
//!
//! Three outbound surfaces:
//! - [`OpenApiClient`]: conversation/tag/team reads and team messages
//!   (header-key auth)
//! - [`DocumentPublisher`]: article publishing plus link delivery to the
//!   team chat (basic auth), behind the [`DocumentSink`] trait
//! - [`NarrativeApiClient`]: LLM analysis of the report payload, behind
//!   the [`NarrativeClient`] trait
//!
//! The traits exist so the schedule executor stays testable without
//! network access; tests supply in-memory fakes.

pub mod client;
pub mod document;
pub mod narrative;
pub mod types;

pub use client::OpenApiClient;
pub use document::{DocumentPublisher, DocumentSink};
pub use narrative::{NarrativeApiClient, NarrativeClient};
