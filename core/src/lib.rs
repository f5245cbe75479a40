//! Synchronous client for the Group resource of an admin HTTP API.
//!
//! # Overview
//! `AdminClient` builds `HttpRequest` values, hands them to an injected
//! `Transport`, and decodes the answers. Resource services sit on top of it:
//! `client.groups()` returns a `GroupService` with create, get,
//! get-by-custom-id, update, delete, list and list-all.
//!
//! # Design
//! - The transport is a constructor parameter; `UreqTransport` is the
//!   blocking implementation, tests plug in scripted ones.
//! - Cancellation is an explicit `CancellationToken` argument on every
//!   operation that reaches the network.
//! - `ResourceService` is generic over the entity, so a new collection only
//!   needs a type implementing `Resource`.
//! - DTOs are defined independently from the mock-admin crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod group;
pub mod http;
pub mod pagination;
pub mod resource;
pub mod transport;

pub use client::AdminClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use group::{Group, GroupService};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{ListOpt, DEFAULT_PAGE_SIZE};
pub use resource::{Resource, ResourceService};
pub use tokio_util::sync::CancellationToken;
pub use transport::{Transport, UreqTransport};
