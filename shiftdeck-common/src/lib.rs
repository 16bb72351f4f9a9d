//! Common types and logic shared by the Shiftdeck console front end
//!
//! Everything here is platform independent: the entity model, label
//! handling, resource manifests, the transport-agnostic cluster API client,
//! the in-memory entity store, modal form descriptors and the view-models the
//! UI renders. The browser crate only supplies a transport, durable storage
//! and the component tree.

pub mod client;
pub mod config;
pub mod convert;
pub mod forms;
pub mod labels;
pub mod manifest;
pub mod model;
pub mod paths;
pub mod sandbox;
pub mod store;
pub mod view;

pub use client::{ApiRequest, ApiResponse, ClusterClient, Method, TokenStore, Transport};
pub use config::ConsoleConfig;
pub use model::{EntityKey, ResourceKind};
pub use store::ConsoleStore;

/// Console error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not authenticated: no bearer token is set")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
