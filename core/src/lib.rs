//! Client-side service layer for the snippet backend.
//!
//! # Overview
//! `SnippetOperations` is the contract the UI programs against.
//! `SnippetService` implements it over HTTP; `StubSnippetOperations` is an
//! in-memory double for offline work and tests.
//!
//! # Design
//! - `SnippetClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - A `Transport` executes requests; `ReqwestTransport` is the production
//!   one. A `TokenProvider` supplies the bearer credential per operation.
//! - Backend JSON shapes are kept apart from the internal model; `mapping`
//!   is the only place field names are translated.
//! - Reads are fail-soft and resolve to safe defaults; create and delete
//!   are fail-hard and return `ApiError`.

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod file_types;
pub mod http;
pub mod mapping;
pub mod operations;
pub mod service;
pub mod stub;
pub mod token;
pub mod transport;
pub mod types;

pub use client::{Ownership, SnippetClient};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use http::{FormField, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use operations::SnippetOperations;
pub use service::SnippetService;
pub use stub::StubSnippetOperations;
pub use token::{CachedToken, StaticToken, TokenProvider};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ComplianceStatus, CreateSnippet, FileType, PaginatedSnippets, PaginatedUsers, Rule,
    RuleAction, Snippet, TestCase, TestCaseResult, UpdateSnippet, User,
};
