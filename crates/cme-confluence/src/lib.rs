//! Confluence and Jira access for the Markdown exporter.
//!
//! This crate provides read-only REST clients and the raw records they return:
//! - [`ConfluenceClient`]: Confluence REST API v1 client
//! - [`JiraClient`]: Jira REST API v2 client for issue summaries
//! - [`ContentSource`] / [`IssueTracker`]: the traits the exporter depends on
//!
//! # API Client
//!
//! ```ignore
//! use cme_confluence::{Auth, ConfluenceClient, ContentSource};
//!
//! let client = ConfluenceClient::new(
//!     "https://example.atlassian.net/wiki",
//!     Auth::from_credentials("me@example.com", "api-token", ""),
//! );
//!
//! let page = client.page(123)?;
//! println!("Page title: {}", page.title);
//! ```

mod auth;
pub use auth::Auth;

// HTTP plumbing (internal)
mod http;

// API clients
mod client;
pub use client::ConfluenceClient;
mod jira;
pub use jira::JiraClient;

// Source traits
mod source;
pub use source::{ContentSource, IssueTracker, UserLookup};

// Raw API records
pub mod types;

// Errors
pub mod error;
pub use error::ConfluenceError;

// Test doubles
#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "mock")]
pub use mock::{MockIssueTracker, MockSource};
