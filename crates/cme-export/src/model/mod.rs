//! Document model built from raw API records.
//!
//! Entities are immutable after construction. Paths, filenames and Markdown
//! are computed on demand from them, never stored.

mod attachment;
mod page;
mod space;
mod user;

pub use attachment::Attachment;
pub use page::{INACCESSIBLE_TITLE, Page, PageLocator};
pub use space::Space;
pub use user::{JiraIssue, Label, User, Version};
pub(crate) use user::clean_user_name;

use crate::error::ExportError;

/// Parse a numeric content ID.
pub(crate) fn parse_id(id: &str) -> Result<u64, ExportError> {
    id.parse().map_err(|_| ExportError::InvalidId(id.to_owned()))
}
