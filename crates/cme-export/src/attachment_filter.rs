//! Extension-based attachment filter.

use cme_config::AttachmentFilterConfig;
use tracing::debug;

use crate::model::Attachment;

const DEFAULT_ALLOWED: &[&str] = &[".txt", ".md", ".json", ".yaml", ".yml", ".csv"];
const DEFAULT_BLOCKED: &[&str] = &[".exe", ".bat", ".sh", ".dll", ".so", ".dmg", ".iso"];

/// Decides which attachments are exported.
///
/// Blocked extensions win over allowed ones; extensions on neither list
/// fall back to the built-in defaults and are allowed when unknown.
#[derive(Debug, Clone, Default)]
pub struct AttachmentFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
}

impl AttachmentFilter {
    pub fn new(config: &AttachmentFilterConfig) -> Self {
        Self {
            allowed: normalize(&config.allowed_extensions),
            blocked: normalize(&config.blocked_extensions),
        }
    }

    pub fn is_allowed(&self, attachment: &Attachment) -> bool {
        let Some(extension) = extension(attachment) else {
            return true;
        };

        let allowed = if self.blocked.contains(&extension) {
            false
        } else if self.allowed.contains(&extension) {
            true
        } else {
            DEFAULT_ALLOWED.contains(&extension.as_str())
                || !DEFAULT_BLOCKED.contains(&extension.as_str())
        };

        if !allowed {
            debug!("Attachment {} blocked by extension {}", attachment.title, extension);
        }
        allowed
    }

    /// Split attachments into `(allowed, blocked)`.
    pub fn partition<'a>(
        &self,
        attachments: impl IntoIterator<Item = &'a Attachment>,
    ) -> (Vec<&'a Attachment>, Vec<&'a Attachment>) {
        attachments.into_iter().partition(|a| self.is_allowed(a))
    }
}

fn normalize(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().to_ascii_lowercase())
        .collect()
}

/// Lowercased extension with the leading dot, from the title first.
fn extension(attachment: &Attachment) -> Option<String> {
    if let Some((_, ext)) = attachment.title.rsplit_once('.') {
        return Some(format!(".{}", ext.to_ascii_lowercase()));
    }

    let computed = attachment.extension();
    let ext = computed.rsplit('.').next().unwrap_or_default();
    (!ext.is_empty()).then(|| format!(".{}", ext.to_ascii_lowercase()))
}
