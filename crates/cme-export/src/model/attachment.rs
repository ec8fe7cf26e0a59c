use std::rc::Rc;

use cme_confluence::types::AttachmentRecord;

use super::{Space, Version, parse_id};
use crate::error::ExportError;

/// Extensions for media types where the first registered extension is not
/// the conventional one.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/msword", ".doc"),
    ("application/pdf", ".pdf"),
    ("application/vnd.ms-excel", ".xls"),
    ("application/vnd.ms-powerpoint", ".ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/json", ".json"),
    ("application/xml", ".xml"),
    ("application/zip", ".zip"),
    ("image/gif", ".gif"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/svg+xml", ".svg"),
    ("text/csv", ".csv"),
    ("text/html", ".html"),
    ("text/plain", ".txt"),
    ("video/mp4", ".mp4"),
];

/// File attached to a page.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: String,
    pub title: String,
    pub space: Rc<Space>,
    /// Ancestor chain of the owning page, the space root excluded and the
    /// owning page included.
    pub ancestors: Vec<u64>,
    pub file_size: u64,
    pub media_type: String,
    pub media_type_description: String,
    /// Content-addressed file identifier.
    pub file_id: String,
    pub collection_name: String,
    pub download_link: String,
    pub comment: String,
    pub version: Version,
}

impl Attachment {
    pub fn from_record(record: AttachmentRecord, space: Rc<Space>) -> Result<Self, ExportError> {
        let container = record.container;
        let mut chain = container
            .ancestors
            .iter()
            .map(|a| a.id.as_str())
            .chain((!container.id.is_empty()).then_some(container.id.as_str()))
            .map(parse_id)
            .collect::<Result<Vec<_>, _>>()?;
        if !chain.is_empty() {
            chain.remove(0);
        }

        let extensions = record.extensions;
        Ok(Self {
            id: record.id,
            title: record.title,
            space,
            ancestors: chain,
            file_size: extensions.file_size,
            media_type: extensions.media_type,
            media_type_description: extensions.media_type_description,
            file_id: extensions.file_id,
            collection_name: extensions.collection_name,
            download_link: record.links.download,
            comment: extensions.comment,
            version: record.version.map(Version::from_record).unwrap_or_default(),
        })
    }

    /// File extension including the leading dot, empty when unknown.
    ///
    /// draw.io sources and previews get `.drawio` / `.drawio.png` so they
    /// stay recognizable next to each other.
    pub fn extension(&self) -> String {
        if self.comment == "draw.io diagram" && self.media_type == "application/vnd.jgraph.mxfile"
        {
            return ".drawio".to_owned();
        }
        if self.comment == "draw.io preview" && self.media_type == "image/png" {
            return ".drawio.png".to_owned();
        }

        extension_for_media_type(&self.media_type)
    }

    /// File ID plus extension.
    pub fn filename(&self) -> String {
        format!("{}{}", self.file_id, self.extension())
    }
}

/// Conventional extension for a media type.
fn extension_for_media_type(media_type: &str) -> String {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(mt, _)| *mt == essence) {
        return (*ext).to_owned();
    }

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use cme_confluence::types::ContentRef;
    use pretty_assertions::assert_eq;

    use super::*;

    fn attachment(media_type: &str, comment: &str) -> Attachment {
        let mut record = AttachmentRecord {
            id: "att1".to_owned(),
            title: "file".to_owned(),
            ..AttachmentRecord::default()
        };
        media_type.clone_into(&mut record.extensions.media_type);
        comment.clone_into(&mut record.extensions.comment);
        "abc-123".clone_into(&mut record.extensions.file_id);
        Attachment::from_record(record, Rc::new(Space::default())).unwrap()
    }

    #[test]
    fn test_drawio_extensions() {
        assert_eq!(
            attachment("application/vnd.jgraph.mxfile", "draw.io diagram").extension(),
            ".drawio"
        );
        assert_eq!(
            attachment("image/png", "draw.io preview").extension(),
            ".drawio.png"
        );
    }

    #[test]
    fn test_drawio_requires_matching_media_type() {
        assert_eq!(attachment("image/png", "draw.io diagram").extension(), ".png");
    }

    #[test]
    fn test_conventional_extensions() {
        assert_eq!(attachment("image/jpeg", "").extension(), ".jpg");
        assert_eq!(attachment("application/pdf", "").extension(), ".pdf");
        assert_eq!(attachment("text/plain; charset=utf-8", "").extension(), ".txt");
    }

    #[test]
    fn test_unknown_media_type_has_no_extension() {
        assert_eq!(attachment("application/x-made-up", "").extension(), "");
        assert_eq!(attachment("", "").extension(), "");
    }

    #[test]
    fn test_filename() {
        assert_eq!(attachment("image/png", "").filename(), "abc-123.png");
    }

    #[test]
    fn test_ancestor_chain_drops_space_root() {
        let mut record = AttachmentRecord::default();
        record.container.id = "30".to_owned();
        record.container.ancestors = ["10", "20"]
            .iter()
            .map(|id| ContentRef {
                id: (*id).to_owned(),
                ..ContentRef::default()
            })
            .collect();

        let attachment = Attachment::from_record(record, Rc::new(Space::default())).unwrap();
        assert_eq!(attachment.ancestors, vec![20, 30]);
    }
}
