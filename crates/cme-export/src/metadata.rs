//! Page metadata compilation for sidecar files.
//!
//! [`MetadataEnricher`] turns raw page metadata into a `confluence_metadata`
//! document, optionally reduced to the fields useful to knowledge bases.
//! Metadata comes from a [`MetadataSource`]; [`RegistryMetadata`] builds it
//! from the registry's cached entities.

use cme_config::MetadataFormat;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::ExportError;
use crate::model::Attachment;
use crate::registry::Registry;

/// Top-level fields kept when filtering.
const WHITELIST: &[&str] = &[
    "id",
    "title",
    "type",
    "status",
    "space",
    "version",
    "created",
    "updated",
    "labels",
    "creator",
    "lastModifier",
];

/// API internals dropped at every level when filtering.
const INTERNAL_FIELDS: &[&str] = &[
    "_expandable",
    "_links",
    "ancestors",
    "children",
    "descendants",
    "container",
    "operations",
    "restrictions",
    "metadata",
    "body",
    "history",
];

const SPACE_FIELDS: &[&str] = &["key", "name", "type", "description"];
const ANCESTOR_FIELDS: &[&str] = &["id", "title", "type"];
const ATTACHMENT_FIELDS: &[&str] = &["id", "title", "mediaType", "fileSize", "comment"];

/// Keys a metadata document may consist of when it only describes
/// components of a page.
const COMPONENT_KEYS: &[&str] = &["title", "space", "ancestors", "attachments"];

const MAX_STRING_LEN: usize = 1000;

pub type Metadata = Map<String, Value>;

/// Where page metadata comes from.
pub trait MetadataSource {
    /// Complete metadata of a page, including space, ancestors and
    /// attachments.
    fn compile_metadata(&self, page_id: u64) -> Result<Metadata, ExportError>;

    fn space_details(&self, space_key: &str) -> Result<Metadata, ExportError>;

    fn ancestors(&self, page_id: u64) -> Result<Vec<Value>, ExportError>;

    fn attachments(&self, page_id: u64) -> Result<Vec<Value>, ExportError>;
}

/// Metadata built from registry entities, in REST API field naming.
pub struct RegistryMetadata<'a> {
    registry: &'a Registry,
}

impl<'a> RegistryMetadata<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }
}

impl MetadataSource for RegistryMetadata<'_> {
    fn compile_metadata(&self, page_id: u64) -> Result<Metadata, ExportError> {
        let page = self.registry.fetch_page(page_id)?;

        let mut metadata = Map::new();
        metadata.insert("id".to_owned(), json!(page.id.to_string()));
        metadata.insert("title".to_owned(), json!(page.title));
        metadata.insert("type".to_owned(), json!(page.content_type));
        metadata.insert("status".to_owned(), json!(page.status));
        metadata.insert(
            "space".to_owned(),
            Value::Object(self.space_details(&page.space.key)?),
        );

        if let Some(version) = &page.version {
            metadata.insert(
                "version".to_owned(),
                json!({
                    "number": version.number,
                    "when": version.when,
                    "friendlyWhen": version.friendly_when,
                }),
            );
            metadata.insert("updated".to_owned(), json!(version.when));
            metadata.insert(
                "lastModifier".to_owned(),
                json!({
                    "displayName": version.by.clean_name(),
                    "accountId": version.by.account_id,
                }),
            );
        }

        let labels: Vec<Value> = page
            .labels
            .iter()
            .map(|label| json!({ "name": label.name, "prefix": label.prefix }))
            .collect();
        metadata.insert("labels".to_owned(), Value::Array(labels));
        metadata.insert("ancestors".to_owned(), Value::Array(self.ancestors(page_id)?));
        metadata.insert(
            "attachments".to_owned(),
            Value::Array(self.attachments(page_id)?),
        );

        Ok(metadata)
    }

    fn space_details(&self, space_key: &str) -> Result<Metadata, ExportError> {
        let space = self.registry.space(space_key)?;
        let details = json!({
            "key": space.key,
            "name": space.name,
            "type": space.space_type,
            "description": space.description,
            "homepage": space.homepage.map(|id| id.to_string()),
        });
        Ok(into_object(details))
    }

    fn ancestors(&self, page_id: u64) -> Result<Vec<Value>, ExportError> {
        let page = self.registry.fetch_page(page_id)?;
        Ok(page
            .ancestors
            .iter()
            .map(|id| {
                let ancestor = self.registry.page(*id);
                json!({
                    "id": id.to_string(),
                    "title": ancestor.title,
                    "type": ancestor.content_type,
                })
            })
            .collect())
    }

    fn attachments(&self, page_id: u64) -> Result<Vec<Value>, ExportError> {
        let page = self.registry.fetch_page(page_id)?;
        Ok(page.attachments.iter().map(attachment_metadata).collect())
    }
}

fn attachment_metadata(attachment: &Attachment) -> Value {
    json!({
        "id": attachment.id,
        "title": attachment.title,
        "mediaType": attachment.media_type,
        "fileSize": attachment.file_size,
        "comment": attachment.comment,
        "fileId": attachment.file_id,
        "version": { "number": attachment.version.number },
        "_links": { "download": attachment.download_link },
    })
}

fn into_object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Compiles page metadata into sidecar documents.
pub struct MetadataEnricher<'a> {
    source: &'a dyn MetadataSource,
}

impl<'a> MetadataEnricher<'a> {
    pub fn new(source: &'a dyn MetadataSource) -> Self {
        Self { source }
    }

    /// Compile the metadata of a page fetched from the source.
    pub fn compile_page(
        &self,
        page_id: u64,
        format: MetadataFormat,
        filter: bool,
    ) -> Result<String, ExportError> {
        let metadata = self.source.compile_metadata(page_id)?;
        compile(&metadata, format, filter)
    }

    /// Prefix `content` with the compiled metadata block of a page.
    pub fn enrich_page(
        &self,
        page_id: u64,
        content: &str,
        format: MetadataFormat,
        filter: bool,
    ) -> Result<String, ExportError> {
        let metadata = self.source.compile_metadata(page_id)?;
        enrich_content(content, &metadata, format, filter)
    }
}

/// Check the metadata shape.
///
/// `title` is always required. `id`, `type` and `status` are required
/// unless the document only carries component keys.
pub fn validate(metadata: &Metadata) -> Result<(), ExportError> {
    if !metadata.contains_key("title") {
        return Err(ExportError::Metadata("missing 'title' field".to_owned()));
    }

    let components_only = metadata.keys().all(|k| COMPONENT_KEYS.contains(&k.as_str()));
    if !components_only {
        for field in ["id", "type", "status"] {
            if !metadata.contains_key(field) {
                return Err(ExportError::Metadata(format!("missing '{field}' field")));
            }
        }
    }

    if metadata.get("space").is_some_and(|v| !v.is_object()) {
        return Err(ExportError::Metadata("'space' must be an object".to_owned()));
    }
    for field in ["ancestors", "attachments"] {
        if metadata.get(field).is_some_and(|v| !v.is_array()) {
            return Err(ExportError::Metadata(format!("'{field}' must be an array")));
        }
    }

    Ok(())
}

/// Compile metadata into a `confluence_metadata` document.
///
/// Space, ancestors and attachments are also repeated at the top level.
/// With `filter`, every part is reduced to its whitelist. Returns `""` for
/// [`MetadataFormat::None`].
pub fn compile(
    metadata: &Metadata,
    format: MetadataFormat,
    filter: bool,
) -> Result<String, ExportError> {
    validate(metadata)?;
    if format == MetadataFormat::None {
        return Ok(String::new());
    }

    let mut rest = metadata.clone();
    let space = rest.remove("space");
    let ancestors = rest.remove("ancestors");
    let attachments = rest.remove("attachments");

    let mut base = if filter { filter_top_level(&rest) } else { rest };
    let mut document = Map::new();

    let details = [
        ("space", space, SPACE_FIELDS),
        ("ancestors", ancestors, ANCESTOR_FIELDS),
        ("attachments", attachments, ATTACHMENT_FIELDS),
    ];
    for (key, value, fields) in details {
        let Some(value) = value.filter(is_truthy) else {
            continue;
        };
        let value = if filter { filter_fields(&value, fields) } else { value };
        base.insert(key.to_owned(), value.clone());
        document.insert(key.to_owned(), value);
    }
    document.insert("confluence_metadata".to_owned(), Value::Object(base));

    match format {
        MetadataFormat::Json => Ok(serde_json::to_string_pretty(&document)? + "\n"),
        _ => Ok(serde_yaml::to_string(&document)?),
    }
}

/// Prefix `content` with compiled metadata: a `---` block for YAML, a
/// fenced `json` block for JSON.
pub fn enrich_content(
    content: &str,
    metadata: &Metadata,
    format: MetadataFormat,
    filter: bool,
) -> Result<String, ExportError> {
    let compiled = compile(metadata, format, filter)?;
    Ok(match format {
        MetadataFormat::None => content.to_owned(),
        MetadataFormat::Yaml => format!("---\n{compiled}---\n\n{content}"),
        MetadataFormat::Json => format!("```json\n{compiled}```\n\n{content}"),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(_) => true,
    }
}

fn is_internal(key: &str) -> bool {
    INTERNAL_FIELDS.contains(&key)
}

fn filter_top_level(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .filter(|(key, _)| {
            let keep = !is_internal(key) && WHITELIST.contains(&key.as_str());
            if !keep {
                debug!("Dropping metadata field {}", key);
            }
            keep
        })
        .map(|(key, value)| (key.clone(), sanitize(value)))
        .collect()
}

/// Reduce an object, or each object of an array, to `fields`. Objects left
/// empty are dropped from arrays; other array items are kept.
fn filter_fields(value: &Value, fields: &[&str]) -> Value {
    let reduce = |map: &Metadata| -> Metadata {
        map.iter()
            .filter(|(key, _)| !is_internal(key) && fields.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), sanitize(value)))
            .collect()
    };

    match value {
        Value::Object(map) => Value::Object(reduce(map)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => {
                        let reduced = reduce(map);
                        (!reduced.is_empty()).then_some(Value::Object(reduced))
                    }
                    other => Some(other.clone()),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Drop API internals recursively and truncate long strings.
fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !is_internal(key))
                .map(|(key, value)| (key.clone(), sanitize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            debug!("Truncating metadata string of {} characters", s.chars().count());
            let truncated: String = s.chars().take(MAX_STRING_LEN).collect();
            Value::String(format!("{truncated}..."))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use cme_confluence::MockSource;
    use cme_confluence::mock::{attachment_record, page_record, space_record};
    use cme_confluence::types::ContentRef;
    use pretty_assertions::assert_eq;

    use super::*;

    fn object(value: Value) -> Metadata {
        into_object(value)
    }

    fn full_metadata() -> Metadata {
        object(json!({
            "id": "123456",
            "title": "Test Page",
            "type": "page",
            "status": "current",
            "space": {"key": "TEST", "name": "Test Space", "_links": {"self": "x"}, "homepage": "1"},
            "version": {"number": 1, "_links": {"self": "v"}},
            "labels": [{"name": "test"}],
            "extensions": {"position": 2534},
            "_expandable": {"children": "/rest/api/content/123456/child"},
            "_links": {"webui": "/pages/viewpage.action?pageId=123456"},
            "body": {"storage": {"value": "<p>Content</p>"}},
            "ancestors": [{"id": "1", "title": "Home", "type": "page", "_links": {}}],
            "attachments": [{"id": "att1", "title": "a.png", "fileId": "f", "fileSize": 10}]
        }))
    }

    #[test]
    fn test_validate_requires_title() {
        let err = validate(&object(json!({"id": "1"}))).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_validate_component_documents() {
        assert!(validate(&object(json!({"title": "T", "space": {"key": "S"}}))).is_ok());

        let err = validate(&object(json!({"title": "T", "version": {}}))).unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_validate_shapes() {
        let err = validate(&object(json!({"title": "T", "space": "S"}))).unwrap_err();
        assert!(err.to_string().contains("'space' must be an object"));

        let err = validate(&object(json!({"title": "T", "ancestors": {}}))).unwrap_err();
        assert!(err.to_string().contains("'ancestors' must be an array"));
    }

    #[test]
    fn test_compile_unfiltered_keeps_everything() {
        let compiled = compile(&full_metadata(), MetadataFormat::Json, false).unwrap();
        let document: Value = serde_json::from_str(&compiled).unwrap();

        assert_eq!(document["confluence_metadata"]["_links"]["webui"], json!("/pages/viewpage.action?pageId=123456"));
        assert_eq!(document["space"], document["confluence_metadata"]["space"]);
        assert_eq!(document["ancestors"][0]["title"], json!("Home"));
    }

    #[test]
    fn test_compile_filtered() {
        let compiled = compile(&full_metadata(), MetadataFormat::Json, true).unwrap();
        let document: Value = serde_json::from_str(&compiled).unwrap();
        let base = &document["confluence_metadata"];

        for dropped in ["extensions", "_expandable", "_links", "body"] {
            assert!(base.get(dropped).is_none(), "{dropped} should be dropped");
        }
        assert_eq!(base["version"], json!({"number": 1}));
        assert_eq!(base["space"], json!({"key": "TEST", "name": "Test Space"}));
        assert_eq!(
            document["ancestors"],
            json!([{"id": "1", "title": "Home", "type": "page"}])
        );
        assert_eq!(
            document["attachments"],
            json!([{"id": "att1", "title": "a.png", "fileSize": 10}])
        );
    }

    #[test]
    fn test_empty_details_are_omitted() {
        let metadata = object(json!({
            "id": "1", "title": "T", "type": "page", "status": "current",
            "ancestors": [], "space": {}
        }));
        let compiled = compile(&metadata, MetadataFormat::Json, false).unwrap();
        let document: Value = serde_json::from_str(&compiled).unwrap();
        assert!(document.get("ancestors").is_none());
        assert!(document.get("space").is_none());
    }

    #[test]
    fn test_long_strings_truncated() {
        let long = "x".repeat(1500);
        let value = sanitize(&json!({ "description": long }));
        let description = value["description"].as_str().unwrap();
        assert_eq!(description.len(), 1003);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_compile_yaml() {
        let metadata = object(json!({"title": "T"}));
        assert_eq!(
            compile(&metadata, MetadataFormat::Yaml, false).unwrap(),
            "confluence_metadata:\n  title: T\n"
        );
        assert_eq!(compile(&metadata, MetadataFormat::None, false).unwrap(), "");
    }

    #[test]
    fn test_enrich_content() {
        let metadata = object(json!({"title": "T"}));
        assert_eq!(
            enrich_content("# Body\n", &metadata, MetadataFormat::Yaml, false).unwrap(),
            "---\nconfluence_metadata:\n  title: T\n---\n\n# Body\n"
        );
        assert_eq!(
            enrich_content("# Body\n", &metadata, MetadataFormat::Json, false).unwrap(),
            "```json\n{\n  \"confluence_metadata\": {\n    \"title\": \"T\"\n  }\n}\n```\n\n# Body\n"
        );
    }

    #[test]
    fn test_registry_metadata() {
        let mut page = page_record(3, "Guide", "DOCS");
        page.ancestors = ["1", "2"]
            .iter()
            .map(|id| ContentRef {
                id: (*id).to_owned(),
                ..ContentRef::default()
            })
            .collect();
        let mut image = attachment_record("att7", "shot.png", "f-7", "image/png");
        image.expandable.space = "/rest/api/space/DOCS".to_owned();

        let registry = Registry::new(Box::new(
            MockSource::new()
                .with_space(space_record("DOCS", "Docs", 1))
                .with_page(page_record(1, "Home", "DOCS"))
                .with_page(page_record(2, "Parent", "DOCS"))
                .with_page(page)
                .with_attachment(3, image),
        ));
        let source = RegistryMetadata::new(&registry);
        let metadata = source.compile_metadata(3).unwrap();

        assert!(validate(&metadata).is_ok());
        assert_eq!(metadata["id"], json!("3"));
        assert_eq!(metadata["space"]["name"], json!("Docs"));
        assert_eq!(
            metadata["ancestors"],
            json!([{"id": "2", "title": "Parent", "type": "page"}])
        );
        assert_eq!(metadata["attachments"][0]["fileId"], json!("f-7"));
        assert!(metadata["attachments"][0]["version"]["number"].is_u64());

        let enricher = MetadataEnricher::new(&source);
        let compiled = enricher.compile_page(3, MetadataFormat::Yaml, true).unwrap();
        assert!(compiled.starts_with("ancestors:\n"));
        assert!(compiled.contains("confluence_metadata:\n"));
        assert!(!compiled.contains("fileId"));

        let enriched = enricher.enrich_page(3, "Body\n", MetadataFormat::Yaml, true).unwrap();
        assert!(enriched.starts_with("---\nancestors:\n"));
        assert!(enriched.ends_with("---\n\nBody\n"));
    }

    #[test]
    fn test_missing_page_is_an_error() {
        let registry = Registry::new(Box::new(MockSource::new()));
        let source = RegistryMetadata::new(&registry);
        assert!(MetadataEnricher::new(&source).compile_page(9, MetadataFormat::Yaml, false).is_err());
    }
}
