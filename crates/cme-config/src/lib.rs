//! Configuration management for the Confluence Markdown exporter.
//!
//! Parses `cme.toml` configuration files with serde. The file is located from
//! an explicit path, the `CME_CONFIG_PATH` environment variable, or by
//! searching the current directory and its parents.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.url`, `confluence.username`, `confluence.api_token`, `confluence.pat`
//! - `jira.url`, `jira.username`, `jira.api_token`, `jira.pat`
//! - `export.output_path`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the export output directory.
    pub output_path: Option<PathBuf>,
    /// Override breadcrumb rendering.
    pub page_breadcrumbs: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cme.toml";

/// Environment variable pointing at an explicit configuration file.
const CONFIG_PATH_ENV: &str = "CME_CONFIG_PATH";

/// Default template for exported page paths.
pub const DEFAULT_PAGE_PATH: &str = "{space_name}/{homepage_title}/{ancestor_titles}/{page_title}.md";

/// Default template for exported attachment paths.
pub const DEFAULT_ATTACHMENT_PATH: &str =
    "{space_name}/attachments/{attachment_file_id}{attachment_extension}";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection (required for exports).
    pub confluence: Option<ApiConfig>,
    /// Jira connection (optional, enables issue summaries).
    pub jira: Option<ApiConfig>,
    /// Export settings.
    pub export: ExportConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults_in(Path::new("."))
    }
}

/// Connection details for an Atlassian REST API.
///
/// Authentication uses a Personal Access Token when `pat` is set, otherwise
/// `username` + `api_token`. Leaving all three empty means anonymous access.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Instance base URL (e.g. `https://example.atlassian.net/wiki`).
    pub url: String,
    /// Username or email for basic authentication.
    #[serde(default)]
    pub username: String,
    /// API token for basic authentication.
    #[serde(default)]
    pub api_token: String,
    /// Personal Access Token (bearer authentication).
    #[serde(default)]
    pub pat: String,
}

impl ApiConfig {
    /// Validate that the connection is usable.
    ///
    /// `section` is the TOML section name used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL is invalid or only half
    /// of the username/token pair is set.
    pub fn validate(&self, section: &str) -> Result<(), ConfigError> {
        require_non_empty(&self.url, &format!("{section}.url"))?;
        require_http_url(&self.url, &format!("{section}.url"))?;
        if self.pat.is_empty() && self.username.is_empty() != self.api_token.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{section}.username and {section}.api_token must be set together"
            )));
        }
        Ok(())
    }

    /// Expand environment variables in all fields.
    fn expand_env_vars(&mut self, section: &str) -> Result<(), ConfigError> {
        for (name, value) in [
            ("url", &mut self.url),
            ("username", &mut self.username),
            ("api_token", &mut self.api_token),
            ("pat", &mut self.pat),
        ] {
            expand::expand_field(value, &format!("{section}.{name}"))?;
        }
        Ok(())
    }
}

/// How hrefs to exported files are written into Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrefStyle {
    /// Relative to the directory of the referring page.
    #[default]
    Relative,
    /// Rooted at the export output directory (`/space/page.md`).
    Absolute,
}

/// Format of the optional metadata sidecar written next to each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    /// No sidecar.
    #[default]
    None,
    /// `<page>.meta.yaml`.
    Yaml,
    /// `<page>.meta.json`.
    Json,
}

/// Export settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory where pages and attachments are written.
    pub output_path: PathBuf,
    /// Template for page file paths.
    pub page_path: String,
    /// Template for attachment file paths.
    pub attachment_path: String,
    /// Href style for links between pages.
    pub page_href: HrefStyle,
    /// Href style for links to attachments.
    pub attachment_href: HrefStyle,
    /// Prepend a breadcrumb line of ancestor links.
    pub page_breadcrumbs: bool,
    /// Render the page title as a top-level heading.
    pub include_document_title: bool,
    /// Indentation of root-level list items in front matter.
    pub front_matter_indent: usize,
    /// Macro names whose output is dropped.
    pub macros_to_ignore: Vec<String>,
    /// Metadata sidecar format.
    pub metadata: MetadataFormat,
    /// Reduce sidecar metadata to the knowledge-base whitelist.
    pub metadata_filter: bool,
    /// Attachment extension filter.
    pub attachments: AttachmentFilterConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("."),
            page_path: DEFAULT_PAGE_PATH.to_owned(),
            attachment_path: DEFAULT_ATTACHMENT_PATH.to_owned(),
            page_href: HrefStyle::default(),
            attachment_href: HrefStyle::default(),
            page_breadcrumbs: true,
            include_document_title: true,
            front_matter_indent: 2,
            macros_to_ignore: vec!["qc-read-and-understood-signature-box".to_owned()],
            metadata: MetadataFormat::default(),
            metadata_filter: false,
            attachments: AttachmentFilterConfig::default(),
        }
    }
}

/// Attachment extension filter configuration.
///
/// Extensions are matched case-insensitively and include the leading dot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentFilterConfig {
    /// Extensions that are always exported.
    pub allowed_extensions: Vec<String>,
    /// Extensions that are never exported (wins over `allowed_extensions`).
    pub blocked_extensions: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Nearest `cme.toml` in the current directory or one of its parents.
fn discover() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

impl Config {
    /// Locate, parse and validate the configuration, then apply overrides.
    ///
    /// Lookup order: `config_path`, `$CME_CONFIG_PATH`, the nearest `cme.toml`
    /// in the current directory or above. Without a file the defaults apply
    /// and output goes to the current directory.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing, unreadable, invalid
    /// TOML or references an unset environment variable.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path)),
            Some(path) => Some(path),
            None => discover(),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::defaults_in(&std::env::current_dir().unwrap_or_default()),
        };
        if let Some(settings) = cli_settings {
            config.override_with(settings);
        }
        Ok(config)
    }

    fn override_with(&mut self, settings: &CliSettings) {
        if let Some(output_path) = &settings.output_path {
            self.export.output_path.clone_from(output_path);
        }
        if let Some(page_breadcrumbs) = settings.page_breadcrumbs {
            self.export.page_breadcrumbs = page_breadcrumbs;
        }
    }

    /// The `[confluence]` section, validated. Every export needs it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the section is absent or invalid.
    pub fn require_confluence(&self) -> Result<&ApiConfig, ConfigError> {
        let Some(confluence) = &self.confluence else {
            return Err(ConfigError::Validation(
                "missing [confluence] section with the wiki URL and credentials".to_owned(),
            ));
        };
        confluence.validate("confluence")?;
        Ok(confluence)
    }

    /// The `[jira]` section, validated, when configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the section is present but invalid.
    pub fn jira(&self) -> Result<Option<&ApiConfig>, ConfigError> {
        self.jira
            .as_ref()
            .map(|jira| jira.validate("jira").map(|()| jira))
            .transpose()
    }

    /// Defaults writing to `base`.
    fn defaults_in(base: &Path) -> Self {
        Self {
            confluence: None,
            jira: None,
            export: ExportConfig {
                output_path: base.to_path_buf(),
                ..ExportConfig::default()
            },
            config_path: None,
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(&std::fs::read_to_string(path)?)?;

        // `${VAR}` may expand to a relative output path.
        config.expand_env_vars()?;
        config.resolve_paths(path.parent().unwrap_or(Path::new(".")));
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Check export settings. Connection sections are checked when a
    /// command asks for them through [`Self::require_confluence`] and
    /// [`Self::jira`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_INDENT: usize = 8;

        require_non_empty(&self.export.page_path, "export.page_path")?;
        require_non_empty(&self.export.attachment_path, "export.attachment_path")?;

        if self.export.front_matter_indent > MAX_INDENT {
            return Err(ConfigError::Validation(format!(
                "export.front_matter_indent cannot exceed {MAX_INDENT}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(confluence) = &mut self.confluence {
            confluence.expand_env_vars("confluence")?;
        }
        if let Some(jira) = &mut self.jira {
            jira.expand_env_vars("jira")?;
        }

        let mut output = self.export.output_path.to_string_lossy().into_owned();
        expand::expand_field(&mut output, "export.output_path")?;
        self.export.output_path = PathBuf::from(output);

        Ok(())
    }

    /// Resolve a relative output path against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if self.export.output_path.is_relative() {
            self.export.output_path = config_dir.join(&self.export.output_path);
        }
    }
}
