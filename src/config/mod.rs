//! Runtime configuration.
//!
//! Settings are resolved once at startup, in increasing priority: built-in
//! defaults, the optional TOML config file, environment variables. The
//! resulting [`Config`] is immutable and passed to every component.
//!
//! ```toml
//! url = "https://freidok.uni-freiburg.de/jsonApi/v1/"
//! languages = "deu,eng"
//! template = "~/templates/publications.md"
//! timeout_secs = 30
//! user_email = "me@example.org"
//!
//! [fieldsets]
//! mini = ["id", "titles", "persons"]
//! links = "id, link, pub_ids"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{FreidokError, Result};
use crate::process::parse_languages;
use crate::query::fields::{fieldsets_from_env, split_list, FieldSets};

/// Default API base URL
pub const DEFAULT_URL: &str = "https://freidok.uni-freiburg.de/jsonApi/v1/";

/// Default language preference
pub const DEFAULT_LANGUAGES: &str = "eng,deu";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_URL: &str = "FREIDOK_URL";
pub const ENV_LANGUAGES: &str = "FREIDOK_LANGUAGES";
pub const ENV_TEMPLATE: &str = "FREIDOK_TEMPLATE";
pub const ENV_TIMEOUT: &str = "FREIDOK_TIMEOUT";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API base URL, always ending with `/`
    pub base_url: url::Url,

    /// Language preference for titles and names
    pub languages: Vec<String>,

    /// Default custom template
    pub template: Option<PathBuf>,

    /// HTTP request timeout
    pub timeout_secs: u64,

    /// Contact address sent in the `From` header
    pub user_email: Option<String>,

    /// Built-in and custom publication field sets
    pub fieldsets: FieldSets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_url(),
            languages: DEFAULT_LANGUAGES.split(',').map(str::to_string).collect(),
            template: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_email: None,
            fieldsets: FieldSets::builtin(),
        }
    }
}

/// File and environment values before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    url: String,
    languages: String,
    #[serde(default)]
    template: Option<String>,
    timeout_secs: u64,
    #[serde(default)]
    user_email: Option<String>,
    #[serde(default)]
    fieldsets: HashMap<String, FieldList>,
}

/// A field set in the config file: an array or a comma separated string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldList {
    List(Vec<String>),
    Text(String),
}

impl FieldList {
    fn into_fields(self) -> Vec<String> {
        match self {
            FieldList::List(fields) => fields.iter().flat_map(|f| split_list(f)).collect(),
            FieldList::Text(text) => split_list(&text),
        }
    }
}

/// Load configuration from an optional file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_from(path, std::env::vars())
}

/// Load configuration from an optional file and the given environment
pub fn load_config_from<I>(path: Option<&Path>, env: I) -> Result<Config>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env: HashMap<String, String> = env.into_iter().collect();
    let var = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    let mut builder = config::Config::builder()
        .set_default("url", DEFAULT_URL)?
        .set_default("languages", DEFAULT_LANGUAGES)?
        .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?;

    if let Some(path) = path {
        if !path.exists() {
            return Err(FreidokError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
    }

    let raw: RawConfig = builder
        .set_override_option("url", var(ENV_URL))?
        .set_override_option("languages", var(ENV_LANGUAGES))?
        .set_override_option("template", var(ENV_TEMPLATE))?
        .set_override_option("timeout_secs", var(ENV_TIMEOUT))?
        .build()?
        .try_deserialize()?;

    let mut fieldsets = FieldSets::builtin();
    fieldsets.merge(
        raw.fieldsets
            .into_iter()
            .map(|(name, fields)| (name, fields.into_fields())),
    );
    fieldsets.merge(fieldsets_from_env(env.clone()));

    Ok(Config {
        base_url: parse_base_url(&raw.url)?,
        languages: parse_languages(&raw.languages).map_err(FreidokError::Config)?,
        template: raw.template.map(PathBuf::from),
        timeout_secs: raw.timeout_secs,
        user_email: raw.user_email.filter(|e| !e.is_empty()),
        fieldsets,
    })
}

/// Look for `freidok/config.toml` in the user's config directory
pub fn find_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("freidok").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Parse the API base URL, adding the trailing slash needed for joining paths
pub fn parse_base_url(value: &str) -> Result<url::Url> {
    let value = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    };
    let url = url::Url::parse(&value)
        .map_err(|e| FreidokError::Config(format!("Invalid API URL '{}': {}", value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FreidokError::Config(format!(
            "API URL must use http or https: {}",
            value
        )));
    }
    Ok(url)
}

fn default_url() -> url::Url {
    url::Url::parse(DEFAULT_URL).expect("default URL is valid")
}
