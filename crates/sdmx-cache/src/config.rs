use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use sdmx_fetch::PollPolicy;
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, DatasetId};
use crate::error::{Error, Result};

/// Placeholder replaced by the dataset code in URL templates.
pub const ID_PLACEHOLDER: &str = "{id}";

pub const DEFAULT_METADATA_URL_TEMPLATE: &str =
    "http://ec.europa.eu/eurostat/SDMX/diss-web/rest/datastructure/ESTAT/DSD_{id}";
pub const DEFAULT_DATA_URL_TEMPLATE: &str =
    "http://ec.europa.eu/eurostat/SDMX/diss-web/rest/data/{id}";

/// Settings of a [`DatasetClient`](crate::DatasetClient).
///
/// Loaded in layers: built-in defaults, then an optional TOML file, then
/// `SDMX_CACHE_*` environment variables.
///
/// ```toml
/// cache_dir = "/var/cache/sdmx"
/// staging_dir = "/var/cache/sdmx/.staging"
/// max_poll_attempts = 60
/// poll_interval_seconds = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub cache_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub metadata_url_template: String,
    pub data_url_template: String,
    pub max_poll_attempts: u32,
    pub poll_interval_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data"),
            staging_dir: PathBuf::from("temp"),
            metadata_url_template: DEFAULT_METADATA_URL_TEMPLATE.to_owned(),
            data_url_template: DEFAULT_DATA_URL_TEMPLATE.to_owned(),
            max_poll_attempts: 60,
            poll_interval_seconds: 5,
        }
    }
}

impl ClientConfig {
    pub const ENV_PREFIX: &'static str = "SDMX_CACHE_";

    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file_exact(path));
        }
        figment.merge(Env::prefixed(Self::ENV_PREFIX))
    }

    /// Load and validate. A `file` that is given must exist.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, template) in [
            ("metadata_url_template", &self.metadata_url_template),
            ("data_url_template", &self.data_url_template),
        ] {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(Error::Config(format!(
                    "{name} '{template}' has no {ID_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(())
    }

    pub fn url_template(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::StructureDefinition => &self.metadata_url_template,
            ArtifactKind::Data => &self.data_url_template,
        }
    }

    pub fn url_for(&self, kind: ArtifactKind, id: &DatasetId) -> String {
        self.url_template(kind).replace(ID_PLACEHOLDER, id.as_str())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
            .max_attempts(self.max_poll_attempts)
            .interval(Duration::from_secs(self.poll_interval_seconds))
    }
}
