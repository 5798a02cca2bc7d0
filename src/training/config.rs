//! Training job configuration file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Yolo2CocoError;

pub const DEFAULT_CONFIG_PATH: &str = "vertex_ai/vertex.yaml";

/// Environment variable that overrides [`JobConfig::project_id`].
pub const PROJECT_ENV: &str = "GCP_PROJECT";
/// Environment variable that overrides [`JobConfig::wandb_api_key`].
pub const WANDB_ENV: &str = "WANDB_API_KEY";

/// Settings for one remote training job, as read from YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    #[serde(default = "default_accelerator_type")]
    pub accelerator_type: String,
    #[serde(default = "default_count")]
    pub accelerator_count: u32,
    #[serde(default = "default_count")]
    pub replica_count: u32,
    #[serde(default)]
    pub service_account: Option<String>,
    #[serde(default)]
    pub container_image_uri: String,
    /// Where the service writes job outputs, e.g. `gs://bucket/dir/`.
    #[serde(default)]
    pub staging_bucket: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Base trainer arguments; overrides are appended after these.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub gcs_data_path: Option<String>,
    #[serde(default)]
    pub wandb_api_key: Option<String>,
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_display_name() -> String {
    "dfine-training".to_string()
}

fn default_machine_type() -> String {
    "n1-standard-8".to_string()
}

fn default_accelerator_type() -> String {
    "NVIDIA_TESLA_T4".to_string()
}

fn default_count() -> u32 {
    1
}

impl JobConfig {
    /// Reads and parses a YAML config file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, Yolo2CocoError> {
        let text = fs::read_to_string(path).map_err(|source| Yolo2CocoError::Config {
            path: path.to_path_buf(),
            message: format!("cannot read job config: {source}"),
        })?;
        Self::from_yaml_str(&text, path)
    }

    pub fn from_yaml_str(text: &str, path: &Path) -> Result<Self, Yolo2CocoError> {
        serde_yaml::from_str(text).map_err(|source| Yolo2CocoError::YamlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `GCP_PROJECT` and `WANDB_API_KEY` overrides using `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(project) = non_empty(PROJECT_ENV) {
            self.project_id = project;
        }
        if let Some(key) = non_empty(WANDB_ENV) {
            self.wandb_api_key = Some(key);
        }
    }

    /// Checks the fields a submission cannot go without.
    pub fn validate(&self, path: &Path) -> Result<(), Yolo2CocoError> {
        let config_error = |message: &str| Yolo2CocoError::Config {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        if self.container_image_uri.trim().is_empty() {
            return Err(config_error(
                "container_image_uri is not set; build and push the training image, then set its URI",
            ));
        }
        if self.project_id.trim().is_empty() {
            return Err(config_error(&format!(
                "project_id is not set (set it in the config or via {PROJECT_ENV})"
            )));
        }
        if self.replica_count == 0 {
            return Err(config_error("replica_count must be at least 1"));
        }
        Ok(())
    }
}
