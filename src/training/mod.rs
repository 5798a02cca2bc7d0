//! Remote training job launcher.
//!
//! A [`JobConfig`] plus [`TrainingOverrides`] becomes a [`CustomJobRequest`],
//! which a [`JobSubmitter`] sends (or, for [`DryRunSubmitter`], does not).

pub mod config;
#[cfg(feature = "remote")]
pub mod vertex;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Yolo2CocoError;

pub use config::JobConfig;

/// Command-line adjustments appended to the configured trainer arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingOverrides {
    pub epochs: Option<u32>,
    pub batch_size: Option<u32>,
    pub checkpoint_freq: Option<u32>,
    pub test_only: bool,
}

impl TrainingOverrides {
    /// The trainer arguments these overrides translate to, in a fixed order.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut update = |setting: String| {
            args.push("--update".to_string());
            args.push(setting);
        };

        if let Some(epochs) = self.epochs {
            update(format!("epochs={epochs}"));
        }
        if let Some(batch_size) = self.batch_size {
            update(format!("train_dataloader.total_batch_size={batch_size}"));
        }
        if let Some(freq) = self.checkpoint_freq {
            update(format!("checkpoint_freq={freq}"));
        }
        if self.test_only {
            args.push("--test-only".to_string());
        }
        args
    }
}

/// Vertex AI `CustomJob` resource, as sent on create.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomJobRequest {
    pub display_name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub labels: BTreeMap<String, String>,
    pub job_spec: JobSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub worker_pool_specs: Vec<WorkerPoolSpec>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub base_output_directory: Option<GcsDestination>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPoolSpec {
    pub machine_spec: MachineSpec,
    pub replica_count: u32,
    pub container_spec: ContainerSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    pub machine_type: String,
    pub accelerator_type: String,
    pub accelerator_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub image_uri: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub env: Vec<EnvVar>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsDestination {
    pub output_uri_prefix: String,
}

impl CustomJobRequest {
    /// Builds the single-pool job request for `config`.
    ///
    /// Overrides are appended after the configured args. The container
    /// receives `WANDB_API_KEY` and `GCS_DATA_PATH` when they are set.
    pub fn build(config: &JobConfig, overrides: &TrainingOverrides) -> Self {
        let mut args = config.args.clone();
        args.extend(overrides.to_args());

        let mut env = Vec::new();
        if let Some(key) = config.wandb_api_key.as_deref().filter(|k| !k.is_empty()) {
            env.push(EnvVar {
                name: config::WANDB_ENV.to_string(),
                value: key.to_string(),
            });
        }
        if let Some(path) = config.gcs_data_path.as_deref().filter(|p| !p.is_empty()) {
            env.push(EnvVar {
                name: "GCS_DATA_PATH".to_string(),
                value: path.to_string(),
            });
        }

        Self {
            display_name: config.display_name.clone(),
            labels: config.labels.clone(),
            job_spec: JobSpec {
                worker_pool_specs: vec![WorkerPoolSpec {
                    machine_spec: MachineSpec {
                        machine_type: config.machine_type.clone(),
                        accelerator_type: config.accelerator_type.clone(),
                        accelerator_count: config.accelerator_count,
                    },
                    replica_count: config.replica_count,
                    container_spec: ContainerSpec {
                        image_uri: config.container_image_uri.clone(),
                        args,
                        env,
                    },
                }],
                service_account: config.service_account.clone(),
                base_output_directory: config
                    .staging_bucket
                    .clone()
                    .map(|output_uri_prefix| GcsDestination { output_uri_prefix }),
            },
        }
    }

    pub fn args(&self) -> &[String] {
        self.job_spec
            .worker_pool_specs
            .first()
            .map(|pool| pool.container_spec.args.as_slice())
            .unwrap_or(&[])
    }

    pub fn to_json_pretty(&self) -> Result<String, Yolo2CocoError> {
        serde_json::to_string_pretty(self).map_err(|source| Yolo2CocoError::JobSubmit {
            message: format!("cannot serialize job request: {source}"),
        })
    }
}

/// What the service reports back for a created job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub state: String,
}

/// Sends a job request to a training service.
pub trait JobSubmitter {
    fn submit(
        &self,
        config: &JobConfig,
        request: &CustomJobRequest,
    ) -> Result<JobHandle, Yolo2CocoError>;
}

/// Returns a synthetic handle without contacting any service.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunSubmitter;

impl JobSubmitter for DryRunSubmitter {
    fn submit(
        &self,
        config: &JobConfig,
        request: &CustomJobRequest,
    ) -> Result<JobHandle, Yolo2CocoError> {
        Ok(JobHandle {
            name: format!(
                "projects/{}/locations/{}/customJobs/dry-run",
                config.project_id, config.location
            ),
            display_name: request.display_name.clone(),
            state: "DRY_RUN".to_string(),
        })
    }
}

/// Console page listing the project's custom jobs.
pub fn console_url(project_id: &str) -> String {
    format!("https://console.cloud.google.com/vertex-ai/training/custom-jobs?project={project_id}")
}
