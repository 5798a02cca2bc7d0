//! Vertex AI custom job submission over REST.

use std::time::Duration;

use super::{CustomJobRequest, JobConfig, JobHandle, JobSubmitter};
use crate::error::Yolo2CocoError;

/// Environment variable holding the OAuth access token.
pub const TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

pub struct VertexAiSubmitter {
    agent: ureq::Agent,
    token: String,
    endpoint: Option<String>,
}

impl VertexAiSubmitter {
    pub fn new(token: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(60)))
            .build();
        Self {
            agent: config.into(),
            token: token.into(),
            endpoint: None,
        }
    }

    /// Sends requests to `endpoint` instead of the regional service URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// `https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/customJobs`
pub fn custom_jobs_url(project_id: &str, location: &str) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/customJobs"
    )
}

impl JobSubmitter for VertexAiSubmitter {
    fn submit(
        &self,
        config: &JobConfig,
        request: &CustomJobRequest,
    ) -> Result<JobHandle, Yolo2CocoError> {
        let url = self
            .endpoint
            .clone()
            .unwrap_or_else(|| custom_jobs_url(&config.project_id, &config.location));

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .send_json(request)
            .map_err(|source| Yolo2CocoError::JobSubmit {
                message: format!("POST {url}: {source}"),
            })?;

        response
            .body_mut()
            .read_json::<JobHandle>()
            .map_err(|source| Yolo2CocoError::JobSubmit {
                message: format!("unexpected response from {url}: {source}"),
            })
    }
}
