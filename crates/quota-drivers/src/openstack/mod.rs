//! OpenStack quota driver
//!
//! Talks to Keystone for authentication and project lookup, then to Nova,
//! Neutron or Cinder for the quota calls.

mod auth;

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use os_quota_config::CloudConfig;
use os_quota_core::{QuotaSdk, SdkError};
use os_quota_types::{QuotaDomain, QuotaSet};

use crate::SDK_VERSION;
use auth::Session;

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default)]
    projects: Vec<ProjectRef>,
}

#[derive(Debug, Deserialize)]
struct ProjectBody {
    project: ProjectRef,
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    id: String,
}

/// Quota resource path and JSON envelope key for a domain
fn quota_resource(domain: QuotaDomain, endpoint: &str, project_id: &str) -> (String, &'static str) {
    match domain {
        QuotaDomain::Compute | QuotaDomain::Volume => (
            format!("{}/os-quota-sets/{}", endpoint, project_id),
            "quota_set",
        ),
        QuotaDomain::Network => {
            let base = if endpoint.ends_with("/v2.0") {
                endpoint.to_string()
            } else {
                format!("{}/v2.0", endpoint)
            };
            (format!("{}/quotas/{}", base, project_id), "quota")
        }
    }
}

/// Path suffix of the per-project defaults resource
fn defaults_suffix(domain: QuotaDomain) -> &'static str {
    match domain {
        QuotaDomain::Network => "/default",
        QuotaDomain::Compute | QuotaDomain::Volume => "/defaults",
    }
}

/// OpenStack implementation of [`QuotaSdk`].
///
/// The Keystone session is established on the first quota call and reused
/// for the lifetime of the driver.
pub struct OpenStackCloud {
    config: CloudConfig,
    client: Client,
    session: OnceCell<Session>,
}

impl OpenStackCloud {
    /// Create a driver from resolved cloud settings
    pub fn new(config: CloudConfig) -> Result<Self, SdkError> {
        if config.auth.auth_url.is_none() {
            return Err(SdkError::new("auth_url is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify())
            .build()
            .map_err(|e| SdkError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            session: OnceCell::new(),
        })
    }

    async fn session(&self) -> Result<&Session, SdkError> {
        self.session
            .get_or_try_init(|| Session::authenticate(&self.client, &self.config))
            .await
    }

    /// Make authenticated API request
    async fn api_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, SdkError> {
        let session = self.session().await?;
        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Auth-Token", &session.token)
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SdkError::new(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SdkError::with_status(
                status.as_u16(),
                format!("{} {} returned {}: {}", method, url, status, text),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SdkError::new(format!("Failed to read response from {}: {}", url, e)))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| SdkError::new(format!("Invalid JSON from {}: {}", url, e)))
    }

    /// Resolve a project name or ID to its ID
    async fn project_id(&self, project: &str) -> Result<String, SdkError> {
        let identity_url = self.session().await?.identity_url.clone();

        let url = format!(
            "{}/projects?name={}",
            identity_url,
            urlencoding::encode(project)
        );
        if let Some(value) = self.api_request(Method::GET, &url, None).await? {
            let list: ProjectList = serde_json::from_value(value)
                .map_err(|e| SdkError::new(format!("Invalid project list: {}", e)))?;
            match list.projects.len() {
                0 => {}
                1 => return Ok(list.projects[0].id.clone()),
                _ => {
                    return Err(SdkError::new(format!(
                        "Multiple matches found for {}",
                        project
                    )))
                }
            }
        }

        let url = format!("{}/projects/{}", identity_url, urlencoding::encode(project));
        let not_found = || SdkError::new(format!("project does not exist: {}", project));
        match self.api_request(Method::GET, &url, None).await {
            Ok(Some(value)) => serde_json::from_value::<ProjectBody>(value)
                .map(|body| body.project.id)
                .map_err(|e| SdkError::new(format!("Invalid project response: {}", e))),
            Ok(None) => Err(not_found()),
            Err(e) if e.is_not_found() => Err(not_found()),
            Err(e) => Err(e),
        }
    }

    async fn quota_url(
        &self,
        domain: QuotaDomain,
        project: &str,
    ) -> Result<(String, &'static str), SdkError> {
        let project_id = self.project_id(project).await?;
        let endpoint = self.session().await?.endpoint_for(
            domain,
            self.config.interface(),
            self.config.region_name.as_deref(),
        )?;
        Ok(quota_resource(domain, &endpoint, &project_id))
    }

    async fn fetch_quota_set(
        &self,
        domain: QuotaDomain,
        url: &str,
        key: &str,
    ) -> Result<QuotaSet, SdkError> {
        let body = self
            .api_request(Method::GET, url, None)
            .await?
            .ok_or_else(|| SdkError::new(format!("Empty {} quota response", domain)))?;

        let object = body
            .get(key)
            .and_then(Value::as_object)
            .ok_or_else(|| SdkError::new(format!("Malformed {} quota response", domain)))?;

        Ok(QuotaSet::from_json_object(object))
    }
}

#[async_trait]
impl QuotaSdk for OpenStackCloud {
    fn name(&self) -> String {
        "openstack".to_string()
    }

    fn version(&self) -> String {
        SDK_VERSION.to_string()
    }

    async fn get_quotas(&self, domain: QuotaDomain, project: &str) -> Result<QuotaSet, SdkError> {
        let (url, key) = self.quota_url(domain, project).await?;
        self.fetch_quota_set(domain, &url, key).await
    }

    async fn get_default_quotas(
        &self,
        domain: QuotaDomain,
        project: &str,
    ) -> Result<QuotaSet, SdkError> {
        let (url, key) = self.quota_url(domain, project).await?;
        let url = format!("{}{}", url, defaults_suffix(domain));
        self.fetch_quota_set(domain, &url, key).await
    }

    async fn set_quotas(
        &self,
        domain: QuotaDomain,
        project: &str,
        quotas: &QuotaSet,
    ) -> Result<(), SdkError> {
        let (url, key) = self.quota_url(domain, project).await?;
        let limits = serde_json::to_value(quotas)
            .map_err(|e| SdkError::new(format!("Failed to encode quotas: {}", e)))?;
        let mut envelope = serde_json::Map::new();
        envelope.insert(key.to_string(), limits);
        let body = Value::Object(envelope);
        self.api_request(Method::PUT, &url, Some(&body)).await?;
        log::info!("Updated {} quotas for project {}", domain, project);
        Ok(())
    }

    async fn delete_quotas(&self, domain: QuotaDomain, project: &str) -> Result<(), SdkError> {
        let (url, _) = self.quota_url(domain, project).await?;
        self.api_request(Method::DELETE, &url, None).await?;
        log::info!("Reset {} quotas for project {}", domain, project);
        Ok(())
    }
}
