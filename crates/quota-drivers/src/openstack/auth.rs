//! Keystone v3 authentication and service catalog

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use os_quota_config::CloudConfig;
use os_quota_core::SdkError;
use os_quota_types::QuotaDomain;

/// Catalog endpoint entry
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

/// Catalog service entry
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: TokenInfo,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    catalog: Vec<CatalogService>,
}

/// Authenticated Keystone session
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub token: String,
    pub identity_url: String,
    pub catalog: Vec<CatalogService>,
}

/// Catalog service types that serve a quota domain, most preferred first
pub(crate) fn service_types(domain: QuotaDomain) -> &'static [&'static str] {
    match domain {
        QuotaDomain::Compute => &["compute"],
        QuotaDomain::Network => &["network"],
        QuotaDomain::Volume => &["block-storage", "volumev3", "volumev2", "volume"],
    }
}

/// Keystone base URL including the `/v3` suffix
pub(crate) fn identity_base(auth_url: &str) -> String {
    let trimmed = auth_url.trim_end_matches('/');
    if trimmed.ends_with("/v3") {
        trimmed.to_string()
    } else {
        format!("{}/v3", trimmed)
    }
}

/// Build the `POST /v3/auth/tokens` body for the configured credentials
pub(crate) fn auth_request_body(config: &CloudConfig) -> Result<Value, SdkError> {
    let auth = &config.auth;

    let identity = if let Some(token) = &auth.token {
        json!({"methods": ["token"], "token": {"id": token}})
    } else {
        let username = auth
            .username
            .as_ref()
            .ok_or_else(|| SdkError::new("username is required for password authentication"))?;
        let password = auth
            .password
            .as_ref()
            .ok_or_else(|| SdkError::new("password is required for password authentication"))?;
        let user_domain = auth.user_domain_name.as_deref().unwrap_or("Default");
        json!({
            "methods": ["password"],
            "password": {
                "user": {
                    "name": username,
                    "domain": {"name": user_domain},
                    "password": password
                }
            }
        })
    };

    let mut body = json!({"auth": {"identity": identity}});
    if let Some(project_id) = &auth.project_id {
        body["auth"]["scope"] = json!({"project": {"id": project_id}});
    } else if let Some(project_name) = &auth.project_name {
        let project_domain = auth.project_domain_name.as_deref().unwrap_or("Default");
        body["auth"]["scope"] = json!({
            "project": {"name": project_name, "domain": {"name": project_domain}}
        });
    }

    Ok(body)
}

impl Session {
    /// Authenticate against Keystone and keep the token and catalog
    pub async fn authenticate(client: &Client, config: &CloudConfig) -> Result<Self, SdkError> {
        let auth_url = config
            .auth
            .auth_url
            .as_ref()
            .ok_or_else(|| SdkError::new("auth_url is required"))?;
        let identity_url = identity_base(auth_url);
        let body = auth_request_body(config)?;

        let url = format!("{}/auth/tokens", identity_url);
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SdkError::new(format!("Authentication request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SdkError::new(format!(
                "Authentication failed: {} - {}",
                status, text
            )));
        }

        let token = response
            .headers()
            .get("X-Subject-Token")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| SdkError::new("Keystone response carried no X-Subject-Token"))?;

        let body: TokenBody = response
            .json()
            .await
            .map_err(|e| SdkError::new(format!("Invalid token response: {}", e)))?;

        log::info!("Authenticated with Keystone at {}", identity_url);
        Ok(Self {
            token,
            identity_url,
            catalog: body.token.catalog,
        })
    }

    /// Endpoint URL serving `domain` for the given interface and region
    pub fn endpoint_for(
        &self,
        domain: QuotaDomain,
        interface: &str,
        region: Option<&str>,
    ) -> Result<String, SdkError> {
        for service_type in service_types(domain) {
            let Some(service) = self
                .catalog
                .iter()
                .find(|service| service.service_type == *service_type)
            else {
                continue;
            };

            let endpoint = service.endpoints.iter().find(|endpoint| {
                endpoint.interface == interface
                    && region.map_or(true, |region| {
                        endpoint.region.as_deref() == Some(region)
                            || endpoint.region_id.as_deref() == Some(region)
                    })
            });

            if let Some(endpoint) = endpoint {
                return Ok(endpoint.url.trim_end_matches('/').to_string());
            }
        }

        Err(SdkError::new(format!(
            "No {} endpoint found for {} quotas in the service catalog",
            interface, domain
        )))
    }
}
