//! `PagerDuty` REST API client for paging on-call responders.
//!
//! Opens incidents through `POST /incidents` against a fixed service and
//! escalation policy. Only incident creation is supported; acknowledgement
//! and resolution happen in `PagerDuty` itself.

use async_trait::async_trait;
use incident::{CallError, PageRequest, PageResult, PagingPlatform, Platform};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, FROM};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PagerDutyConfig;
use crate::error::ClientError;

/// `PagerDuty` REST API base URL.
const PAGERDUTY_API_URL: &str = "https://api.pagerduty.com";

/// Media type selecting REST API v2.
const PAGERDUTY_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";

/// `PagerDuty` REST client.
#[derive(Debug, Clone)]
pub struct PagerDutyClient {
    client: reqwest::Client,
    base_url: String,
    service_id: String,
    escalation_policy_id: String,
}

impl PagerDutyClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    /// Returns error if the token or requester email are not valid header values.
    pub fn new(config: &PagerDutyConfig) -> Result<Self, ClientError> {
        Self::with_base_url(config, PAGERDUTY_API_URL)
    }

    /// Create a client against a custom API URL (for testing).
    ///
    /// # Errors
    /// Returns error if the token or requester email are not valid header values.
    pub fn with_base_url(config: &PagerDutyConfig, base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Token token={}", config.api_token))
                .map_err(|_| ClientError::Setup("invalid PagerDuty token".to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(PAGERDUTY_ACCEPT));
        headers.insert(
            FROM,
            HeaderValue::from_str(&config.from_email)
                .map_err(|_| ClientError::Setup("invalid PagerDuty requester".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_id: config.service_id.clone(),
            escalation_policy_id: config.escalation_policy_id.clone(),
        })
    }

    /// Open an incident and return its id and web link.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    pub async fn open_incident(&self, title: &str, details: &str) -> Result<PageResult, ClientError> {
        let payload = CreateIncident {
            incident: NewIncident {
                incident_type: "incident",
                title,
                service: Reference {
                    id: &self.service_id,
                    reference_type: "service_reference",
                },
                body: IncidentBody {
                    body_type: "incident_body",
                    details,
                },
                escalation_policy: Reference {
                    id: &self.escalation_policy_id,
                    reference_type: "escalation_policy_reference",
                },
            },
        };

        debug!(title = %title, "Creating PagerDuty incident");

        let response = self
            .client
            .post(format!("{}/incidents", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            let result: IncidentResponse = response.json().await?;
            debug!(id = %result.incident.id, url = %result.incident.html_url, "PagerDuty incident created");
            Ok(PageResult {
                id: result.incident.id,
                html_url: result.incident.html_url,
            })
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                status = %status,
                body = %body,
                "PagerDuty API request failed"
            );

            Err(ClientError::Status { status, body })
        }
    }
}

#[async_trait]
impl PagingPlatform for PagerDutyClient {
    async fn create_incident(&self, request: &PageRequest) -> Result<PageResult, CallError> {
        self.open_incident(&request.title, &request.details)
            .await
            .map_err(|e| e.into_call(Platform::Paging, "incidents.create"))
    }
}

#[derive(Debug, Serialize)]
struct CreateIncident<'a> {
    incident: NewIncident<'a>,
}

#[derive(Debug, Serialize)]
struct NewIncident<'a> {
    #[serde(rename = "type")]
    incident_type: &'static str,
    title: &'a str,
    service: Reference<'a>,
    body: IncidentBody<'a>,
    escalation_policy: Reference<'a>,
}

#[derive(Debug, Serialize)]
struct Reference<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    reference_type: &'static str,
}

#[derive(Debug, Serialize)]
struct IncidentBody<'a> {
    #[serde(rename = "type")]
    body_type: &'static str,
    details: &'a str,
}

#[derive(Debug, Deserialize)]
struct IncidentResponse {
    incident: CreatedIncident,
}

#[derive(Debug, Deserialize)]
struct CreatedIncident {
    id: String,
    html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> PagerDutyConfig {
        PagerDutyConfig {
            api_token: "pd-token".to_string(),
            service_id: "PSERVICE".to_string(),
            escalation_policy_id: "PPOLICY".to_string(),
            from_email: "oncall@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_incident_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents"))
            .and(header("authorization", "Token token=pd-token"))
            .and(header("accept", PAGERDUTY_ACCEPT))
            .and(header("from", "oncall@example.com"))
            .and(body_json(json!({
                "incident": {
                    "type": "incident",
                    "title": "20240101-brave-otter (DB degraded)",
                    "service": { "id": "PSERVICE", "type": "service_reference" },
                    "body": { "type": "incident_body", "details": "see channel" },
                    "escalation_policy": { "id": "PPOLICY", "type": "escalation_policy_reference" }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "incident": {
                    "id": "Q1",
                    "html_url": "https://acme.pagerduty.com/incidents/Q1",
                    "status": "triggered"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PagerDutyClient::with_base_url(&config(), &server.uri()).unwrap();
        let result = client
            .create_incident(&PageRequest {
                title: "20240101-brave-otter (DB degraded)".to_string(),
                details: "see channel".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.id, "Q1");
        assert_eq!(result.html_url, "https://acme.pagerduty.com/incidents/Q1");
    }

    #[tokio::test]
    async fn test_create_incident_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid service"))
            .mount(&server)
            .await;

        let client = PagerDutyClient::with_base_url(&config(), &server.uri()).unwrap();
        let err = client
            .create_incident(&PageRequest {
                title: "t".to_string(),
                details: "d".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.platform, Platform::Paging);
        assert!(err.message.contains("Invalid service"));
    }
}
