// --- File: crates/elements_cronofy/src/service.rs ---
//! Cronofy implementation of the [`SchedulingApi`] trait.
//!
//! Element tokens and real-time scheduling are authenticated with the client
//! secret; calendar reads and writes use the statically configured access
//! token of the demo account.

use elements_common::create_client;
use elements_common::services::{
    AccessTokenRequest, AccessTokenResponse, ApiError, BoxFuture, CalendarEvent,
    ElementTokenRequest, ElementTokenResponse, RealTimeSchedulingRequest,
    RealTimeSchedulingResponse, SchedulingApi, UserInfo,
};
use elements_config::CronofyConfig;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::auth::api_base_url;

/// OAuth style error body, e.g. `{"error": "invalid_grant"}`.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
}

/// Maps a non-success response onto the [`ApiError`] taxonomy.
pub fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let oauth_error = serde_json::from_str::<OAuthErrorBody>(body)
        .ok()
        .map(|b| b.error);

    match oauth_error.as_deref() {
        Some("invalid_grant") => return ApiError::InvalidGrant(body.to_string()),
        Some("invalid_client") | Some("unauthorized_client") => {
            return ApiError::Unauthorized {
                status: status.as_u16(),
                body: body.to_string(),
            }
        }
        _ => {}
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Unauthorized {
            status: status.as_u16(),
            body: body.to_string(),
        }
    } else {
        ApiError::Rejected {
            status: status.as_u16(),
            body: body.to_string(),
        }
    }
}

/// HTTP client for the Cronofy REST API.
pub struct CronofyService {
    http: Client,
    api_base: Url,
    client_id: String,
    client_secret: String,
    access_token: String,
}

impl CronofyService {
    /// Builds the client once from configuration. The instance is meant to be
    /// wrapped in an `Arc` and shared by every request handler.
    pub fn new(config: &CronofyConfig) -> Result<Self, ApiError> {
        let http = create_client(config.timeout_secs, true)
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let api_base = Url::parse(&api_base_url(config))
            .map_err(|e| ApiError::Http(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            http,
            api_base,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Http(format!("cannot-be-a-base URL: {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{}: {}", e, body)))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

impl SchedulingApi for CronofyService {
    fn request_access_token(
        &self,
        request: AccessTokenRequest,
    ) -> BoxFuture<'_, AccessTokenResponse, ApiError> {
        Box::pin(async move {
            let url = self.endpoint(&["oauth", "token"])?;
            debug!("POST {} (grant_type={})", url, request.grant_type);
            self.send_json(self.http.post(url).json(&request)).await
        })
    }

    fn request_element_token(
        &self,
        request: ElementTokenRequest,
    ) -> BoxFuture<'_, ElementTokenResponse, ApiError> {
        Box::pin(async move {
            let url = self.endpoint(&["v1", "element_tokens"])?;
            debug!("POST {} permissions={:?}", url, request.permissions);
            self.send_json(
                self.http
                    .post(url)
                    .bearer_auth(&self.client_secret)
                    .json(&request),
            )
            .await
        })
    }

    fn user_info(&self) -> BoxFuture<'_, UserInfo, ApiError> {
        Box::pin(async move {
            let url = self.endpoint(&["v1", "userinfo"])?;
            debug!("GET {}", url);
            self.send_json(self.http.get(url).bearer_auth(&self.access_token))
                .await
        })
    }

    fn real_time_scheduling(
        &self,
        request: RealTimeSchedulingRequest,
    ) -> BoxFuture<'_, RealTimeSchedulingResponse, ApiError> {
        Box::pin(async move {
            let url = self.endpoint(&["v1", "real_time_scheduling"])?;
            debug!("POST {} event_id={}", url, request.event.event_id);
            // client_id travels in the body alongside the secret bearer
            let mut body = serde_json::to_value(&request)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            if let Some(map) = body.as_object_mut() {
                map.insert(
                    "client_id".to_string(),
                    serde_json::Value::String(self.client_id.clone()),
                );
            }
            self.send_json(
                self.http
                    .post(url)
                    .bearer_auth(&self.client_secret)
                    .json(&body),
            )
            .await
        })
    }

    fn create_event(&self, calendar_id: &str, event: CalendarEvent) -> BoxFuture<'_, (), ApiError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            let url = self.endpoint(&["v1", "calendars", &calendar_id, "events"])?;
            debug!("POST {} event_id={}", url, event.event_id);
            self.send_empty(
                self.http
                    .post(url)
                    .bearer_auth(&self.access_token)
                    .json(&event),
            )
            .await
        })
    }
}
