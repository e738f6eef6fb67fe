// --- File: crates/elements_common/src/services.rs ---
//! Service abstraction for the scheduling vendor API.
//!
//! Handlers only ever see `Arc<dyn SchedulingApi>`. The production
//! implementation talks to Cronofy over HTTP; tests plug in a recording mock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors returned by the scheduling API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout...).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The authorization code was stale, already redeemed, or issued for a
    /// different redirect URI.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// Client id, secret or access token were rejected.
    #[error("Credentials rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// The vendor refused the payload.
    #[error("Request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The account has no profile with a calendar to book into.
    #[error("No calendar available for this account")]
    NoCalendar,
}

impl ApiError {
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, ApiError::InvalidGrant(_))
    }

    /// True when the failure points at misconfigured `CLIENT_ID`,
    /// `CLIENT_SECRET`, `ACCESS_TOKEN` or `SUB`.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// The operations the booking flow needs from the scheduling vendor.
pub trait SchedulingApi: Send + Sync {
    /// Redeem an OAuth authorization code.
    fn request_access_token(
        &self,
        request: AccessTokenRequest,
    ) -> BoxFuture<'_, AccessTokenResponse, ApiError>;

    /// Issue a short-lived token for embedding an element widget.
    fn request_element_token(
        &self,
        request: ElementTokenRequest,
    ) -> BoxFuture<'_, ElementTokenResponse, ApiError>;

    /// Profiles and calendars of the configured account.
    fn user_info(&self) -> BoxFuture<'_, UserInfo, ApiError>;

    /// Start a real-time scheduling flow and get the invitee URL back.
    fn real_time_scheduling(
        &self,
        request: RealTimeSchedulingRequest,
    ) -> BoxFuture<'_, RealTimeSchedulingResponse, ApiError>;

    /// Create or update (by `event_id`) an event in the given calendar.
    fn create_event(&self, calendar_id: &str, event: CalendarEvent) -> BoxFuture<'_, (), ApiError>;
}

// --- OAuth ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub token_type: String,
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
}

// --- Element tokens ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementTokenRequest {
    pub version: String,
    pub permissions: Vec<String>,
    pub subs: Vec<String>,
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementToken {
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub origin: Option<String>,
    pub token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementTokenResponse {
    pub element_token: ElementToken,
}

impl ElementTokenResponse {
    /// Token value rendered when issuance failed.
    pub const INVALID: &'static str = "invalid";

    /// Placeholder that lets a page render when no token could be issued.
    pub fn invalid() -> Self {
        Self {
            element_token: ElementToken {
                permissions: Vec::new(),
                origin: None,
                token: Self::INVALID.to_string(),
                expires_in: None,
            },
        }
    }
}

// --- User info ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileCalendar {
    pub calendar_id: String,
    #[serde(default)]
    pub calendar_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile_calendars: Vec<ProfileCalendar>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CronofyData {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(rename = "cronofy.data", default)]
    pub data: CronofyData,
}

impl UserInfo {
    /// The first calendar of the first profile: the only calendar bookings go to.
    pub fn primary_calendar_id(&self) -> Option<&str> {
        self.data
            .profiles
            .first()
            .and_then(|p| p.profile_calendars.first())
            .map(|c| c.calendar_id.as_str())
    }
}

// --- Real-time scheduling ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthRedirect {
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventTemplate {
    pub event_id: String,
    pub summary: String,
    pub description: String,
    pub tzid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub sub: String,
    pub calendar_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participants {
    pub members: Vec<Member>,
    pub required: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequiredDuration {
    pub minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Availability {
    pub participants: Vec<Participants>,
    pub required_duration: RequiredDuration,
    pub query_periods: Vec<Period>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendee {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetCalendar {
    pub sub: String,
    pub calendar_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee: Option<Attendee>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealTimeSchedulingRequest {
    pub oauth: OAuthRedirect,
    pub event: EventTemplate,
    pub availability: Availability,
    pub target_calendars: Vec<TargetCalendar>,
    pub callback_url: String,
    pub tzid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealTimeScheduling {
    #[serde(default)]
    pub real_time_scheduling_id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealTimeSchedulingResponse {
    pub real_time_scheduling: RealTimeScheduling,
}

// --- Events ---

/// An event as written to the calendar. Times are passed through as the
/// vendor sent them (RFC 3339).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub event_id: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_tzid")]
    pub tzid: String,
}

fn default_tzid() -> String {
    "Etc/UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primary_calendar_is_first_calendar_of_first_profile() {
        let info: UserInfo = serde_json::from_value(json!({
            "sub": "acc_5700a00eb0ccd07000000000",
            "cronofy.data": {
                "profiles": [
                    {
                        "profile_id": "pro_n23kjnwrw2",
                        "profile_name": "example@cronofy.com",
                        "profile_calendars": [
                            {"calendar_id": "cal_n23kjnwrw2_jsdfjksn234", "calendar_name": "Home"},
                            {"calendar_id": "cal_n23kjnwrw2_3nkj23wejk1", "calendar_name": "Work"}
                        ]
                    },
                    {
                        "profile_id": "pro_other",
                        "profile_calendars": [{"calendar_id": "cal_other"}]
                    }
                ]
            }
        }))
        .unwrap();

        assert_eq!(info.primary_calendar_id(), Some("cal_n23kjnwrw2_jsdfjksn234"));
    }

    #[test]
    fn no_profiles_means_no_calendar() {
        let info: UserInfo = serde_json::from_value(json!({"sub": "acc_1"})).unwrap();
        assert_eq!(info.primary_calendar_id(), None);
    }

    #[test]
    fn invalid_placeholder_token() {
        assert_eq!(ElementTokenResponse::invalid().element_token.token, "invalid");
    }

    #[test]
    fn error_classification() {
        assert!(ApiError::InvalidGrant("reused".into()).is_invalid_grant());
        assert!(ApiError::Unauthorized { status: 401, body: String::new() }.is_credential_error());
        assert!(!ApiError::Http("timeout".into()).is_credential_error());
    }

    #[test]
    fn callback_event_defaults_tzid() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "event_id": "rts_demo_event_1",
            "summary": "Demo meeting",
            "start": "2024-12-13T12:00:00Z",
            "end": "2024-12-13T13:00:00Z"
        }))
        .unwrap();
        assert_eq!(event.tzid, "Etc/UTC");
        assert_eq!(event.description, "");
    }
}
