// File: crates/elements_booking/src/logic.rs
//! Booking orchestration: OAuth bootstrap, element tokens, the real-time
//! scheduling fan-out and callback-driven confirmation.
//!
//! Every vendor call is awaited in turn. Most failures are logged and
//! absorbed where they happen; only the request paths that must report a
//! failure return `ElementsError`.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use elements_common::services::{
    AccessTokenRequest, AccessTokenResponse, ApiError, Attendee, Availability, CalendarEvent,
    ElementTokenRequest, ElementTokenResponse, EventTemplate, Member, OAuthRedirect,
    Participants, Period, RealTimeSchedulingRequest, RequiredDuration, SchedulingApi,
    TargetCalendar,
};
use elements_common::{config_error, internal_error, log_error, validation_error, ElementsError};
use elements_config::{AppConfig, Contact};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{error, info, warn};

/// Element token version requested for every widget.
pub const ELEMENT_TOKEN_VERSION: &str = "1";
/// Permissions for the landing page widgets.
pub const HOME_PERMISSIONS: [&str; 3] = ["managed_availability", "account_management", "agenda"];
/// Permissions for the availability viewer.
pub const AVAILABILITY_PERMISSIONS: [&str; 1] = ["availability"];

/// How a vendor failure was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Stale, reused or mismatched authorization code; logged as a warning.
    InvalidGrant,
    /// Rejected credentials; logged as an error banner.
    Credential,
    Other,
}

impl FailureKind {
    pub fn of(err: &ApiError) -> Self {
        if err.is_invalid_grant() {
            FailureKind::InvalidGrant
        } else if err.is_credential_error() {
            FailureKind::Credential
        } else {
            FailureKind::Other
        }
    }
}

/// Logs a vendor failure with the wording its class deserves.
pub fn log_api_failure(context: &str, err: &ApiError) -> FailureKind {
    let kind = FailureKind::of(err);
    match kind {
        FailureKind::InvalidGrant => warn!(
            "{}: invalid_grant. The code is stale or was already redeemed, or the redirect URI differs from ORIGIN. {}",
            context, err
        ),
        FailureKind::Credential => {
            error!("🛑 ================================================================ 🛑");
            error!("🛑 {}: Cronofy rejected the credentials.", context);
            error!("🛑 Check CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN and SUB in .env");
            error!("🛑 {}", err);
            error!("🛑 ================================================================ 🛑");
        }
        FailureKind::Other => log_error(err, context),
    }
    kind
}

/// Redeems an authorization code. A failure is logged and reported back only
/// as its [`FailureKind`], so the page can still render.
pub async fn exchange_code(
    api: &dyn SchedulingApi,
    config: &AppConfig,
    code: &str,
) -> Result<AccessTokenResponse, FailureKind> {
    let request = AccessTokenRequest {
        client_id: config.cronofy.client_id.clone(),
        client_secret: config.cronofy.client_secret.clone(),
        grant_type: "authorization_code".to_string(),
        code: code.to_string(),
        redirect_uri: config.web.origin.clone(),
    };

    match api.request_access_token(request).await {
        Ok(token) => {
            info!(
                access_token = %token.access_token,
                token_type = %token.token_type,
                sub = ?token.sub,
                scope = ?token.scope,
                "Authorization code redeemed"
            );
            Ok(token)
        }
        Err(e) => Err(log_api_failure("Authorization code exchange failed", &e)),
    }
}

/// Requests an element token for the configured subject and origin, falling
/// back to the `"invalid"` placeholder so the page still renders.
pub async fn element_token(
    api: &dyn SchedulingApi,
    config: &AppConfig,
    permissions: &[&str],
) -> ElementTokenResponse {
    let request = ElementTokenRequest {
        version: ELEMENT_TOKEN_VERSION.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        subs: vec![config.cronofy.sub.clone()],
        origin: config.web.origin.clone(),
    };

    match api.request_element_token(request).await {
        Ok(token) => token,
        Err(e) => {
            log_api_failure("Element token request failed", &e);
            ElementTokenResponse::invalid()
        }
    }
}

/// The calendar every booking goes to. Looked up on each call, never cached.
pub async fn primary_calendar_id(api: &dyn SchedulingApi) -> Result<String, ApiError> {
    let info = api.user_info().await?;
    info.primary_calendar_id()
        .map(str::to_string)
        .ok_or(ApiError::NoCalendar)
}

/// `base?id=<contact id>`, keeping any query string `base` already has.
pub fn callback_url_for(base: &str, contact_id: &str) -> String {
    let query = serde_urlencoded::to_string([("id", contact_id)]).unwrap_or_default();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query)
}

/// Offered window: from tomorrow 00:00 UTC for `window_days` days.
pub fn availability_window(now: DateTime<Utc>, window_days: u32) -> Period {
    let start = (now + Duration::days(1))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();
    Period {
        start,
        end: start + Duration::days(i64::from(window_days.max(1))),
    }
}

/// Builds the real-time scheduling request for one contact.
pub fn build_scheduling_request(
    config: &AppConfig,
    calendar_id: &str,
    contact: &Contact,
    window: &Period,
) -> RealTimeSchedulingRequest {
    let scheduling = &config.scheduling;
    let sub = config.cronofy.sub.clone();

    RealTimeSchedulingRequest {
        oauth: OAuthRedirect {
            redirect_uri: config.web.origin.clone(),
        },
        event: EventTemplate {
            event_id: format!("{}_{}", scheduling.event_id_prefix, contact.id),
            summary: scheduling.summary.clone(),
            description: scheduling.description.clone(),
            tzid: scheduling.tzid.clone(),
        },
        availability: Availability {
            participants: vec![Participants {
                members: vec![Member {
                    sub: sub.clone(),
                    calendar_ids: vec![calendar_id.to_string()],
                }],
                required: "all".to_string(),
            }],
            required_duration: RequiredDuration {
                minutes: scheduling.required_duration_minutes,
            },
            query_periods: vec![window.clone()],
        },
        target_calendars: vec![TargetCalendar {
            sub,
            calendar_id: calendar_id.to_string(),
            attendee: Some(Attendee {
                email: scheduling.attendee_email.clone(),
                display_name: contact.name.clone(),
            }),
        }],
        callback_url: callback_url_for(&config.web.callback_url, &contact.id),
        tzid: scheduling.tzid.clone(),
    }
}

/// What the fan-out returns to the browser.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleOutcome {
    pub message: String,
    pub urls: Vec<String>,
    pub contacts: Vec<Contact>,
}

/// Per-contact result, filled independently so one failure cannot abort the loop.
#[derive(Debug)]
struct ContactResult<'a> {
    contact: &'a Contact,
    url: Option<String>,
}

/// Starts one real-time scheduling flow per contact, in list order, one at a time.
///
/// Fails only when the calendar cannot be resolved or no contact got a URL.
pub async fn schedule_contacts(
    api: &dyn SchedulingApi,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome, ElementsError> {
    let calendar_id = primary_calendar_id(api).await.map_err(|e| {
        log_api_failure("Could not resolve target calendar", &e);
        internal_error(format!("Failed to schedule events: {}", e))
    })?;
    let window = availability_window(now, config.scheduling.window_days);

    let mut results = Vec::with_capacity(config.contacts.len());
    for contact in &config.contacts {
        let request = build_scheduling_request(config, &calendar_id, contact, &window);
        let url = match api.real_time_scheduling(request).await {
            Ok(response) => {
                let url = format!(
                    "{}?locale={}",
                    response.real_time_scheduling.url, contact.language
                );
                info!("Real-time scheduling for {} ready: {}", contact.name, url);
                Some(url)
            }
            Err(e) => {
                log_api_failure(
                    &format!("Real-time scheduling for contact {} failed", contact.id),
                    &e,
                );
                None
            }
        };
        results.push(ContactResult { contact, url });
    }

    let (urls, contacts): (Vec<String>, Vec<Contact>) = results
        .into_iter()
        .filter_map(|r| r.url.map(|url| (url, r.contact.clone())))
        .unzip();

    if urls.is_empty() {
        error!(
            "Real-time scheduling failed for all {} contacts",
            config.contacts.len()
        );
        return Err(internal_error("Failed to schedule events for any contact"));
    }

    Ok(ScheduleOutcome {
        message: format!("Events scheduled successfully\n{}", urls.join("\n")),
        urls,
        contacts,
    })
}

/// Finds the contact a callback belongs to. Absent or unknown ids are rejected
/// instead of being attributed to somebody.
pub fn resolve_contact<'a>(
    config: &'a AppConfig,
    id: Option<&str>,
) -> Result<&'a Contact, ElementsError> {
    let id = id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| validation_error("Missing contact id"))?;
    config
        .contact(id)
        .ok_or_else(|| validation_error(format!("Unknown contact id: {}", id)))
}

/// Writes a booked slot to the calendar, naming the contact in the summary.
pub async fn confirm_booking(
    api: &dyn SchedulingApi,
    contact: &Contact,
    mut event: CalendarEvent,
) -> Result<(), ElementsError> {
    let calendar_id = primary_calendar_id(api).await.map_err(|e| {
        log_api_failure("Could not resolve target calendar for callback", &e);
        ElementsError::from(e)
    })?;

    event.summary = format!("{} with {}", event.summary, contact.name);
    let event_id = event.event_id.clone();
    api.create_event(&calendar_id, event).await.map_err(|e| {
        log_api_failure(&format!("Writing event {} failed", event_id), &e);
        ElementsError::from(e)
    })?;

    info!("Event {} confirmed for {}", event_id, contact.name);
    Ok(())
}

/// A slot picked in the availability viewer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Parses the `slot` query parameter (`{"start": ..., "end": ...}`).
pub fn parse_slot(raw: Option<&str>) -> Result<Slot, ElementsError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| validation_error("Missing slot"))?;
    let slot: Slot = serde_json::from_str(raw)?;
    if slot.end <= slot.start {
        return Err(validation_error("Slot end must be after its start"));
    }
    Ok(slot)
}

/// Values shown on the confirmation page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub meeting_date: String,
    pub start: String,
    pub end: String,
}

pub fn display_time_zone(config: &AppConfig) -> Result<Tz, ElementsError> {
    Tz::from_str(&config.web.display_time_zone).map_err(|_| {
        config_error(format!(
            "Unknown display time zone: {}",
            config.web.display_time_zone
        ))
    })
}

pub fn format_confirmation(slot: &Slot, tz: Tz) -> Confirmation {
    let start = slot.start.with_timezone(&tz);
    let end = slot.end.with_timezone(&tz);
    Confirmation {
        meeting_date: start.format("%-d %b %Y").to_string(),
        start: start.format("%H:%M").to_string(),
        end: end.format("%H:%M").to_string(),
    }
}

/// Books a manually picked slot under the fixed submit event id.
pub async fn submit_slot(
    api: &dyn SchedulingApi,
    config: &AppConfig,
    slot: &Slot,
) -> Result<Confirmation, ElementsError> {
    let tz = display_time_zone(config)?;
    let calendar_id = primary_calendar_id(api).await.map_err(|e| {
        log_api_failure("Could not resolve target calendar for submit", &e);
        ElementsError::from(e)
    })?;

    let scheduling = &config.scheduling;
    let event = CalendarEvent {
        event_id: scheduling.submit_event_id.clone(),
        summary: scheduling.summary.clone(),
        description: scheduling.description.clone(),
        start: slot.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        end: slot.end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        tzid: scheduling.tzid.clone(),
    };
    api.create_event(&calendar_id, event).await.map_err(|e| {
        log_api_failure("Creating submitted event failed", &e);
        ElementsError::from(e)
    })?;

    Ok(format_confirmation(slot, tz))
}

/// Recording mock of the scheduling API for tests.
#[cfg(test)]
pub mod mock {
    use elements_common::services::{
        AccessTokenRequest, AccessTokenResponse, ApiError, BoxFuture, CalendarEvent, CronofyData,
        ElementToken, ElementTokenRequest, ElementTokenResponse, Profile, ProfileCalendar,
        RealTimeScheduling, RealTimeSchedulingRequest, RealTimeSchedulingResponse, SchedulingApi,
        UserInfo,
    };
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Succeeds by default; individual operations can be switched to fail.
    #[derive(Default)]
    pub struct MockSchedulingApi {
        pub token_error: Option<ApiError>,
        pub element_token_error: Option<ApiError>,
        pub user_info_error: Option<ApiError>,
        pub no_calendars: bool,
        pub create_event_error: Option<ApiError>,
        /// Callback URLs whose scheduling request should fail.
        pub failing_callbacks: HashSet<String>,
        pub token_requests: Mutex<Vec<AccessTokenRequest>>,
        pub element_token_requests: Mutex<Vec<ElementTokenRequest>>,
        pub scheduling_requests: Mutex<Vec<RealTimeSchedulingRequest>>,
        pub created_events: Mutex<Vec<(String, CalendarEvent)>>,
    }

    impl MockSchedulingApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_scheduling_for(mut self, callback_url: &str) -> Self {
            self.failing_callbacks.insert(callback_url.to_string());
            self
        }
    }

    impl SchedulingApi for MockSchedulingApi {
        fn request_access_token(
            &self,
            request: AccessTokenRequest,
        ) -> BoxFuture<'_, AccessTokenResponse, ApiError> {
            Box::pin(async move {
                self.token_requests.lock().unwrap().push(request);
                match &self.token_error {
                    Some(e) => Err(e.clone()),
                    None => Ok(AccessTokenResponse {
                        token_type: "bearer".to_string(),
                        access_token: "mock_access_token".to_string(),
                        expires_in: Some(3600),
                        refresh_token: Some("mock_refresh".to_string()),
                        scope: Some("read_write".to_string()),
                        sub: Some("acc_mock".to_string()),
                    }),
                }
            })
        }

        fn request_element_token(
            &self,
            request: ElementTokenRequest,
        ) -> BoxFuture<'_, ElementTokenResponse, ApiError> {
            Box::pin(async move {
                let permissions = request.permissions.clone();
                let origin = request.origin.clone();
                self.element_token_requests.lock().unwrap().push(request);
                match &self.element_token_error {
                    Some(e) => Err(e.clone()),
                    None => Ok(ElementTokenResponse {
                        element_token: ElementToken {
                            token: format!("token_{}", permissions.join("+")),
                            permissions,
                            origin: Some(origin),
                            expires_in: Some(64800),
                        },
                    }),
                }
            })
        }

        fn user_info(&self) -> BoxFuture<'_, UserInfo, ApiError> {
            Box::pin(async move {
                if let Some(e) = &self.user_info_error {
                    return Err(e.clone());
                }
                let profiles = if self.no_calendars {
                    Vec::new()
                } else {
                    vec![Profile {
                        profile_id: Some("pro_mock".to_string()),
                        profile_name: None,
                        profile_calendars: vec![
                            ProfileCalendar {
                                calendar_id: "cal_primary".to_string(),
                                calendar_name: Some("Primary".to_string()),
                            },
                            ProfileCalendar {
                                calendar_id: "cal_secondary".to_string(),
                                calendar_name: None,
                            },
                        ],
                    }]
                };
                Ok(UserInfo {
                    sub: Some("acc_mock".to_string()),
                    data: CronofyData { profiles },
                })
            })
        }

        fn real_time_scheduling(
            &self,
            request: RealTimeSchedulingRequest,
        ) -> BoxFuture<'_, RealTimeSchedulingResponse, ApiError> {
            Box::pin(async move {
                let fail = self.failing_callbacks.contains(&request.callback_url);
                let n = {
                    let mut requests = self.scheduling_requests.lock().unwrap();
                    requests.push(request);
                    requests.len()
                };
                if fail {
                    return Err(ApiError::Rejected {
                        status: 422,
                        body: r#"{"errors":{}}"#.to_string(),
                    });
                }
                Ok(RealTimeSchedulingResponse {
                    real_time_scheduling: RealTimeScheduling {
                        real_time_scheduling_id: Some(format!("sch_{}", n)),
                        url: format!("https://app.cronofy.com/rts/{}", n),
                        status: Some("open".to_string()),
                    },
                })
            })
        }

        fn create_event(
            &self,
            calendar_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, (), ApiError> {
            let calendar_id = calendar_id.to_string();
            Box::pin(async move {
                if let Some(e) = &self.create_event_error {
                    return Err(e.clone());
                }
                self.created_events
                    .lock()
                    .unwrap()
                    .push((calendar_id, event));
                Ok(())
            })
        }
    }
}
