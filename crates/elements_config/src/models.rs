// --- File: crates/elements_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7070
}

// --- Cronofy Config ---
// Secrets are loaded from the plain env vars CLIENT_ID, CLIENT_SECRET and ACCESS_TOKEN.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CronofyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Data center id (`us`, `uk`, `de`, `au`, `ca`, `sg`).
    #[serde(default = "default_data_center")]
    pub data_center: String,
    /// Statically configured bearer token used for calendar calls.
    #[serde(default)]
    pub access_token: String,
    /// Subject of the calendar-owning account.
    #[serde(default)]
    pub sub: String,
    /// Overrides the data-center API host, e.g. for a local mock server.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Overrides the data-center app host used for authorization URLs.
    #[serde(default)]
    pub app_base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CronofyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            data_center: default_data_center(),
            access_token: String::new(),
            sub: String::new(),
            api_base_url: None,
            app_base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_data_center() -> String {
    "us".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// --- Web App Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    /// Origin the element widgets are embedded on; doubles as OAuth redirect URI.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Base URL the vendor calls back when a real-time scheduling slot is booked.
    #[serde(default = "default_callback_url")]
    pub callback_url: String,
    /// IANA zone used to render times on the confirmation page.
    #[serde(default = "default_display_time_zone")]
    pub display_time_zone: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            callback_url: default_callback_url(),
            display_time_zone: default_display_time_zone(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:7070".to_string()
}

fn default_callback_url() -> String {
    "http://localhost:7070/callback-url".to_string()
}

fn default_display_time_zone() -> String {
    "Europe/London".to_string()
}

// --- Scheduling Config ---
// Shared event template and availability window for the real-time scheduling fan-out.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    #[serde(default = "default_event_id_prefix")]
    pub event_id_prefix: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_tzid")]
    pub tzid: String,
    #[serde(default = "default_required_duration_minutes")]
    pub required_duration_minutes: u32,
    /// Number of days, starting tomorrow, offered to the invitee.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_attendee_email")]
    pub attendee_email: String,
    /// Event id used by the manual `/submit` path.
    #[serde(default = "default_submit_event_id")]
    pub submit_event_id: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            event_id_prefix: default_event_id_prefix(),
            summary: default_summary(),
            description: default_description(),
            tzid: default_tzid(),
            required_duration_minutes: default_required_duration_minutes(),
            window_days: default_window_days(),
            attendee_email: default_attendee_email(),
            submit_event_id: default_submit_event_id(),
        }
    }
}

fn default_event_id_prefix() -> String {
    "rts_demo_event".to_string()
}

fn default_summary() -> String {
    "Demo meeting".to_string()
}

fn default_description() -> String {
    "The Cronofy developer demo has created this event".to_string()
}

fn default_tzid() -> String {
    "Etc/UTC".to_string()
}

fn default_required_duration_minutes() -> u32 {
    60
}

fn default_window_days() -> u32 {
    7
}

fn default_attendee_email() -> String {
    "attendee@example.com".to_string()
}

fn default_submit_event_id() -> String {
    "booking_demo_event".to_string()
}

// --- Contacts ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(alias = "phone_number", alias = "phonenumber")]
    pub phone_number: String,
    /// Locale appended to the booking URL, e.g. `en`.
    pub language: String,
}

pub fn default_contacts() -> Vec<Contact> {
    vec![
        Contact {
            id: "1".to_string(),
            name: "Alice Smith".to_string(),
            phone_number: "+44 20 7946 0958".to_string(),
            language: "en".to_string(),
        },
        Contact {
            id: "2".to_string(),
            name: "Bruno Garcia".to_string(),
            phone_number: "+34 91 123 4567".to_string(),
            language: "es".to_string(),
        },
    ]
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cronofy: CronofyConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default = "default_contacts")]
    pub contacts: Vec<Contact>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cronofy: CronofyConfig::default(),
            web: WebConfig::default(),
            scheduling: SchedulingConfig::default(),
            contacts: default_contacts(),
        }
    }
}

impl AppConfig {
    /// Looks a contact up by its id.
    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }
}
