// Wire types shared by the API client and the screens. Field names follow
// the backend's snake_case JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A professional that can be booked. Read-only list data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One hour of a provider's day as reported by
/// `providers/{id}/day-availability`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub hour: u32,
    pub available: bool,
}

/// Body of `POST appointments`. Only built by the booking screen once an
/// hour has been chosen.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AppointmentRequest {
    pub provider_id: String,
    pub date: DateTime<Local>,
}

/// Created appointment. The backend returns more fields; we only keep what
/// the confirmation view needs.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub provider_id: String,
    pub date: DateTime<Local>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `PUT /profile`. The password fields are left out of the JSON
/// entirely when no password change is requested.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
}

/// Login request payload.
#[derive(Serialize, Debug)]
pub struct SessionRequest {
    pub email: String,
    pub password: String,
}

/// Expected response from `POST sessions`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}
