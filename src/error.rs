use reqwest::StatusCode;
use thiserror::Error;

use crate::profile::FieldErrors;

/// Failures of a single HTTP call against the backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("could not read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("could not load availability: {0}")]
    Availability(#[source] ApiError),

    #[error("could not load providers: {0}")]
    Providers(#[source] ApiError),

    #[error("{0:02}:00 is not available")]
    HourUnavailable(u32),

    #[error("hours for {date} are not loaded yet, refresh before choosing one")]
    StaleAvailability { date: chrono::NaiveDate },

    #[error("{date} at {hour:02}:00 does not exist in the local time zone")]
    InvalidTimestamp { date: chrono::NaiveDate, hour: u32 },

    #[error("could not create the appointment, please try again")]
    Creation(#[source] ApiError),
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("the form has invalid fields:\n{0}")]
    Validation(FieldErrors),

    #[error("could not update the profile, please try again")]
    Update(#[source] ApiError),

    #[error("could not update the avatar: {0}")]
    Avatar(#[source] ApiError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("could not sign in: {0}")]
    SignIn(#[source] ApiError),

    #[error("session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("could not encode session: {0}")]
    Encode(#[source] serde_json::Error),
}
