// API client module: a small blocking HTTP client that talks to the booking
// backend. Every screen goes through one of the traits below so the screen
// logic can be exercised against an in-memory fake.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentRequest, AvailabilitySlot, ProfileUpdate, Provider, SessionRequest,
    SessionResponse, User,
};

/// Calls made by the booking screen.
pub trait BookingApi {
    fn providers(&self) -> Result<Vec<Provider>, ApiError>;

    fn day_availability(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, ApiError>;

    fn create_appointment(&self, req: &AppointmentRequest) -> Result<Appointment, ApiError>;
}

/// Calls made by the profile screen.
pub trait ProfileApi {
    fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    fn update_avatar(&self, user_id: &str, image: &Path) -> Result<User, ApiError>;
}

/// Holds a reqwest blocking client, the base URL of the backend and an
/// optional bearer token for authenticated calls.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(ApiClient {
            client,
            base_url: config.api_url.clone(),
            token: None,
        })
    }

    /// Store a token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sign in with e-mail and password. The token is not stored here; the
    /// caller decides whether to keep the session.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub fn sign_in(&self, req: &SessionRequest) -> Result<SessionResponse, ApiError> {
        let res = self
            .client
            .post(self.url("sessions"))
            .json(req)
            .send()
            .map_err(ApiError::Transport)?;
        read_json(res)
    }
}

impl BookingApi for ApiClient {
    #[instrument(skip(self))]
    fn providers(&self) -> Result<Vec<Provider>, ApiError> {
        let res = self
            .authorized(self.client.get(self.url("providers")))
            .send()
            .map_err(ApiError::Transport)?;
        read_json(res)
    }

    #[instrument(skip(self))]
    fn day_availability(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, ApiError> {
        let url = self.url(&format!("providers/{}/day-availability", provider_id));
        let query = [
            ("year", date.year().to_string()),
            ("month", date.month().to_string()),
            ("day", date.day().to_string()),
        ];
        let res = self
            .authorized(self.client.get(url).query(&query))
            .send()
            .map_err(ApiError::Transport)?;
        let slots: Vec<AvailabilitySlot> = read_json(res)?;
        debug!(count = slots.len(), "availability loaded");
        Ok(slots)
    }

    #[instrument(skip(self, req), fields(provider_id = %req.provider_id, date = %req.date))]
    fn create_appointment(&self, req: &AppointmentRequest) -> Result<Appointment, ApiError> {
        let res = self
            .authorized(self.client.post(self.url("appointments")).json(req))
            .send()
            .map_err(ApiError::Transport)?;
        read_json(res)
    }
}

impl ProfileApi for ApiClient {
    #[instrument(skip(self, update))]
    fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let res = self
            .authorized(self.client.put(self.url("/profile")).json(update))
            .send()
            .map_err(ApiError::Transport)?;
        read_json(res)
    }

    /// Upload a new avatar as multipart/form-data. The part is always sent
    /// as `{user_id}.jpg` with an `image/jpeg` content type.
    #[instrument(skip(self))]
    fn update_avatar(&self, user_id: &str, image: &Path) -> Result<User, ApiError> {
        let bytes = std::fs::read(image).map_err(|source| ApiError::File {
            path: image.display().to_string(),
            source,
        })?;
        let part = multipart::Part::bytes(bytes)
            .file_name(format!("{}.jpg", user_id))
            .mime_str("image/jpeg")
            .map_err(ApiError::Transport)?;
        let form = multipart::Form::new().part("avatar", part);

        let res = self
            .authorized(self.client.patch(self.url("/users/avatar")).multipart(form))
            .send()
            .map_err(ApiError::Transport)?;
        read_json(res)
    }
}

fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    res.json().map_err(ApiError::Decode)
}
