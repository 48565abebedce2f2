// Booking screen state: provider list, the current selection, the day's
// availability and the submission of a new appointment.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::{debug, info, warn};

use crate::api::BookingApi;
use crate::confirmation::Confirmation;
use crate::error::BookingError;
use crate::models::{AppointmentRequest, AvailabilitySlot, Provider};
use crate::selection::Selection;
use crate::slots::{partition, DayPeriods};

pub struct BookingScreen<'a, A: BookingApi> {
    api: &'a A,
    providers: Vec<Provider>,
    selection: Selection,
    availability: Vec<AvailabilitySlot>,
    availability_version: Option<u64>,
    periods: DayPeriods,
}

impl<'a, A: BookingApi> BookingScreen<'a, A> {
    /// Open the screen for a provider on a given day. Nothing is fetched
    /// until `load_providers` / `refresh_availability` are called.
    pub fn new(api: &'a A, provider_id: impl Into<String>, date: NaiveDate) -> Self {
        BookingScreen {
            api,
            providers: Vec::new(),
            selection: Selection::new(provider_id, date),
            availability: Vec::new(),
            availability_version: None,
            periods: DayPeriods::default(),
        }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn periods(&self) -> &DayPeriods {
        &self.periods
    }

    /// False while the shown slots belong to an earlier provider or date,
    /// e.g. after a failed fetch.
    pub fn availability_is_current(&self) -> bool {
        self.availability_version == Some(self.selection.version())
    }

    pub fn load_providers(&mut self) -> Result<&[Provider], BookingError> {
        self.providers = self.api.providers().map_err(BookingError::Providers)?;
        Ok(&self.providers)
    }

    /// Fetch availability for the current provider and date. On failure the
    /// previous availability stays on screen and the error is returned.
    pub fn refresh_availability(&mut self) -> Result<(), BookingError> {
        let version = self.selection.version();
        let slots = self
            .api
            .day_availability(self.selection.provider_id(), self.selection.date())
            .map_err(|err| {
                warn!(error = %err, "availability request failed, keeping previous slots");
                BookingError::Availability(err)
            })?;
        self.apply_availability(version, slots);
        Ok(())
    }

    /// Install a fetched slot list if it still answers the current
    /// selection. Returns false when the response was stale and dropped.
    pub fn apply_availability(&mut self, version: u64, slots: Vec<AvailabilitySlot>) -> bool {
        if version != self.selection.version() {
            debug!(
                response = version,
                current = self.selection.version(),
                "dropping stale availability"
            );
            return false;
        }
        self.periods = partition(&slots);
        self.availability = slots;
        self.availability_version = Some(version);
        true
    }

    pub fn select_provider(&mut self, provider_id: &str) -> Result<(), BookingError> {
        if self.selection.select_provider(provider_id) {
            self.refresh_availability()?;
        }
        Ok(())
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.selection.select_date(date);
        self.refresh_availability()
    }

    /// Only hours the current availability marks as bookable are accepted.
    pub fn select_hour(&mut self, hour: u32) -> Result<(), BookingError> {
        if !self.availability_is_current() {
            return Err(BookingError::StaleAvailability {
                date: self.selection.date(),
            });
        }
        let bookable = self
            .availability
            .iter()
            .any(|slot| slot.hour == hour && slot.available);
        if !bookable {
            return Err(BookingError::HourUnavailable(hour));
        }
        self.selection.select_hour(hour);
        Ok(())
    }

    /// Book the selected slot. Without a chosen hour this does nothing and
    /// returns `Ok(None)`.
    pub fn submit(&self) -> Result<Option<Confirmation>, BookingError> {
        let hour = match self.selection.hour() {
            Some(hour) => hour,
            None => return Ok(None),
        };
        let date = appointment_timestamp(self.selection.date(), hour)?;
        let req = AppointmentRequest {
            provider_id: self.selection.provider_id().to_string(),
            date,
        };

        self.api.create_appointment(&req).map_err(|err| {
            warn!(error = %err, "appointment creation failed");
            BookingError::Creation(err)
        })?;
        info!(provider_id = %req.provider_id, date = %req.date, "appointment created");

        Ok(Some(Confirmation::new(req.provider_id, req.date)))
    }
}

/// Local timestamp for `hour:00:00` on `date`. Ambiguous local times take
/// the earlier instant; nonexistent ones are an error.
pub fn appointment_timestamp(date: NaiveDate, hour: u32) -> Result<DateTime<Local>, BookingError> {
    date.and_hms_opt(hour, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or(BookingError::InvalidTimestamp { date, hour })
}
