use chrono::{DateTime, Local};

/// What the confirmation view shows after a booking went through.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub provider_id: String,
    pub date: DateTime<Local>,
}

impl Confirmation {
    pub fn new(provider_id: impl Into<String>, date: DateTime<Local>) -> Self {
        Confirmation {
            provider_id: provider_id.into(),
            date,
        }
    }

    pub fn title(&self) -> &'static str {
        "Appointment booked"
    }

    /// Long form of the booked time, e.g. `Sunday, March 10, 2024 at 14:00h`.
    pub fn describe(&self) -> String {
        self.date.format("%A, %B %d, %Y at %H:%Mh").to_string()
    }
}
