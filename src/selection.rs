use chrono::NaiveDate;

/// The user's in-progress choice before booking.
///
/// `version` goes up every time provider or date changes, so a response to
/// an availability request can be matched against the selection that asked
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    provider_id: String,
    date: NaiveDate,
    hour: Option<u32>,
    version: u64,
}

impl Selection {
    pub fn new(provider_id: impl Into<String>, date: NaiveDate) -> Self {
        Selection {
            provider_id: provider_id.into(),
            date,
            hour: None,
            version: 0,
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Switch provider. A different provider invalidates the chosen hour;
    /// re-selecting the current one changes nothing. Returns whether
    /// availability has to be fetched again.
    pub fn select_provider(&mut self, provider_id: &str) -> bool {
        if self.provider_id == provider_id {
            return false;
        }
        self.provider_id = provider_id.to_string();
        self.hour = None;
        self.version += 1;
        true
    }

    /// Switch day. The hour is always cleared, even for the same date.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.hour = None;
        self.version += 1;
    }

    pub fn select_hour(&mut self, hour: u32) {
        self.hour = Some(hour);
    }
}
