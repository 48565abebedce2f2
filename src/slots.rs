use crate::models::AvailabilitySlot;

/// First hour that belongs to the afternoon half of the day.
pub const NOON: u32 = 12;

/// A slot ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourSlot {
    pub hour: u32,
    pub label: String,
    pub available: bool,
}

impl HourSlot {
    fn from_slot(slot: &AvailabilitySlot) -> Self {
        HourSlot {
            hour: slot.hour,
            label: hour_label(slot.hour),
            available: slot.available,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayPeriods {
    pub morning: Vec<HourSlot>,
    pub afternoon: Vec<HourSlot>,
}

impl DayPeriods {
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }

    /// Both halves, morning first.
    pub fn iter(&self) -> impl Iterator<Item = &HourSlot> {
        self.morning.iter().chain(self.afternoon.iter())
    }
}

/// Zero-padded `HH:00`.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Split the backend's slot list at noon. Order inside each half follows the
/// input.
pub fn partition(slots: &[AvailabilitySlot]) -> DayPeriods {
    let (morning, afternoon): (Vec<_>, Vec<_>) = slots
        .iter()
        .map(HourSlot::from_slot)
        .partition(|slot| slot.hour < NOON);
    DayPeriods { morning, afternoon }
}
