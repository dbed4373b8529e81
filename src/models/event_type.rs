use serde::Serialize;

/// Participation event a student can be awarded points for.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum EventType {
    #[serde(rename = "meeting")]
    Meeting,
    #[serde(rename = "guestSpeaker")]
    GuestSpeaker,
    #[serde(rename = "cfe")]
    Cfe,
    #[serde(rename = "combo")]
    Combo,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Meeting,
        EventType::GuestSpeaker,
        EventType::Cfe,
        EventType::Combo,
    ];

    /// Parse the wire name used by the API (`meeting`, `guestSpeaker`, ...).
    /// Matching is exact.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "meeting" => Some(EventType::Meeting),
            "guestSpeaker" => Some(EventType::GuestSpeaker),
            "cfe" => Some(EventType::Cfe),
            "combo" => Some(EventType::Combo),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::GuestSpeaker => "guestSpeaker",
            EventType::Cfe => "cfe",
            EventType::Combo => "combo",
        }
    }

    /// Counter bumped when this event is awarded.
    pub fn counter(&self) -> CounterField {
        match self {
            EventType::Meeting => CounterField::Meetings,
            EventType::GuestSpeaker => CounterField::GuestSpeaker,
            EventType::Cfe => CounterField::Cfe,
            EventType::Combo => CounterField::Combo,
        }
    }
}

/// One of the four per-student event counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    Meetings,
    GuestSpeaker,
    Cfe,
    Combo,
}

impl CounterField {
    /// Column name, shared by the SQLite schema and the Supabase table.
    pub fn column(&self) -> &'static str {
        match self {
            CounterField::Meetings => "meetings",
            CounterField::GuestSpeaker => "guestSpeaker",
            CounterField::Cfe => "cfe",
            CounterField::Combo => "combo",
        }
    }
}
