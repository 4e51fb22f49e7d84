use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type EntityId = u64;

/// Read-only view of one conference, as supplied by the program data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceSnapshot {
    pub acronym: String,
    #[serde(default)]
    pub program_export_base_url: Option<String>,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub people: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    New,
    Review,
    Withdrawn,
    Unconfirmed,
    Confirmed,
    Canceled,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    pub public: bool,
    pub state: EventState,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub room: Option<String>,
}

impl Event {
    pub fn is_confirmed(&self) -> bool {
        self.state == EventState::Confirmed
    }

    /// Scheduled means placed in both time and room.
    pub fn is_scheduled(&self) -> bool {
        self.start_time.is_some() && self.room.is_some()
    }

    /// Whether the event gets its own exported pages.
    pub fn is_exported(&self) -> bool {
        self.public && self.is_confirmed() && self.is_scheduled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    Submitter,
    Speaker,
    Moderator,
    Coordinator,
    Assistant,
}

impl EventRole {
    pub fn is_on_stage(self) -> bool {
        matches!(self, EventRole::Speaker | EventRole::Moderator)
    }
}

/// Whether a person has agreed to take part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleState {
    Idea,
    Offer,
    #[default]
    Unclear,
    Confirmed,
    Attending,
    Declined,
    Canceled,
}

impl RoleState {
    pub fn is_confirmed(self) -> bool {
        matches!(self, RoleState::Confirmed | RoleState::Attending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParticipation {
    pub event_id: EntityId,
    pub role: EventRole,
    /// Missing in the document means not yet confirmed.
    #[serde(default)]
    pub role_state: RoleState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub public_name: String,
    #[serde(default)]
    pub participations: Vec<EventParticipation>,
}

impl ConferenceSnapshot {
    pub fn event(&self, id: EntityId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// A person speaks publicly when they are on stage (speaker or moderator)
    /// in at least one public, confirmed event of this conference and have
    /// confirmed that participation.
    pub fn speaks_publicly(&self, person: &Person) -> bool {
        person.participations.iter().any(|participation| {
            participation.role.is_on_stage()
                && participation.role_state.is_confirmed()
                && self
                    .event(participation.event_id)
                    .is_some_and(|event| event.public && event.is_confirmed())
        })
    }
}
