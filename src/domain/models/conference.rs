use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{error::DomainError, models::profile::UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConferenceId(Uuid);

impl ConferenceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse the websafe form handed out to clients
    pub fn parse(websafe_key: &str) -> Result<Self, DomainError> {
        Uuid::try_parse(websafe_key.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidKey(websafe_key.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn websafe(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Largest capacity the directory can store
pub const MAX_ATTENDEES_LIMIT: u32 = i32::MAX as u32;

/// Organizer input for a new conference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConferenceDraft {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_attendees: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    id: ConferenceId,
    organizer_user_id: UserId,
    name: String,
    description: Option<String>,
    topics: Vec<String>,
    city: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    month: u32,
    max_attendees: u32,
    seats_available: u32,
}

impl Conference {
    /// Build a brand new conference with every seat still available
    pub fn create(
        id: ConferenceId,
        organizer_user_id: UserId,
        draft: ConferenceDraft,
    ) -> Result<Self, DomainError> {
        if draft.name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        if draft.max_attendees > MAX_ATTENDEES_LIMIT {
            return Err(DomainError::MaxAttendeesTooLarge(draft.max_attendees));
        }
        if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
            if end < start {
                return Err(DomainError::InvalidDateRange);
            }
        }

        Ok(Self {
            id,
            organizer_user_id,
            name: draft.name,
            description: draft.description,
            topics: draft.topics,
            city: draft.city,
            month: draft.start_date.map_or(0, |date| date.month()),
            start_date: draft.start_date,
            end_date: draft.end_date,
            max_attendees: draft.max_attendees,
            seats_available: draft.max_attendees,
        })
    }

    /// Rebuild a stored conference, refusing records that break the seat invariant
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: ConferenceId,
        organizer_user_id: UserId,
        name: String,
        description: Option<String>,
        topics: Vec<String>,
        city: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        max_attendees: u32,
        seats_available: u32,
    ) -> Result<Self, DomainError> {
        if seats_available > max_attendees {
            return Err(DomainError::CorruptRecord(format!(
                "conference {id} has {seats_available} seats for {max_attendees} attendees"
            )));
        }

        Ok(Self {
            id,
            organizer_user_id,
            name,
            description,
            topics,
            city,
            month: start_date.map_or(0, |date| date.month()),
            start_date,
            end_date,
            max_attendees,
            seats_available,
        })
    }

    pub fn book_seat(&mut self) -> Result<(), DomainError> {
        if self.seats_available == 0 {
            return Err(DomainError::NoCapacity);
        }
        self.seats_available -= 1;
        Ok(())
    }

    pub fn give_back_seat(&mut self) -> Result<(), DomainError> {
        if self.seats_available >= self.max_attendees {
            return Err(DomainError::SeatOverflow);
        }
        self.seats_available += 1;
        Ok(())
    }

    /// Multi-line description used in confirmation mails, one field per line
    pub fn summary(&self) -> String {
        let mut summary = format!("Name: {}", self.name);
        if let Some(city) = &self.city {
            summary.push_str(&format!("\nCity: {city}"));
        }
        if !self.topics.is_empty() {
            summary.push_str(&format!("\nTopics: {}", self.topics.join(", ")));
        }
        if let Some(start) = self.start_date {
            summary.push_str(&format!("\nStart date: {start}"));
        }
        if let Some(end) = self.end_date {
            summary.push_str(&format!("\nEnd date: {end}"));
        }
        summary.push_str(&format!("\nMax attendees: {}", self.max_attendees));
        summary
    }

    pub fn id(&self) -> &ConferenceId {
        &self.id
    }
    pub fn organizer_user_id(&self) -> &UserId {
        &self.organizer_user_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn max_attendees(&self) -> u32 {
        self.max_attendees
    }
    pub fn seats_available(&self) -> u32 {
        self.seats_available
    }
}
