use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    models::{conference::ConferenceId, identity::Identity},
};

pub type DisplayName = String;

/// Stable identifier handed out by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidKey("empty user id".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
    Xxxl,
}

impl TeeShirtSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeeShirtSize::NotSpecified => "NOT_SPECIFIED",
            TeeShirtSize::Xs => "XS",
            TeeShirtSize::S => "S",
            TeeShirtSize::M => "M",
            TeeShirtSize::L => "L",
            TeeShirtSize::Xl => "XL",
            TeeShirtSize::Xxl => "XXL",
            TeeShirtSize::Xxxl => "XXXL",
        }
    }
}

impl FromStr for TeeShirtSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_SPECIFIED" => Ok(TeeShirtSize::NotSpecified),
            "XS" => Ok(TeeShirtSize::Xs),
            "S" => Ok(TeeShirtSize::S),
            "M" => Ok(TeeShirtSize::M),
            "L" => Ok(TeeShirtSize::L),
            "XL" => Ok(TeeShirtSize::Xl),
            "XXL" => Ok(TeeShirtSize::Xxl),
            "XXXL" => Ok(TeeShirtSize::Xxxl),
            other => Err(DomainError::CorruptRecord(format!("unknown shirt size {other}"))),
        }
    }
}

/// A user's identity-linked record and the set of conferences they attend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    user_id: UserId,
    display_name: DisplayName,
    main_email: String,
    tee_shirt_size: TeeShirtSize,
    conference_keys_to_attend: BTreeSet<ConferenceId>,
}

impl Profile {
    /// Create a fresh profile, filling absent fields with their defaults
    pub fn new(
        user_id: UserId,
        display_name: Option<DisplayName>,
        main_email: String,
        tee_shirt_size: Option<TeeShirtSize>,
    ) -> Self {
        let display_name = display_name.unwrap_or_else(|| default_display_name(&main_email));
        Self {
            user_id,
            display_name,
            main_email,
            tee_shirt_size: tee_shirt_size.unwrap_or_default(),
            conference_keys_to_attend: BTreeSet::new(),
        }
    }

    /// Profile created on first interaction of an authenticated caller
    pub fn from_identity(identity: &Identity) -> Self {
        Self::new(identity.user_id().clone(), None, identity.email().to_string(), None)
    }

    pub fn reconstruct(
        user_id: UserId,
        display_name: DisplayName,
        main_email: String,
        tee_shirt_size: TeeShirtSize,
        conference_keys_to_attend: BTreeSet<ConferenceId>,
    ) -> Self {
        Self {
            user_id,
            display_name,
            main_email,
            tee_shirt_size,
            conference_keys_to_attend,
        }
    }

    pub fn update(&mut self, display_name: Option<DisplayName>, tee_shirt_size: Option<TeeShirtSize>) {
        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(tee_shirt_size) = tee_shirt_size {
            self.tee_shirt_size = tee_shirt_size;
        }
    }

    pub fn is_attending(&self, conference_id: &ConferenceId) -> bool {
        self.conference_keys_to_attend.contains(conference_id)
    }

    pub fn attend(&mut self, conference_id: ConferenceId) -> Result<(), DomainError> {
        if !self.conference_keys_to_attend.insert(conference_id) {
            return Err(DomainError::AlreadyRegistered);
        }
        Ok(())
    }

    pub fn unattend(&mut self, conference_id: &ConferenceId) -> Result<(), DomainError> {
        if !self.conference_keys_to_attend.remove(conference_id) {
            return Err(DomainError::NotRegistered);
        }
        Ok(())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn main_email(&self) -> &str {
        &self.main_email
    }
    pub fn tee_shirt_size(&self) -> TeeShirtSize {
        self.tee_shirt_size
    }
    pub fn conference_keys_to_attend(&self) -> &BTreeSet<ConferenceId> {
        &self.conference_keys_to_attend
    }
}

/// "lemoncake@example.com" becomes "lemoncake"
fn default_display_name(email: &str) -> String {
    email.split_once('@').map_or(email, |(local, _)| local).to_string()
}
