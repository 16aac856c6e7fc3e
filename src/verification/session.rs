//! Challenge/response session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Out-of-band channel the one-time code is delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Sms,
    Email,
    App,
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryChannel::Sms => "sms",
            DeliveryChannel::Email => "email",
            DeliveryChannel::App => "app",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for DeliveryChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sms" => Ok(DeliveryChannel::Sms),
            "email" => Ok(DeliveryChannel::Email),
            "app" => Ok(DeliveryChannel::App),
            other => Err(format!("unknown delivery channel '{other}'")),
        }
    }
}

/// A live challenge. `subject_key` references the account or identity being verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    pub session_id: String,
    pub subject_key: String,
    pub channel: DeliveryChannel,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub max_attempts: u32,
}

impl VerificationSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_locked(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Usable while unexpired with attempts left.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_locked()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}
