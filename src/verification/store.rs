//! Time-bounded, attempt-limited challenge sessions.
//!
//! # State Transitions
//! ```text
//! Absent  → request_challenge → Issued (attempts = 0)
//! Issued  → validate, unknown id        → error Unknown      (Absent)
//! Issued  → validate, now > expires_at  → error Expired      (Absent, removed)
//! Issued  → validate, attempts spent    → error Locked       (Absent, removed)
//! Issued  → validate, remote accepts    → verified           (Absent, consumed)
//! Issued  → validate, remote rejects    → not verified       (Issued, attempts + 1)
//! ```
//!
//! The attempt counter is bumped under the map's shard lock before the remote
//! check is awaited, so concurrent validations cannot exceed the budget.
//! Issuing a challenge swaps the subject's index entry and the live session
//! while holding that entry, so a subject never has two live sessions.
//! Lock order is always subject index, then sessions.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::mem;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::cache::Sweepable;
use crate::config::VerificationConfig;
use crate::error::ClientError;
use crate::observability::metrics;
use crate::verification::session::{DeliveryChannel, VerificationSession};
use crate::verification::transport::ChallengeTransport;

/// Why a challenge could not be issued or validated.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid or expired session")]
    Unknown,

    #[error("code expired")]
    Expired,

    #[error("maximum attempts exceeded")]
    Locked { attempts: u32 },

    #[error("code delivery failed: {0}")]
    Delivery(#[source] ClientError),

    #[error("remote validation failed: {0}")]
    Remote(#[source] ClientError),
}

impl SessionError {
    /// The caller must request a new challenge to continue.
    pub fn requires_new_challenge(&self) -> bool {
        matches!(
            self,
            SessionError::Unknown | SessionError::Expired | SessionError::Locked { .. }
        )
    }
}

/// Result of a validation that reached the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub verified: bool,
    pub attempts: u32,
    pub remaining_attempts: u32,
}

/// Owns every live verification session.
pub struct SessionStore<T> {
    sessions: DashMap<String, VerificationSession>,
    /// subject key → id of its live session
    by_subject: DashMap<String, String>,
    transport: T,
    session_ttl: Duration,
    max_attempts: u32,
}

impl<T: ChallengeTransport> SessionStore<T> {
    pub fn new(transport: T, config: &VerificationConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            by_subject: DashMap::new(),
            transport,
            session_ttl: config.session_ttl(),
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a challenge for `subject_key` and trigger code delivery.
    pub async fn request_challenge(
        &self,
        subject_key: &str,
        channel: DeliveryChannel,
    ) -> Result<VerificationSession, SessionError> {
        self.request_challenge_at(subject_key, channel, Utc::now()).await
    }

    pub async fn request_challenge_at(
        &self,
        subject_key: &str,
        channel: DeliveryChannel,
        now: DateTime<Utc>,
    ) -> Result<VerificationSession, SessionError> {
        let ttl = chrono::Duration::from_std(self.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(5));
        let session = VerificationSession {
            session_id: Uuid::new_v4().to_string(),
            subject_key: subject_key.to_string(),
            channel,
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
            max_attempts: self.max_attempts,
        };

        {
            let mut slot = self.by_subject.entry(subject_key.to_string()).or_default();
            let previous = mem::replace(slot.value_mut(), session.session_id.clone());
            self.sessions
                .insert(session.session_id.clone(), session.clone());
            if !previous.is_empty() && self.sessions.remove(&previous).is_some() {
                tracing::debug!(subject = subject_key, replaced = %previous, "Replacing live challenge");
            }
        }

        if let Err(e) = self.transport.deliver(&session).await {
            self.discard(&session.session_id);
            tracing::warn!(
                subject = subject_key,
                channel = %channel,
                error = %e,
                "Challenge delivery failed"
            );
            metrics::record_verification("delivery_failed");
            return Err(SessionError::Delivery(e));
        }

        tracing::info!(
            session_id = %session.session_id,
            subject = subject_key,
            channel = %channel,
            expires_at = %session.expires_at,
            "Challenge issued"
        );
        metrics::record_verification("issued");
        Ok(session)
    }

    /// Check `code` against the session's challenge.
    pub async fn validate_challenge(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<ValidationOutcome, SessionError> {
        self.validate_challenge_at(session_id, code, Utc::now()).await
    }

    pub async fn validate_challenge_at(
        &self,
        session_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidationOutcome, SessionError> {
        let snapshot = {
            let Some(mut session) = self.sessions.get_mut(session_id) else {
                metrics::record_verification("unknown");
                return Err(SessionError::Unknown);
            };

            if session.is_expired_at(now) {
                drop(session);
                self.discard(session_id);
                tracing::info!(session_id, "Challenge expired");
                metrics::record_verification("expired");
                return Err(SessionError::Expired);
            }

            if session.is_locked() {
                let attempts = session.attempts;
                drop(session);
                self.discard(session_id);
                tracing::warn!(session_id, attempts, "Challenge locked after too many attempts");
                metrics::record_verification("locked");
                return Err(SessionError::Locked { attempts });
            }

            session.attempts += 1;
            session.clone()
        };

        let verified = match self.transport.check(&snapshot, code).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::warn!(session_id, attempts = snapshot.attempts, error = %e, "Remote validation failed");
                metrics::record_verification("remote_error");
                return Err(SessionError::Remote(e));
            }
        };

        if verified {
            self.discard(session_id);
            tracing::info!(session_id, attempts = snapshot.attempts, "Challenge verified");
            metrics::record_verification("verified");
            return Ok(ValidationOutcome {
                verified: true,
                attempts: snapshot.attempts,
                remaining_attempts: 0,
            });
        }

        tracing::info!(
            session_id,
            attempts = snapshot.attempts,
            remaining = snapshot.remaining_attempts(),
            "Challenge code rejected"
        );
        metrics::record_verification("rejected");
        Ok(ValidationOutcome {
            verified: false,
            attempts: snapshot.attempts,
            remaining_attempts: snapshot.remaining_attempts(),
        })
    }

    /// Current state of a session, if it is still stored.
    pub fn session(&self, session_id: &str) -> Option<VerificationSession> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    /// The live session issued to `subject_key`, if any.
    pub fn session_for_subject(&self, subject_key: &str) -> Option<VerificationSession> {
        let session_id = self.by_subject.get(subject_key)?.value().clone();
        self.session(&session_id)
    }

    /// Drop sessions whose window has passed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut expired = Vec::new();
        self.sessions.retain(|id, s| {
            if s.is_expired_at(now) {
                expired.push((s.subject_key.clone(), id.clone()));
                false
            } else {
                true
            }
        });
        for (subject, id) in &expired {
            self.by_subject.remove_if(subject, |_, current| current == id);
        }
        expired.len()
    }

    /// Remove a session, and its subject entry unless a newer session took it over.
    fn discard(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            self.by_subject
                .remove_if(&session.subject_key, |_, current| current == session_id);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<T: ChallengeTransport> Sweepable for SessionStore<T> {
    fn label(&self) -> &'static str {
        "verification_sessions"
    }

    fn sweep(&self) -> usize {
        self.purge_expired()
    }
}
