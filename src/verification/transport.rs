//! Remote side of a challenge: code delivery and code checking.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::http::{RequestExecutor, RequestSpec};
use crate::verification::session::{DeliveryChannel, VerificationSession};

/// Delivers one-time codes and checks submitted ones.
pub trait ChallengeTransport: Send + Sync + 'static {
    /// Ask the remote to send a code for `session` over its channel.
    fn deliver(
        &self,
        session: &VerificationSession,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Ask the remote whether `code` matches. `Ok(false)` is a rejection.
    fn check(
        &self,
        session: &VerificationSession,
        code: &str,
    ) -> impl Future<Output = Result<bool, ClientError>> + Send;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequest<'a> {
    session_id: &'a str,
    subject_key: &'a str,
    channel: DeliveryChannel,
    expires_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest<'a> {
    session_id: &'a str,
    subject_key: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    verified: bool,
}

/// Challenge transport over the request executor.
#[derive(Debug, Clone)]
pub struct HttpChallengeTransport {
    executor: Arc<RequestExecutor>,
    challenge_path: String,
    validate_path: String,
    timeout: Duration,
}

impl HttpChallengeTransport {
    pub fn new(
        executor: Arc<RequestExecutor>,
        challenge_path: impl Into<String>,
        validate_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            executor,
            challenge_path: challenge_path.into(),
            validate_path: validate_path.into(),
            timeout,
        }
    }
}

impl ChallengeTransport for HttpChallengeTransport {
    async fn deliver(&self, session: &VerificationSession) -> Result<(), ClientError> {
        let spec = RequestSpec::post(self.challenge_path.as_str())
            .json(&ChallengeRequest {
                session_id: &session.session_id,
                subject_key: &session.subject_key,
                channel: session.channel,
                expires_at: session.expires_at.to_rfc3339(),
            })?
            .timeout(self.timeout);
        self.executor.execute(&spec).await?;
        Ok(())
    }

    async fn check(&self, session: &VerificationSession, code: &str) -> Result<bool, ClientError> {
        let spec = RequestSpec::post(self.validate_path.as_str())
            .json(&ValidateRequest {
                session_id: &session.session_id,
                subject_key: &session.subject_key,
                code,
            })?
            .timeout(self.timeout);
        let response: ValidateResponse = self.executor.execute_json(&spec).await?;
        Ok(response.verified)
    }
}
