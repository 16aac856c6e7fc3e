//! Explicitly constructed application context.
//!
//! Owns every stateful component of the client core. Nothing here is global:
//! tests build isolated contexts, and the owner decides when background work
//! starts and when it stops.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{run_sweeper, Sweepable, TtlCache};
use crate::client::remote::RemoteClient;
use crate::config::{validate_config, ClientConfig};
use crate::error::ClientError;
use crate::http::RequestExecutor;
use crate::lifecycle::BackgroundTasks;
use crate::queue::{run_flusher, EventQueue, HttpEventSink};
use crate::resilience::RetryPolicy;
use crate::verification::{HttpChallengeTransport, SessionStore};

/// Upper bound on how long shutdown waits for each background task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub type EventQueueHandle = Arc<EventQueue<HttpEventSink>>;
pub type SessionStoreHandle = Arc<SessionStore<HttpChallengeTransport>>;

pub struct ServiceContext {
    config: ClientConfig,
    executor: Arc<RequestExecutor>,
    cache: TtlCache<String, Value>,
    events: EventQueueHandle,
    verification: SessionStoreHandle,
    tasks: BackgroundTasks,
}

impl ServiceContext {
    /// Validate `config` and build every component from it. No task is spawned yet.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if let Err(errors) = validate_config(&config) {
            let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
            tracing::error!(problems = ?problems, "Refusing to build service context");
            return Err(ClientError::InvalidConfig(problems.join("; ")));
        }

        let executor = Arc::new(RequestExecutor::new(
            &config.api,
            &config.timeouts,
            RetryPolicy::from_config(&config.retries),
        )?);

        let cache = TtlCache::new("remote", Duration::from_secs(config.cache.default_ttl_secs));

        let sink = HttpEventSink::new(executor.clone(), config.queue.batch_path.clone());
        let events = Arc::new(EventQueue::new(sink, &config.queue));

        let transport = HttpChallengeTransport::new(
            executor.clone(),
            config.verification.challenge_path.clone(),
            config.verification.validate_path.clone(),
            config.timeouts.verification(),
        );
        let verification = Arc::new(SessionStore::new(transport, &config.verification));

        tracing::info!(
            base_url = %executor.base_url(),
            batch_size = config.queue.batch_size,
            cache_ttl_secs = config.cache.default_ttl_secs,
            "Service context created"
        );

        Ok(Self {
            config,
            executor,
            cache,
            events,
            verification,
            tasks: BackgroundTasks::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn cache(&self) -> &TtlCache<String, Value> {
        &self.cache
    }

    pub fn events(&self) -> &EventQueueHandle {
        &self.events
    }

    pub fn verification(&self) -> &SessionStoreHandle {
        &self.verification
    }

    /// Read-through client sharing this context's executor and cache.
    pub fn remote(&self) -> RemoteClient {
        RemoteClient::new(self.executor.clone(), self.cache.clone())
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawn the event flusher and the expiry sweeper. Calling twice is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::warn!("Service context already started");
            return;
        }

        let token = self.tasks.token();
        self.tasks.spawn(
            "event-flusher",
            run_flusher(self.events.clone(), self.config.queue.flush_interval(), token.clone()),
        );

        let cache_target: Arc<dyn Sweepable> = Arc::new(self.cache.clone());
        let session_target: Arc<dyn Sweepable> = self.verification.clone();
        self.tasks.spawn(
            "sweeper",
            run_sweeper(
                vec![cache_target, session_target],
                Duration::from_secs(self.config.cache.sweep_interval_secs),
                token,
            ),
        );

        tracing::info!(tasks = self.tasks.len(), "Background tasks started");
    }

    /// Stop background work. The flusher delivers buffered events before exiting.
    ///
    /// The context can be started again afterwards.
    pub async fn shutdown(&mut self) {
        if !self.is_running() {
            tracing::debug!("Service context not running, nothing to stop");
            return;
        }
        tracing::info!(pending_events = self.events.len(), "Shutting down service context");

        let mut tasks = std::mem::take(&mut self.tasks);
        tasks.shutdown(SHUTDOWN_GRACE).await;

        tracing::info!(
            pending_events = self.events.len(),
            "Service context stopped"
        );
    }
}
