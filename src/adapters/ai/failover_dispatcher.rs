//! Failover Dispatcher - governor-gated calls with model-tier fallback.
//!
//! Every outbound backend call goes through [`FailoverDispatcher::send`]. The
//! dispatcher asks the rate governor for admission, then tries the preferred
//! model tier and, when that tier reports an exhausted quota, the other one.
//! Errors that are not quota-class are returned without trying the next tier.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = FailoverDispatcher::new(governor, primary, secondary)
//!     .with_event_callback(Arc::new(MetricsCallback::default()));
//!
//! let raw = dispatcher
//!     .send(|target| async move { target.provider.complete(request.clone()).await }, true)
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::foundation::RequestId;
use crate::ports::{AIError, AIProvider, RateGovernor};

/// Dispatch events for fallback monitoring.
pub mod events {
    use serde::{Deserialize, Serialize};

    use super::ModelTier;
    use crate::domain::foundation::{RequestId, Timestamp};

    /// Emitted when a tier fails with a quota-class error and the next tier is tried.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProviderFallback {
        pub request_id: RequestId,
        pub from_tier: ModelTier,
        pub from_model: String,
        pub to_tier: ModelTier,
        pub to_model: String,
        pub reason: String,
        pub occurred_at: Timestamp,
    }

    impl ProviderFallback {
        pub fn new(
            request_id: RequestId,
            from: (ModelTier, String),
            to: (ModelTier, String),
            reason: impl Into<String>,
        ) -> Self {
            Self {
                request_id,
                from_tier: from.0,
                from_model: from.1,
                to_tier: to.0,
                to_model: to.1,
                reason: reason.into(),
                occurred_at: Timestamp::now(),
            }
        }
    }

    /// Emitted when every tier failed with a quota-class error.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BackendsExhausted {
        pub request_id: RequestId,
        pub attempts: u32,
        pub last_error: String,
        pub occurred_at: Timestamp,
    }

    impl BackendsExhausted {
        pub fn new(request_id: RequestId, attempts: u32, last_error: impl Into<String>) -> Self {
            Self {
                request_id,
                attempts,
                last_error: last_error.into(),
                occurred_at: Timestamp::now(),
            }
        }
    }
}

/// Callback for receiving dispatch events.
pub trait AIEventCallback: Send + Sync {
    /// Called when a fallback to another tier occurs.
    fn on_fallback(&self, event: events::ProviderFallback);

    /// Called when all tiers are exhausted.
    fn on_exhausted(&self, event: events::BackendsExhausted);
}

/// No-op event callback for when event tracking isn't needed.
#[derive(Debug, Clone, Copy)]
pub struct NoOpEventCallback;

impl AIEventCallback for NoOpEventCallback {
    fn on_fallback(&self, _event: events::ProviderFallback) {}
    fn on_exhausted(&self, _event: events::BackendsExhausted) {}
}

/// Model tier of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Primary,
    Secondary,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Primary => write!(f, "primary"),
            ModelTier::Secondary => write!(f, "secondary"),
        }
    }
}

/// The backend a request builder is asked to call.
#[derive(Clone)]
pub struct BackendTarget {
    pub tier: ModelTier,
    pub provider: Arc<dyn AIProvider>,
}

impl std::fmt::Debug for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendTarget")
            .field("tier", &self.tier)
            .field("provider", &self.provider.provider_info())
            .finish()
    }
}

/// Errors returned by [`FailoverDispatcher::send`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// The local governor refused admission. No backend was called.
    #[error("locally rate limited: retry after {retry_after:?}")]
    LocallyRateLimited { retry_after: Duration },

    /// Every tier failed with a quota-class error.
    #[error("all backends exhausted after {attempts} attempts: {last_error}")]
    AllBackendsExhausted { attempts: u32, last_error: AIError },

    /// A tier failed with a non-quota error.
    #[error(transparent)]
    Backend(AIError),
}

/// Dispatches requests across the primary and secondary model tiers.
pub struct FailoverDispatcher {
    governor: Arc<dyn RateGovernor>,
    primary: Arc<dyn AIProvider>,
    secondary: Arc<dyn AIProvider>,
    event_callback: Arc<dyn AIEventCallback>,
}

impl FailoverDispatcher {
    pub fn new(
        governor: Arc<dyn RateGovernor>,
        primary: Arc<dyn AIProvider>,
        secondary: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            governor,
            primary,
            secondary,
            event_callback: Arc::new(NoOpEventCallback),
        }
    }

    /// Sets the event callback for receiving dispatch events.
    pub fn with_event_callback(mut self, callback: Arc<dyn AIEventCallback>) -> Self {
        self.event_callback = callback;
        self
    }

    /// The governor gating this dispatcher.
    pub fn governor(&self) -> &Arc<dyn RateGovernor> {
        &self.governor
    }

    /// Targets in attempt order.
    fn targets(&self, prefer_primary: bool) -> [BackendTarget; 2] {
        let primary = BackendTarget {
            tier: ModelTier::Primary,
            provider: Arc::clone(&self.primary),
        };
        let secondary = BackendTarget {
            tier: ModelTier::Secondary,
            provider: Arc::clone(&self.secondary),
        };
        if prefer_primary {
            [primary, secondary]
        } else {
            [secondary, primary]
        }
    }

    /// Runs `build` against the tiers in order until one succeeds.
    ///
    /// Every attempt consumes one governor slot, including fallbacks. The
    /// first slot is taken atomically with the admission check; fallback
    /// slots are recorded without a re-check so a fallback is never blocked
    /// by the spacing the first attempt just created.
    pub async fn send<F, Fut, T>(&self, mut build: F, prefer_primary: bool) -> Result<T, DispatchError>
    where
        F: FnMut(BackendTarget) -> Fut,
        Fut: Future<Output = Result<T, AIError>>,
    {
        if let Err(retry_after) = self.governor.try_admit() {
            debug!(?retry_after, "Dispatch refused by local governor");
            return Err(DispatchError::LocallyRateLimited { retry_after });
        }

        let request_id = RequestId::new();
        let targets = self.targets(prefer_primary);
        let mut attempts = 0u32;
        let mut last_error = None;

        for (index, target) in targets.iter().enumerate() {
            if index > 0 {
                self.governor.record_admission();
            }
            attempts += 1;

            let tier = target.tier;
            let model = target.provider.provider_info().model;

            match build(target.clone()).await {
                Ok(value) => {
                    if index > 0 {
                        info!(%request_id, %tier, %model, "Fallback tier succeeded");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_quota_exhausted() => {
                    if let Some(next) = targets.get(index + 1) {
                        let next_model = next.provider.provider_info().model;
                        warn!(
                            %request_id,
                            from = %tier,
                            to = %next.tier,
                            error = %err,
                            "Quota exhausted, falling back to next model tier"
                        );
                        self.event_callback.on_fallback(events::ProviderFallback::new(
                            request_id,
                            (tier, model),
                            (next.tier, next_model),
                            err.to_string(),
                        ));
                    }
                    last_error = Some(err);
                }
                Err(err) => {
                    warn!(%request_id, %tier, error = %err, "Backend request failed");
                    return Err(DispatchError::Backend(err));
                }
            }
        }

        let last_error =
            last_error.unwrap_or_else(|| AIError::quota_exceeded("no backend attempted"));
        warn!(%request_id, attempts, error = %last_error, "All model tiers exhausted");
        self.event_callback.on_exhausted(events::BackendsExhausted::new(
            request_id,
            attempts,
            last_error.to_string(),
        ));
        Err(DispatchError::AllBackendsExhausted {
            attempts,
            last_error,
        })
    }
}
