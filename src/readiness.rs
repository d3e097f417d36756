//! Lazy, one-time loading of the text recognizer.
//!
//! The recognizer is expensive to build, so it is constructed on a
//! dedicated background thread the first time anyone asks for it. Request
//! handlers only ever take a non-blocking snapshot of the state and answer
//! "try again later" until the load has finished.
//!
//! State only moves forward: `Uninitialized -> Loading -> Ready`, or
//! `Loading -> Failed` when construction returns an error or panics. Both
//! `Ready` and `Failed` are terminal.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tokio::sync::watch;

use crate::detection::ocr::TextRecognizer;

type Loader = Box<dyn Fn() -> anyhow::Result<Arc<dyn TextRecognizer>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Uninitialized,
    Loading,
    Ready,
    /// Construction failed; carries the error message
    Failed(String),
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Uninitialized => "uninitialized",
            ReadinessState::Loading => "loading",
            ReadinessState::Ready => "ready",
            ReadinessState::Failed(_) => "failed",
        }
    }

    /// True once no further transition can happen
    pub fn is_settled(&self) -> bool {
        matches!(self, ReadinessState::Ready | ReadinessState::Failed(_))
    }

    /// Position in the transition order, for monotonicity checks
    pub fn rank(&self) -> u8 {
        match self {
            ReadinessState::Uninitialized => 0,
            ReadinessState::Loading => 1,
            ReadinessState::Ready | ReadinessState::Failed(_) => 2,
        }
    }
}

/// Result of a [`ModelReadiness::trigger_load`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// This call claimed the load and started it
    Started,
    AlreadyLoading,
    AlreadyReady,
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("text recognizer is not ready (status: {})", .0.as_str())]
pub struct NotReady(pub ReadinessState);

/// Process-wide owner of the recognizer and its loading state
pub struct ModelReadiness {
    state: watch::Sender<ReadinessState>,
    recognizer: OnceLock<Arc<dyn TextRecognizer>>,
    loader: Loader,
}

impl ModelReadiness {
    pub fn new<F>(loader: F) -> Arc<Self>
    where
        F: Fn() -> anyhow::Result<Arc<dyn TextRecognizer>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            state: watch::Sender::new(ReadinessState::Uninitialized),
            recognizer: OnceLock::new(),
            loader: Box::new(loader),
        })
    }

    /// Start loading in the background unless that already happened.
    ///
    /// Only the caller that moves the state out of `Uninitialized` starts a
    /// load; every other call reports the current state.
    pub fn trigger_load(self: &Arc<Self>) -> TriggerOutcome {
        let mut claimed = false;
        self.state.send_if_modified(|state| {
            if *state == ReadinessState::Uninitialized {
                *state = ReadinessState::Loading;
                claimed = true;
            }
            claimed
        });

        if !claimed {
            return match self.status() {
                ReadinessState::Ready => TriggerOutcome::AlreadyReady,
                ReadinessState::Failed(message) => TriggerOutcome::Failed(message),
                _ => TriggerOutcome::AlreadyLoading,
            };
        }

        tracing::info!("Starting text recognizer load");
        let this = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("recognizer-loader".to_string())
            .spawn(move || this.run_load());

        if let Err(e) = spawned {
            let message = format!("Failed to spawn loader thread: {}", e);
            tracing::error!("{}", message);
            self.state.send_replace(ReadinessState::Failed(message.clone()));
            return TriggerOutcome::Failed(message);
        }

        TriggerOutcome::Started
    }

    fn run_load(&self) {
        let started = std::time::Instant::now();
        // A panicking loader must still leave the state settled
        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.loader)())).unwrap_or_else(
            |payload| Err(anyhow::anyhow!("loader panicked: {}", panic_message(&*payload))),
        );

        match result {
            Ok(recognizer) => {
                // Publish the instance before announcing Ready
                let _ = self.recognizer.set(recognizer);
                self.state.send_replace(ReadinessState::Ready);
                tracing::info!(elapsed = ?started.elapsed(), "Text recognizer ready");
            }
            Err(e) => {
                tracing::error!(error = %e, "Text recognizer failed to load");
                self.state.send_replace(ReadinessState::Failed(format!("{:#}", e)));
            }
        }
    }

    /// Current state snapshot; never blocks on the load
    pub fn status(&self) -> ReadinessState {
        self.state.borrow().clone()
    }

    /// The recognizer if loading has finished. Does not start a load.
    pub fn recognizer_if_ready(&self) -> Result<Arc<dyn TextRecognizer>, NotReady> {
        let status = self.status();
        if status != ReadinessState::Ready {
            return Err(NotReady(status));
        }
        self.recognizer
            .get()
            .cloned()
            .ok_or(NotReady(ReadinessState::Loading))
    }

    /// Wait until the state is `Ready` or `Failed`.
    ///
    /// Meant for startup and tests; request handlers use [`Self::status`].
    pub async fn wait_settled(&self) -> ReadinessState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(ReadinessState::is_settled).await {
            Ok(state) => state.clone(),
            // The sender lives in self, so it cannot be dropped while we wait
            Err(_) => self.status(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl std::fmt::Debug for ModelReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelReadiness")
            .field("state", &self.status())
            .finish()
    }
}
