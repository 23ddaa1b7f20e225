use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};

use super::observer::UnitObserver;
use super::unit::{Outcome, UnitOfWork};

/// Drives units of work and fans their lifecycle out to observers.
#[derive(Default, Clone)]
pub struct UnitRunner {
    observers: Vec<Arc<dyn UnitObserver>>,
}

impl UnitRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn UnitObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub async fn start(&self, unit: &UnitOfWork) {
        debug!("[{}] unit started ({})", unit.label, unit.id);
        for observer in &self.observers {
            observer.on_start(unit).await;
        }
    }

    /// Delivers the single terminal notification for `unit`.
    pub async fn finish(&self, unit: &UnitOfWork, outcome: &Outcome) {
        match outcome {
            Outcome::Success => {
                info!("[{}] unit succeeded", unit.label);
                for observer in &self.observers {
                    observer.on_success(unit).await;
                }
            }
            Outcome::Failure(cause) => {
                warn!("[{}] unit failed: {}", unit.label, cause);
                for observer in &self.observers {
                    observer.on_failure(unit, cause).await;
                }
            }
        }
    }

    /// Runs `work` as `unit` and returns its result untouched; observers
    /// only see it.
    pub async fn run<T, E, F>(&self, unit: &UnitOfWork, work: F) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        self.start(unit).await;
        let result = work.await;
        self.finish(unit, &Outcome::from(&result)).await;
        result
    }
}
