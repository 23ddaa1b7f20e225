use async_trait::async_trait;

use super::unit::UnitOfWork;

/// Receives lifecycle notifications for units of work.
///
/// Every method is infallible: an observer has no way to change the
/// outcome of the unit it watches.
#[async_trait]
pub trait UnitObserver: Send + Sync {
    async fn on_start(&self, _unit: &UnitOfWork) {}

    async fn on_success(&self, unit: &UnitOfWork);

    async fn on_failure(&self, unit: &UnitOfWork, cause: &str);
}
