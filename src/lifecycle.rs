//! Unit-of-work lifecycle.
//!
//! A unit of work is one test case or job run. Observers are told when it
//! starts and get exactly one terminal notification, success or failure.

pub mod observer;
pub mod runner;
pub mod unit;

pub use observer::UnitObserver;
pub use runner::UnitRunner;
pub use unit::{Outcome, UnitOfWork};
