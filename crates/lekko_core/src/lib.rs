pub mod calendar;
pub mod document;
pub mod habit;
pub mod ops;
pub mod progress;
pub mod service;
pub mod store;
pub mod weight;

pub use crate::document::{HabitChecks, TrackerDocument};
pub use crate::habit::{Habit, SkipDates};
pub use crate::service::{TrackerService, TrackerServiceBuilder};
