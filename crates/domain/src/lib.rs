#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod catalog;
mod error;
mod generation;
mod name;
mod plan;
pub mod plan_merge;
pub mod progression;
mod reminder;
mod service;
mod set;
mod settings;
pub mod statistics;
mod training;
mod unit;
mod user;
mod workout_session;

pub use catalog::*;
pub use error::*;
pub use generation::*;
pub use name::*;
pub use plan::*;
pub use plan_merge::{DayChanges, ExerciseChanges, ExerciseEdit, MergeMode, Rename};
pub use reminder::*;
pub use service::*;
pub use set::*;
pub use settings::*;
pub use training::*;
pub use unit::*;
pub use user::*;
pub use workout_session::*;
