//! The relational store backing the built-in tools and scheduler jobs. Tool semantics
//! themselves are explicitly out of the hard design (spec §1); this module exists to give the
//! built-in tools (`tools::builtin`) and scheduler jobs something concrete to call.

mod error;
mod schema;
mod sqlite;

pub use error::StoreError;
pub use sqlite::{Datastore, Event, FoodLog, JobState, Reminder, Task};
