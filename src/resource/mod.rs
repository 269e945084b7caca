pub mod person;

pub use person::{filter_people, PersonWorkflow};
