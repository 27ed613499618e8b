//! BDD step definitions for homework sentinel service

pub mod poll_steps;
