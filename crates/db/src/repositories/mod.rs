//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod group_repo;
pub mod outing_repo;
pub mod participant_repo;

pub use group_repo::{AssignError, GroupRepo};
pub use outing_repo::OutingRepo;
pub use participant_repo::ParticipantRepo;
