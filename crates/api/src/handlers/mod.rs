pub mod groups;
pub mod grubmaster;
pub mod outings;
pub mod participants;
pub mod tenting;
