pub mod activity;
pub mod event_type;
pub mod student;
pub mod tier;
