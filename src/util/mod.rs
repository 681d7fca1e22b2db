//! Low-level helpers shared by workers and the reporter

pub mod buffer;
pub mod time;
