//! Common types used across the application.

pub mod id;
pub mod money;
pub mod time;

pub use id::*;
pub use money::{round2, within_one_cent};
pub use time::business_date_today;
