//! Key code tables.

pub mod hid;

pub use hid::HidKey;
