pub mod error;
pub mod event;
pub mod fingerprint;
pub mod money;
