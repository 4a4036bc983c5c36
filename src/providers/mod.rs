pub mod airwallex;
pub mod signature;
pub mod stripe;
