//! Client-side state models.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `notifications`) so subscribers can
//! depend on small focused models. Each model changes only through its own
//! closed set of mutations; async work lives in `services`.

pub mod auth;
pub mod notifications;
