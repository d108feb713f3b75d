//! Chisel Domain Concerns

pub mod promo_codes;
pub mod reviews;
