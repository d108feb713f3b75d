//! Chisel
//!
//! Promo code evaluation for the Chisel storefront: canonical code names, the
//! promo code record, the ordered validation rules, discount calculation and
//! the small set-membership helpers the storefront mutations are built on.

pub mod codes;
pub mod discounts;
pub mod money;
pub mod promo_codes;
pub mod redemptions;
pub mod validation;
pub mod votes;
