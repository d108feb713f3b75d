//! Money helpers

use rusty_money::{Money, iso::Currency};

/// Whether two amounts are denominated in the same currency.
pub fn same_currency(a: &Money<'_, Currency>, b: &Money<'_, Currency>) -> bool {
    a.currency() == b.currency()
}

/// Whether an amount is below zero.
pub fn is_negative(money: &Money<'_, Currency>) -> bool {
    money.to_minor_units() < 0
}

/// Render an amount in major units without a currency symbol.
///
/// Whole amounts drop their minor digits (`1000.00` renders as `1000`), other
/// amounts keep the currency's full precision (`999.50`).
pub fn display_amount(money: &Money<'_, Currency>) -> String {
    let amount = *money.amount();

    if amount.fract().is_zero() {
        amount.normalize().to_string()
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, INR};

    use super::*;

    #[test]
    fn whole_amounts_drop_minor_digits() {
        assert_eq!(display_amount(&Money::from_minor(100_000, INR)), "1000");
    }

    #[test]
    fn fractional_amounts_keep_precision() {
        assert_eq!(display_amount(&Money::from_minor(99_950, INR)), "999.50");
    }

    #[test]
    fn currency_comparison() {
        let rupees = Money::from_minor(100, INR);

        assert!(same_currency(&rupees, &Money::from_minor(5, INR)));
        assert!(!same_currency(&rupees, &Money::from_minor(5, GBP)));
    }

    #[test]
    fn negative_detection() {
        assert!(is_negative(&Money::from_minor(-1, INR)));
        assert!(!is_negative(&Money::from_minor(0, INR)));
    }
}
