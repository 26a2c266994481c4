use serde::Serialize;

/// Daily base pay when fewer than [`FULL_BASE_MIN_BILLS`] bills were processed.
pub const REDUCED_BASE_PAY: u32 = 500;
pub const FULL_BASE_PAY: u32 = 1000;
pub const FULL_BASE_MIN_BILLS: u32 = 10;

pub const LOWER_INCENTIVE: u32 = 500;
pub const LOWER_INCENTIVE_MIN_BILLS: u32 = 20;
pub const UPPER_INCENTIVE: u32 = 1000;
pub const UPPER_INCENTIVE_MIN_BILLS: u32 = 25;

/// Pay derived for one attendance day.
///
/// Only [`Payroll::derive`] builds one, so `total_salary` is always
/// `base_payment + incentive` and an absent day always carries zero bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    pub bills_count: u32,
    pub base_payment: u32,
    pub incentive: u32,
    pub total_salary: u32,
}

impl Payroll {
    pub fn derive(is_present: bool, bills_count: u32) -> Self {
        if !is_present {
            return Self {
                bills_count: 0,
                base_payment: 0,
                incentive: 0,
                total_salary: 0,
            };
        }

        let base_payment = if bills_count < FULL_BASE_MIN_BILLS {
            REDUCED_BASE_PAY
        } else {
            FULL_BASE_PAY
        };

        let incentive = if bills_count >= UPPER_INCENTIVE_MIN_BILLS {
            UPPER_INCENTIVE
        } else if bills_count >= LOWER_INCENTIVE_MIN_BILLS {
            LOWER_INCENTIVE
        } else {
            0
        };

        Self {
            bills_count,
            base_payment,
            incentive,
            total_salary: base_payment + incentive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 500, 0)]
    #[case(9, 500, 0)]
    #[case(10, 1000, 0)]
    #[case(19, 1000, 0)]
    #[case(20, 1000, 500)]
    #[case(22, 1000, 500)]
    #[case(24, 1000, 500)]
    #[case(25, 1000, 1000)]
    #[case(400, 1000, 1000)]
    fn present_day_tiers(#[case] bills: u32, #[case] base: u32, #[case] incentive: u32) {
        let pay = Payroll::derive(true, bills);

        assert_eq!(pay.bills_count, bills);
        assert_eq!(pay.base_payment, base);
        assert_eq!(pay.incentive, incentive);
        assert_eq!(pay.total_salary, base + incentive);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(30)]
    fn absent_day_pays_nothing_and_drops_bills(#[case] bills: u32) {
        let pay = Payroll::derive(false, bills);

        assert_eq!(
            pay,
            Payroll {
                bills_count: 0,
                base_payment: 0,
                incentive: 0,
                total_salary: 0,
            }
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        for present in [true, false] {
            for bills in 0..40 {
                let once = Payroll::derive(present, bills);
                let twice = Payroll::derive(present, once.bills_count);
                assert_eq!(once, twice);
                assert_eq!(once.total_salary, once.base_payment + once.incentive);
            }
        }
    }
}
