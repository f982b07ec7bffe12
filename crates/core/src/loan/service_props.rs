//! Property-based tests for loan payments.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::{LoanPaymentType, apply_payment};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* deposit, the new balance is never negative and the amount
    /// splits exactly into principal paid plus overpayment.
    #[test]
    fn prop_deposit_never_negative(balance in balance(), amount in amount()) {
        let outcome = apply_payment(balance, LoanPaymentType::Deposit, amount).unwrap();

        prop_assert!(outcome.new_balance >= Decimal::ZERO);
        prop_assert!(outcome.overpayment >= Decimal::ZERO);
        prop_assert_eq!((balance - outcome.new_balance) + outcome.overpayment, amount);
        if amount > balance {
            prop_assert_eq!(outcome.new_balance, Decimal::ZERO);
        }
    }

    /// *For any* withdrawal, the balance grows by exactly the amount.
    #[test]
    fn prop_withdrawal_adds_amount(balance in balance(), amount in amount()) {
        let outcome = apply_payment(balance, LoanPaymentType::Withdrawal, amount).unwrap();
        prop_assert_eq!(outcome.new_balance, balance + amount);
        prop_assert_eq!(outcome.overpayment, Decimal::ZERO);
    }
}
