//! Running balance chain for a customer's current account.
//!
//! Each entry stores the balance before and after itself plus a
//! per-customer sequence number. The chain arithmetic lives here so the
//! posting path and the recompute/repair path share one definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Direction;

/// Balance state produced by applying one movement to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChain {
    /// Position in the customer's account (1-based, monotonic).
    pub seq: i64,
    /// Balance before the movement.
    pub previous_balance: Decimal,
    /// Balance after the movement. Positive = customer owes.
    pub running_balance: Decimal,
}

impl BalanceChain {
    /// Chain state for the first movement on an account.
    ///
    /// The implicit starting balance is zero.
    #[must_use]
    pub fn first_entry(change: Decimal) -> Self {
        Self {
            seq: 1,
            previous_balance: Decimal::ZERO,
            running_balance: change,
        }
    }

    /// Chain state for a movement following `previous`.
    ///
    /// `running_balance[N] = running_balance[N-1] + change` and
    /// `previous_balance[N] = running_balance[N-1]`.
    #[must_use]
    pub fn next_entry(previous: &Self, change: Decimal) -> Self {
        Self {
            seq: previous.seq + 1,
            previous_balance: previous.running_balance,
            running_balance: previous.running_balance + change,
        }
    }

    /// Applies a directed movement on top of an optional predecessor.
    #[must_use]
    pub fn apply(previous: Option<&Self>, direction: Direction, amount: Decimal) -> Self {
        let change = direction.signed(amount);
        match previous {
            None => Self::first_entry(change),
            Some(prev) => Self::next_entry(prev, change),
        }
    }
}

/// Replays a sequence of movements from a zero base.
///
/// This is the pure half of the recompute/repair operation: given every
/// movement of an account in `seq` order, it returns the balance chain
/// each entry should carry. The repository rewrites stored balances from
/// this output.
#[must_use]
pub fn replay(movements: &[(Direction, Decimal)]) -> Vec<BalanceChain> {
    let mut chains = Vec::with_capacity(movements.len());
    for (direction, amount) in movements {
        let next = BalanceChain::apply(chains.last(), *direction, *amount);
        chains.push(next);
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// Strategy for positive movement magnitudes (cents up to $1M).
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Debit), Just(Direction::Credit)]
    }

    fn movements_strategy(max_len: usize) -> impl Strategy<Value = Vec<(Direction, Decimal)>> {
        prop::collection::vec((direction_strategy(), amount_strategy()), 1..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every link in the chain satisfies
        /// `running_balance = previous_balance ± amount`.
        #[test]
        fn prop_balance_continuity(movements in movements_strategy(20)) {
            let chains = replay(&movements);

            for (chain, (direction, amount)) in chains.iter().zip(&movements) {
                prop_assert_eq!(
                    chain.running_balance,
                    chain.previous_balance + direction.signed(*amount),
                    "running_balance must equal previous_balance plus the signed amount"
                );
            }
        }

        /// Each entry's previous_balance is the prior entry's
        /// running_balance; the first starts from zero.
        #[test]
        fn prop_previous_links_to_prior(movements in movements_strategy(20)) {
            let chains = replay(&movements);

            prop_assert_eq!(chains[0].previous_balance, Decimal::ZERO);
            for pair in chains.windows(2) {
                prop_assert_eq!(
                    pair[1].previous_balance,
                    pair[0].running_balance,
                    "previous_balance[N] must equal running_balance[N-1]"
                );
            }
        }

        /// The final balance equals the sum of all signed movements.
        #[test]
        fn prop_final_balance_is_signed_sum(movements in movements_strategy(20)) {
            let chains = replay(&movements);

            let expected: Decimal = movements
                .iter()
                .map(|(direction, amount)| direction.signed(*amount))
                .sum();
            prop_assert_eq!(chains.last().unwrap().running_balance, expected);
        }

        /// Sequence numbers form the contiguous series [1, 2, ..., N].
        #[test]
        fn prop_seq_contiguous_from_one(movements in movements_strategy(20)) {
            let chains = replay(&movements);

            let seqs: Vec<i64> = chains.iter().map(|c| c.seq).collect();
            let expected: Vec<i64> = (1..=movements.len() as i64).collect();
            prop_assert_eq!(seqs, expected);
        }

        /// Replaying the same movements twice yields identical chains, so
        /// the recompute operation is idempotent when nothing changed.
        #[test]
        fn prop_replay_idempotent(movements in movements_strategy(20)) {
            let first = replay(&movements);
            let second = replay(&movements);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_first_entry_starts_from_zero() {
        let chain = BalanceChain::first_entry(dec!(1000));
        assert_eq!(chain.seq, 1);
        assert_eq!(chain.previous_balance, dec!(0));
        assert_eq!(chain.running_balance, dec!(1000));
    }

    #[test]
    fn test_chain_debit_then_credit() {
        // Sale for 1000, then full payment.
        let after_sale = BalanceChain::apply(None, Direction::Debit, dec!(1000));
        assert_eq!(after_sale.running_balance, dec!(1000));

        let after_payment =
            BalanceChain::apply(Some(&after_sale), Direction::Credit, dec!(1000));
        assert_eq!(after_payment.seq, 2);
        assert_eq!(after_payment.previous_balance, dec!(1000));
        assert_eq!(after_payment.running_balance, dec!(0));
    }

    #[test]
    fn test_overpayment_goes_negative() {
        // Customer owing 500 pays 2000 and ends up in credit.
        let owing = BalanceChain::first_entry(dec!(500));
        let after = BalanceChain::apply(Some(&owing), Direction::Credit, dec!(2000));
        assert_eq!(after.running_balance, dec!(-1500));
    }

    #[test]
    fn test_replay_empty() {
        assert!(replay(&[]).is_empty());
    }

    #[test]
    fn test_replay_mixed_sequence() {
        let movements = vec![
            (Direction::Debit, dec!(1500)),
            (Direction::Credit, dec!(500)),
            (Direction::Debit, dec!(250.75)),
            (Direction::Credit, dec!(1250.75)),
        ];
        let chains = replay(&movements);

        assert_eq!(chains.len(), 4);
        assert_eq!(chains[0].running_balance, dec!(1500));
        assert_eq!(chains[1].running_balance, dec!(1000));
        assert_eq!(chains[2].running_balance, dec!(1250.75));
        assert_eq!(chains[3].running_balance, dec!(0));
        assert_eq!(chains[3].seq, 4);
    }
}
