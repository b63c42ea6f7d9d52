//! # Escrow Properties
//!
//! Random deposit / relay / claim sequences against a running engine,
//! checked step by step against a plain balance model.

#[cfg(test)]
mod tests {
    use crate::harness::{BridgeHarness, ALICE, ETH};
    use proptest::prelude::*;
    use qc_18_bridge_protocol::{Amount, BridgeApi, BridgeError, SubmissionOutcome};

    #[derive(Clone, Debug)]
    enum Op {
        Deposit(Amount),
        Relay(Amount),
        Claim,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..1_000).prop_map(|a| Op::Deposit(a as Amount)),
            (1u64..1_500).prop_map(|a| Op::Relay(a as Amount)),
            Just(Op::Claim),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_engine_matches_escrow_model(ops in proptest::collection::vec(op_strategy(), 1..32)) {
            let h = BridgeHarness::new();
            let (mut locked, mut released, mut claimed): (Amount, Amount, Amount) = (0, 0, 0);
            let mut nonce = 0u64;

            for op in ops {
                match op {
                    Op::Deposit(amount) => {
                        let receipt = h.engine.deposit(ALICE, ETH, amount, ALICE).unwrap();
                        locked += amount;
                        prop_assert_eq!(receipt.locked, locked);
                    }
                    Op::Relay(amount) => {
                        let outcome = h.relay(&BridgeHarness::release_to_alice(amount), nonce);
                        nonce += 1;
                        if amount <= locked {
                            prop_assert!(outcome.is_accepted());
                            locked -= amount;
                            released += amount;
                        } else {
                            let rejected_for_balance = matches!(
                                outcome,
                                SubmissionOutcome::Rejected(BridgeError::InsufficientLocked { .. })
                            );
                            prop_assert!(rejected_for_balance);
                        }
                    }
                    Op::Claim => {
                        let result = h.engine.claim(ALICE, ETH);
                        if released > 0 {
                            prop_assert_eq!(result, Ok(released));
                            claimed += released;
                            released = 0;
                        } else {
                            prop_assert_eq!(result, Err(BridgeError::InsufficientReleased));
                        }
                    }
                }

                prop_assert!(h.engine.audit().is_ok());
                let balance = h.engine.escrow_balance(&ALICE, &ETH);
                prop_assert_eq!(
                    (balance.locked, balance.released, balance.claimed),
                    (locked, released, claimed)
                );
            }

            let totals = h.engine.asset_totals(&ETH);
            prop_assert_eq!(totals.deposited, locked + released + claimed);
        }
    }
}
