//! # Exploit Simulations
//!
//! Attacks against the bridge, each asserting the defense holds and that
//! committed state is untouched.
//!
//! | Attack | Defense |
//! |--------|---------|
//! | Replay of a settled message | Consumed-id registry |
//! | Proof for another message | Statement binds message id |
//! | Re-entry during verification | Single cycle; `Busy` |
//! | Re-entry during payout | Debit before transfer |
//! | Premature or forged upgrade | Timelock and roles |

pub mod governance;
pub mod replay;
