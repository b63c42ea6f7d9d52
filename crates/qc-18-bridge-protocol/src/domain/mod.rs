//! # Domain Module
//!
//! Core domain types for the Bridge Protocol Engine.

pub mod access;
pub mod actions;
pub mod effects;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ledger;
pub mod registry;
pub mod state_machine;
pub mod value_objects;

pub use access::RoleRegistry;
pub use actions::BridgeAction;
pub use effects::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use ledger::{EscrowKey, EscrowLedger, LedgerChanges, LedgerTransaction};
pub use registry::{MessageRegistry, Registration};
pub use state_machine::{CycleTicket, StateMachine};
pub use value_objects::*;
