//! The shared vendor-protocol emulator state machine (spec §4.1.a).
//!
//! [`device::EmulatorDevice`] is the single implementation of the state
//! machine; it is used two ways in this workspace:
//!
//! - wrapped directly by [`adapter::InProcessAdapter`] so the Radio Manager
//!   can hold an emulated radio with no network hop, and
//! - wrapped by `rcc-emulator`'s JSON-RPC server, so the exact same state
//!   machine is reachable as a standalone vendor process (spec §4.7).

pub mod device;
pub mod adapter;

pub use device::{EmulatorConfig, EmulatorDevice};
pub use adapter::InProcessAdapter;
