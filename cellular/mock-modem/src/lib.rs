#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

#[macro_use]
extern crate num_derive;

pub mod config;
mod error;
pub mod interfaces;
pub mod modem_config;
mod opcode;
pub mod readiness;
pub mod service;
pub mod sim_card;
pub mod types;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub use config::{DefaultConfig, MockModemConfig};
pub use error::{ConfigError, ServiceError};
pub use modem_config::ModemConfig;
pub use opcode::{Domain, Opcode};
pub use readiness::{Latch, Participant, Readiness};
pub use service::{MockModemService, ModemResources, Phone, ServiceContext};
pub use sim_card::SimCard;

/// Handlers run on different threads, so every shared primitive is guarded by a critical section.
pub type RawMutex = CriticalSectionRawMutex;

/// Changing this requires adding slot defaults to every sim card table.
pub const MAX_NUM_OF_SIM_SLOT: usize = 2;
pub const MAX_NUM_OF_LOGICAL_MODEM: usize = 2;

/// One Config interface plus Modem, Sim, Network, Data, Messaging and Voice per logical modem
pub const INTERFACES_PER_LOGICAL_MODEM: usize = 6;

pub const fn num_of_interfaces(num_of_logical_modem: usize) -> usize {
    1 + INTERFACES_PER_LOGICAL_MODEM * num_of_logical_modem
}
