use embassy_time::Duration;

use crate::{Latch, MAX_NUM_OF_LOGICAL_MODEM, MAX_NUM_OF_SIM_SLOT};

pub trait MockModemConfig {
    const NUM_SIM_SLOTS: usize = MAX_NUM_OF_SIM_SLOT;
    const NUM_LOGICAL_MODEMS: usize = 1;

    /// Number of sim slots, clamped to what the modem supports
    fn num_sim_slots(&self) -> usize {
        Self::NUM_SIM_SLOTS.clamp(1, MAX_NUM_OF_SIM_SLOT)
    }

    /// Number of logical modems, clamped to what the modem supports
    fn num_logical_modems(&self) -> usize {
        Self::NUM_LOGICAL_MODEMS.clamp(1, MAX_NUM_OF_LOGICAL_MODEM)
    }

    /// Decides the radio state the bring-up settles on: off in airplane mode, on otherwise
    fn airplane_mode(&self) -> bool {
        false
    }

    fn readiness_timeout(&self, latch: Latch) -> Duration {
        match latch {
            Latch::RadioInterfacesReady => Duration::from_secs(10),
            Latch::RadioPowerReady => Duration::from_secs(5),
            Latch::SimReady => Duration::from_secs(5),
            Latch::InitializationReady => Duration::from_secs(20),
        }
    }

    /// How long a test driver waits for `connect()` to see a fully initialized modem
    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    /// Time given to the telephony framework to pick up a sim swap
    fn sim_settle_delay(&self) -> Duration {
        Duration::from_secs(2)
    }
}

pub struct DefaultConfig;

impl MockModemConfig for DefaultConfig {}
