use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use heapless::LinearMap;

use crate::interfaces::RadioError;
use crate::types::RadioState;
use crate::{Opcode, RawMutex, Readiness, ServiceError};

/// Number of opcodes that may have a forced error at the same time
pub const FORCED_ERROR_CAPACITY: usize = 16;

/// State shared by the service and every interface handler
pub struct ServiceContext {
    readiness: Readiness,
    forced_errors: Mutex<RawMutex, RefCell<LinearMap<Opcode, RadioError, FORCED_ERROR_CAPACITY>>>,
    airplane_mode: AtomicBool,
}

impl ServiceContext {
    pub fn new(readiness: Readiness, airplane_mode: bool) -> Self {
        Self {
            readiness,
            forced_errors: Mutex::new(RefCell::new(LinearMap::new())),
            airplane_mode: AtomicBool::new(airplane_mode),
        }
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Force every response to `opcode` to carry `error`, or stop forcing with `None`
    pub fn force_error(&self, opcode: Opcode, error: Option<RadioError>) -> Result<(), ServiceError> {
        self.forced_errors.lock(|errors| {
            let mut errors = errors.borrow_mut();
            match error {
                Some(error) => {
                    errors
                        .insert(opcode, error)
                        .map_err(|_| ServiceError::ForcedErrorTableFull)?;
                    info!("Forcing {:?} on {:?}", error, opcode);
                }
                None => {
                    if errors.remove(&opcode).is_some() {
                        info!("No longer forcing an error on {:?}", opcode);
                    }
                }
            }
            Ok(())
        })
    }

    pub fn forced_error(&self, opcode: Opcode) -> Option<RadioError> {
        self.forced_errors
            .lock(|errors| errors.borrow().get(&opcode).copied())
    }

    pub fn airplane_mode(&self) -> bool {
        self.airplane_mode.load(Ordering::Acquire)
    }

    pub fn set_airplane_mode(&self, enabled: bool) {
        self.airplane_mode.store(enabled, Ordering::Release)
    }

    /// The radio state bring-up settles on
    pub fn target_radio_state(&self) -> RadioState {
        if self.airplane_mode() {
            RadioState::Off
        } else {
            RadioState::On
        }
    }
}
