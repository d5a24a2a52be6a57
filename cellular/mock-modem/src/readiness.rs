//! Countdown latches gating the bring-up of the mock modem.
//!
//! All latches share one generation. [`Readiness::reset`] starts a new
//! generation with fresh counts; a waiter that started in an older generation
//! never completes and runs into its timeout instead.
use core::cell::{Cell, RefCell};
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

use crate::RawMutex;

/// Number of tasks that may wait on the latches at the same time
pub const READINESS_WAITERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Latch {
    /// Counted down once by every interface when the framework binds it
    RadioInterfacesReady,
    /// Counted down once per logical modem when the radio reaches its target state
    RadioPowerReady,
    /// Counted down once per logical modem when the framework reads the card status
    SimReady,
    InitializationReady,
}

const LATCHES: usize = 4;

impl Latch {
    const fn index(self) -> usize {
        match self {
            Latch::RadioInterfacesReady => 0,
            Latch::RadioPowerReady => 1,
            Latch::SimReady => 2,
            Latch::InitializationReady => 3,
        }
    }
}

struct State {
    generation: u32,
    initial: [usize; LATCHES],
    remaining: [usize; LATCHES],
    wakers: MultiWakerRegistration<READINESS_WAITERS>,
}

pub struct Readiness {
    state: Mutex<RawMutex, RefCell<State>>,
}

/// One party contributing to the latches, e.g. a single handler.
/// It counts each latch down at most once per generation.
pub struct Participant {
    counted: Mutex<RawMutex, Cell<[Option<u32>; LATCHES]>>,
}

impl Participant {
    pub const fn new() -> Self {
        Self {
            counted: Mutex::new(Cell::new([None; LATCHES])),
        }
    }

    /// Record that `latch` is counted in `generation`, false if it already was
    fn mark(&self, latch: Latch, generation: u32) -> bool {
        self.counted.lock(|counted| {
            let mut generations = counted.get();
            let slot = &mut generations[latch.index()];
            if *slot == Some(generation) {
                return false;
            }
            *slot = Some(generation);
            counted.set(generations);
            true
        })
    }
}

impl Default for Participant {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new(num_of_interfaces: usize, num_of_logical_modem: usize) -> Self {
        let initial = [num_of_interfaces, num_of_logical_modem, num_of_logical_modem, 1];
        Self {
            state: Mutex::new(RefCell::new(State {
                generation: 0,
                initial,
                remaining: initial,
                wakers: MultiWakerRegistration::new(),
            })),
        }
    }

    pub fn count_down(&self, latch: Latch) {
        self.state
            .lock(|state| Self::decrement(&mut state.borrow_mut(), latch))
    }

    /// Count `latch` down unless `participant` already did so in the current generation
    pub fn count_down_once(&self, latch: Latch, participant: &Participant) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if !participant.mark(latch, state.generation) {
                return false;
            }
            Self::decrement(&mut state, latch);
            true
        })
    }

    fn decrement(state: &mut State, latch: Latch) {
        let index = latch.index();
        if state.remaining[index] == 0 {
            return;
        }
        state.remaining[index] -= 1;
        trace!("{:?} count {}", latch, state.remaining[index]);
        if state.remaining[index] == 0 {
            debug!("{:?} is open", latch);
            state.wakers.wake();
        }
    }

    pub fn count(&self, latch: Latch) -> usize {
        self.state
            .lock(|state| state.borrow().remaining[latch.index()])
    }

    pub fn is_ready(&self, latch: Latch) -> bool {
        self.count(latch) == 0
    }

    pub fn generation(&self) -> u32 {
        self.state.lock(|state| state.borrow().generation)
    }

    /// Wait for `latch` to open within the current generation
    pub async fn wait(&self, latch: Latch) {
        let generation = self.generation();
        poll_fn(|cx| self.poll_wait(latch, generation, cx)).await
    }

    fn poll_wait(&self, latch: Latch, generation: u32, cx: &mut Context<'_>) -> Poll<()> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.generation == generation && state.remaining[latch.index()] == 0 {
                Poll::Ready(())
            } else {
                state.wakers.register(cx.waker());
                Poll::Pending
            }
        })
    }

    /// Replace every latch with a fresh one
    pub fn reset(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.generation = state.generation.wrapping_add(1);
            state.remaining = state.initial;
            state.wakers.wake();
            info!("Readiness reset to generation {}", state.generation);
        })
    }
}
