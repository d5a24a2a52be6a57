use embassy_sync::pubsub::{PubSubChannel, Subscriber, WaitResult};

use crate::{ConfigError, RawMutex};

/// Number of notifications a registrant may fall behind before it lags
pub const NOTIFIER_CAPACITY: usize = 8;
/// Number of registrants per attribute
pub const NOTIFIER_SUBSCRIBERS: usize = 4;
const NOTIFIER_PUBLISHERS: usize = 1;

/// Marker delivered instead of a value when a change request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Failure {
    InvalidRadioState(i32),
}

pub type Notification<T> = Result<T, Failure>;

pub type Registrant<'a, T> = Subscriber<
    'a,
    RawMutex,
    Notification<T>,
    NOTIFIER_CAPACITY,
    NOTIFIER_SUBSCRIBERS,
    NOTIFIER_PUBLISHERS,
>;

/// Change notification for a single attribute.
///
/// Every registrant receives every notification published after it registered.
/// Nothing is replayed to late registrants.
pub struct Notifier<T: Clone> {
    channel: PubSubChannel<
        RawMutex,
        Notification<T>,
        NOTIFIER_CAPACITY,
        NOTIFIER_SUBSCRIBERS,
        NOTIFIER_PUBLISHERS,
    >,
}

impl<T: Clone> Notifier<T> {
    pub const fn new() -> Self {
        Self {
            channel: PubSubChannel::new(),
        }
    }

    pub fn register(&self) -> Result<Registrant<'_, T>, ConfigError> {
        self.channel
            .subscriber()
            .map_err(|_| ConfigError::TooManyRegistrants)
    }

    pub fn unregister(&self, registrant: Registrant<'_, T>) {
        drop(registrant);
    }

    pub fn notify(&self, value: T) {
        self.channel.immediate_publisher().publish_immediate(Ok(value));
    }

    pub fn notify_failure(&self, failure: Failure) {
        self.channel
            .immediate_publisher()
            .publish_immediate(Err(failure));
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand every pending notification of `registrant` to `f` without waiting
pub fn drain<T: Clone>(registrant: &mut Registrant<'_, T>, mut f: impl FnMut(Notification<T>)) {
    while let Some(result) = registrant.try_next_message() {
        match result {
            WaitResult::Message(notification) => f(notification),
            WaitResult::Lagged(count) => error!("Lagged {} notifications", count),
        }
    }
}
