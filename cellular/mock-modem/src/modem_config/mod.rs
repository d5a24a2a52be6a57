//! Per-subscription configuration store.
//!
//! All mutations are queued as events and applied in order by the single
//! worker draining the store, see [`ModemConfig::run`] and [`ModemConfig::process_events`].
//! Every applied change publishes a notification to the registrants of the
//! attribute that changed, and only if it actually changed.
use core::cell::RefCell;
use core::future::Future;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

use crate::sim_card::SimCard;
use crate::types::{
    to_string, BasebandVersion, CardStatus, DeviceIdentity, PhoneCapability, RadioState,
    SimSlotStatusList, SlotPortMapping,
};
use crate::{ConfigError, RawMutex, MAX_NUM_OF_LOGICAL_MODEM, MAX_NUM_OF_SIM_SLOT};

pub mod notifier;

pub use notifier::{Failure, Notification, Notifier, Registrant};

pub const EVENT_QUEUE_CAPACITY: usize = 16;
pub const DEFAULT_SUB_ID: u8 = 0;
pub const DEFAULT_BASEBAND_VERSION: &str = "mock-modem-service-1.0";
pub const DEFAULT_NUM_OF_LIVE_MODEM: u8 = 1;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ConfigEvent {
    SetRadioPower {
        state: i32,
        client: &'static str,
    },
    SetSimPresent {
        slot: usize,
        present: bool,
        client: &'static str,
    },
    ChangeSimProfile {
        slot: usize,
        profile_id: u8,
        client: &'static str,
    },
    SetNumOfLiveModems {
        count: u8,
        client: &'static str,
    },
    SetSimSlotsMapping {
        mappings: Vec<SlotPortMapping, MAX_NUM_OF_SIM_SLOT>,
        client: &'static str,
    },
}

struct ConfigState {
    radio_state: RadioState,
    baseband_version: BasebandVersion,
    device_identity: DeviceIdentity,
    num_of_live_modem: u8,
    phone_capability: PhoneCapability,
    sim_cards: Vec<SimCard, MAX_NUM_OF_SIM_SLOT>,
    sim_slot_status: SimSlotStatusList,
    card_status: CardStatus,
}

pub struct ModemConfig {
    instance_id: u8,
    sim_physical_id: Option<usize>,
    num_of_sim: usize,
    num_of_phone: usize,
    state: Mutex<RawMutex, RefCell<ConfigState>>,
    events: Channel<RawMutex, ConfigEvent, EVENT_QUEUE_CAPACITY>,
    pending: Signal<RawMutex, ()>,
    num_of_live_modem_changed: Notifier<u8>,
    phone_capability_changed: Notifier<PhoneCapability>,
    sim_slot_status_changed: Notifier<SimSlotStatusList>,
    baseband_version_changed: Notifier<BasebandVersion>,
    device_identity_changed: Notifier<DeviceIdentity>,
    radio_state_changed: Notifier<RadioState>,
    card_status_changed: Notifier<CardStatus>,
}

impl ModemConfig {
    /// Create the store of subscription `instance_id`.
    /// The sim and phone counts are clamped to what the modem supports.
    pub fn new(instance_id: u8, num_of_sim: usize, num_of_phone: usize) -> Self {
        let num_of_sim = num_of_sim.clamp(1, MAX_NUM_OF_SIM_SLOT);
        let num_of_phone = num_of_phone.clamp(1, MAX_NUM_OF_LOGICAL_MODEM);

        let mut sim_cards = Vec::new();
        for slot in 0..num_of_sim {
            let _ = sim_cards.push(SimCard::new(slot));
        }

        // The sim in the slot with the same index belongs to this subscription
        let sim_physical_id = Some(usize::from(instance_id)).filter(|id| *id < num_of_sim);
        if sim_physical_id.is_none() {
            error!(
                "MockModemConfig[{}]: Invalid Sim physical id",
                instance_id
            );
        }

        let mut sim_slot_status = SimSlotStatusList::new();
        if instance_id == DEFAULT_SUB_ID {
            for card in sim_cards.iter() {
                let _ = sim_slot_status.push(card.slot_status());
            }
        }

        let card_status = sim_physical_id
            .and_then(|id| sim_cards.get(id))
            .map(|card| card.card_status())
            .unwrap_or_default();

        Self {
            instance_id,
            sim_physical_id,
            num_of_sim,
            num_of_phone,
            state: Mutex::new(RefCell::new(ConfigState {
                radio_state: RadioState::Unavailable,
                baseband_version: to_string(DEFAULT_BASEBAND_VERSION),
                device_identity: DeviceIdentity::default(),
                num_of_live_modem: DEFAULT_NUM_OF_LIVE_MODEM,
                phone_capability: PhoneCapability::default(),
                sim_cards,
                sim_slot_status,
                card_status,
            })),
            events: Channel::new(),
            pending: Signal::new(),
            num_of_live_modem_changed: Notifier::new(),
            phone_capability_changed: Notifier::new(),
            sim_slot_status_changed: Notifier::new(),
            baseband_version_changed: Notifier::new(),
            device_identity_changed: Notifier::new(),
            radio_state_changed: Notifier::new(),
            card_status_changed: Notifier::new(),
        }
    }

    pub fn instance_id(&self) -> u8 {
        self.instance_id
    }

    /// Whether this is the store of the default subscription, the one reporting slot status
    pub fn is_primary(&self) -> bool {
        self.instance_id == DEFAULT_SUB_ID
    }

    pub fn num_of_sim(&self) -> usize {
        self.num_of_sim
    }

    pub fn num_of_phone(&self) -> usize {
        self.num_of_phone
    }

    /// The physical slot of the sim owned by this subscription, if there is one
    pub fn sim_physical_id(&self) -> Option<usize> {
        self.sim_physical_id
    }

    // Mutations

    pub fn set_radio_state(&self, state: i32, client: &'static str) -> Result<(), ConfigError> {
        self.post(ConfigEvent::SetRadioPower { state, client })
    }

    /// Set the presence of the sim owned by this subscription
    pub fn set_sim_present(&self, present: bool, client: &'static str) -> Result<(), ConfigError> {
        let slot = self.sim_physical_id.ok_or(ConfigError::InvalidSlot)?;
        self.set_sim_present_on(slot, present, client)
    }

    pub fn set_sim_present_on(
        &self,
        slot: usize,
        present: bool,
        client: &'static str,
    ) -> Result<(), ConfigError> {
        self.check_slot(slot)?;
        self.post(ConfigEvent::SetSimPresent {
            slot,
            present,
            client,
        })
    }

    pub fn change_sim_profile(
        &self,
        slot: usize,
        profile_id: u8,
        client: &'static str,
    ) -> Result<(), ConfigError> {
        self.check_slot(slot)?;
        self.post(ConfigEvent::ChangeSimProfile {
            slot,
            profile_id,
            client,
        })
    }

    pub fn set_num_of_live_modems(&self, count: u8, client: &'static str) -> Result<(), ConfigError> {
        self.post(ConfigEvent::SetNumOfLiveModems { count, client })
    }

    /// Map logical slot `n` to the port described by `mappings[n]`
    pub fn set_sim_slots_mapping(
        &self,
        mappings: &[SlotPortMapping],
        client: &'static str,
    ) -> Result<(), ConfigError> {
        let mut queued = Vec::new();
        for mapping in mappings {
            let slot = usize::try_from(mapping.physical_slot_id)
                .map_err(|_| ConfigError::InvalidSlot)?;
            self.check_slot(slot)?;
            queued.push(*mapping).map_err(|_| ConfigError::InvalidSlot)?;
        }
        self.post(ConfigEvent::SetSimSlotsMapping {
            mappings: queued,
            client,
        })
    }

    fn check_slot(&self, slot: usize) -> Result<(), ConfigError> {
        if slot < self.num_of_sim {
            Ok(())
        } else {
            error!(
                "MockModemConfig[{}]: Invalid sim slot {}",
                self.instance_id,
                slot
            );
            Err(ConfigError::InvalidSlot)
        }
    }

    fn post(&self, event: ConfigEvent) -> Result<(), ConfigError> {
        self.events.try_send(event).map_err(|_| {
            error!("MockModemConfig[{}]: Event queue is full", self.instance_id);
            ConfigError::QueueFull
        })?;
        self.pending.signal(());
        Ok(())
    }

    // Event processing

    /// Wait until events have been queued since the last wait
    pub async fn wait_for_events(&self) {
        self.pending.wait().await
    }

    pub fn poll_events(&self, cx: &mut Context<'_>) -> Poll<()> {
        core::pin::pin!(self.pending.wait()).poll(cx)
    }

    /// Apply every queued event in order and return how many were applied
    pub fn process_events(&self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events.try_receive() {
            self.apply(event);
            processed += 1;
        }
        processed
    }

    /// The worker loop of this store
    pub async fn run(&self) -> ! {
        loop {
            self.wait_for_events().await;
            self.process_events();
        }
    }

    fn apply(&self, event: ConfigEvent) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            match event {
                ConfigEvent::SetRadioPower { state: raw, client } => {
                    self.apply_radio_state(&mut state, raw, client)
                }
                ConfigEvent::SetSimPresent {
                    slot,
                    present,
                    client,
                } => {
                    debug!(
                        "MockModemConfig[{}]: Sim in slot {} present {} from {}",
                        self.instance_id,
                        slot,
                        present,
                        client
                    );
                    self.apply_sim_change(&mut state, slot, |card| card.set_present(present));
                }
                ConfigEvent::ChangeSimProfile {
                    slot,
                    profile_id,
                    client,
                } => {
                    debug!(
                        "MockModemConfig[{}]: Sim in slot {} changes to profile {} from {}",
                        self.instance_id,
                        slot,
                        profile_id,
                        client
                    );
                    self.apply_sim_change(&mut state, slot, |card| card.load_profile(profile_id));
                }
                ConfigEvent::SetNumOfLiveModems { count, client } => {
                    debug!(
                        "MockModemConfig[{}]: Live modems {} from {}",
                        self.instance_id,
                        count,
                        client
                    );
                    if state.num_of_live_modem != count {
                        state.num_of_live_modem = count;
                        self.num_of_live_modem_changed.notify(count);
                    }
                }
                ConfigEvent::SetSimSlotsMapping { mappings, client } => {
                    debug!(
                        "MockModemConfig[{}]: Slot mapping from {}",
                        self.instance_id,
                        client
                    );
                    for (logical_slot, mapping) in mappings.iter().enumerate() {
                        let physical_slot = mapping.physical_slot_id as usize;
                        if let Some(card) = state.sim_cards.get_mut(physical_slot) {
                            card.set_logical_slot(logical_slot as i32);
                        }
                    }
                    self.refresh_sim_status(&mut state);
                }
            }
        })
    }

    fn apply_radio_state(&self, state: &mut ConfigState, raw: i32, client: &'static str) {
        match RadioState::try_from(raw) {
            Ok(new_state) => {
                debug!(
                    "MockModemConfig[{}]: Radio state {:?} -> {:?} from {}",
                    self.instance_id,
                    state.radio_state,
                    new_state,
                    client
                );
                if state.radio_state != new_state {
                    state.radio_state = new_state;
                    self.radio_state_changed.notify(new_state);
                }
            }
            Err(raw) => {
                error!(
                    "MockModemConfig[{}]: Invalid radio state {} from {}",
                    self.instance_id,
                    raw,
                    client
                );
                self.radio_state_changed
                    .notify_failure(Failure::InvalidRadioState(raw));
            }
        }
    }

    fn apply_sim_change(
        &self,
        state: &mut ConfigState,
        slot: usize,
        change: impl FnOnce(&mut SimCard),
    ) {
        let Some(card) = state.sim_cards.get_mut(slot) else {
            error!(
                "MockModemConfig[{}]: Invalid sim slot {}",
                self.instance_id,
                slot
            );
            return;
        };
        change(card);
        self.refresh_sim_status(state);
    }

    /// Recompute the aggregates derived from the sims and notify each one that changed, once
    fn refresh_sim_status(&self, state: &mut ConfigState) {
        if self.is_primary() {
            let mut sim_slot_status = SimSlotStatusList::new();
            for card in state.sim_cards.iter() {
                let _ = sim_slot_status.push(card.slot_status());
            }
            if state.sim_slot_status != sim_slot_status {
                state.sim_slot_status = sim_slot_status;
                self.sim_slot_status_changed
                    .notify(state.sim_slot_status.clone());
            }
        }

        let card_status = self
            .sim_physical_id
            .and_then(|slot| state.sim_cards.get(slot))
            .map(|card| card.card_status());
        if let Some(card_status) = card_status {
            if state.card_status != card_status {
                state.card_status = card_status;
                self.card_status_changed.notify(state.card_status.clone());
            }
        }
    }

    /// Publish the current value of every attribute to its registrants
    pub fn notify_all_registrant_notifications(&self) {
        debug!(
            "MockModemConfig[{}]: notifyAllRegistrantNotifications",
            self.instance_id
        );
        self.state.lock(|state| {
            let state = state.borrow();
            self.num_of_live_modem_changed.notify(state.num_of_live_modem);
            self.phone_capability_changed
                .notify(state.phone_capability.clone());
            if self.is_primary() {
                self.sim_slot_status_changed
                    .notify(state.sim_slot_status.clone());
            }
            self.baseband_version_changed
                .notify(state.baseband_version.clone());
            self.device_identity_changed
                .notify(state.device_identity.clone());
            self.radio_state_changed.notify(state.radio_state);
            self.card_status_changed.notify(state.card_status.clone());
        })
    }

    // Snapshots

    fn read<R>(&self, f: impl FnOnce(&ConfigState) -> R) -> R {
        self.state.lock(|state| f(&state.borrow()))
    }

    pub fn radio_state(&self) -> RadioState {
        self.read(|state| state.radio_state)
    }

    pub fn baseband_version(&self) -> BasebandVersion {
        self.read(|state| state.baseband_version.clone())
    }

    pub fn device_identity(&self) -> DeviceIdentity {
        self.read(|state| state.device_identity.clone())
    }

    pub fn num_of_live_modems(&self) -> u8 {
        self.read(|state| state.num_of_live_modem)
    }

    pub fn phone_capability(&self) -> PhoneCapability {
        self.read(|state| state.phone_capability.clone())
    }

    /// Empty on every store but the primary one
    pub fn sim_slot_status(&self) -> SimSlotStatusList {
        self.read(|state| state.sim_slot_status.clone())
    }

    pub fn card_status(&self) -> CardStatus {
        self.read(|state| state.card_status.clone())
    }

    pub fn sim_card(&self, slot: usize) -> Option<SimCard> {
        self.read(|state| state.sim_cards.get(slot).cloned())
    }

    /// The sim owned by this subscription, if there is one
    pub fn own_sim_card(&self) -> Option<SimCard> {
        self.sim_physical_id.and_then(|slot| self.sim_card(slot))
    }

    // Registration

    pub fn register_for_num_of_live_modem_changed(&self) -> Result<Registrant<'_, u8>, ConfigError> {
        self.num_of_live_modem_changed.register()
    }

    pub fn unregister_for_num_of_live_modem_changed(&self, registrant: Registrant<'_, u8>) {
        self.num_of_live_modem_changed.unregister(registrant)
    }

    pub fn register_for_phone_capability_changed(
        &self,
    ) -> Result<Registrant<'_, PhoneCapability>, ConfigError> {
        self.phone_capability_changed.register()
    }

    pub fn unregister_for_phone_capability_changed(
        &self,
        registrant: Registrant<'_, PhoneCapability>,
    ) {
        self.phone_capability_changed.unregister(registrant)
    }

    pub fn register_for_sim_slot_status_changed(
        &self,
    ) -> Result<Registrant<'_, SimSlotStatusList>, ConfigError> {
        self.sim_slot_status_changed.register()
    }

    pub fn unregister_for_sim_slot_status_changed(
        &self,
        registrant: Registrant<'_, SimSlotStatusList>,
    ) {
        self.sim_slot_status_changed.unregister(registrant)
    }

    pub fn register_for_baseband_version_changed(
        &self,
    ) -> Result<Registrant<'_, BasebandVersion>, ConfigError> {
        self.baseband_version_changed.register()
    }

    pub fn unregister_for_baseband_version_changed(
        &self,
        registrant: Registrant<'_, BasebandVersion>,
    ) {
        self.baseband_version_changed.unregister(registrant)
    }

    pub fn register_for_device_identity_changed(
        &self,
    ) -> Result<Registrant<'_, DeviceIdentity>, ConfigError> {
        self.device_identity_changed.register()
    }

    pub fn unregister_for_device_identity_changed(
        &self,
        registrant: Registrant<'_, DeviceIdentity>,
    ) {
        self.device_identity_changed.unregister(registrant)
    }

    pub fn register_for_radio_state_changed(
        &self,
    ) -> Result<Registrant<'_, RadioState>, ConfigError> {
        self.radio_state_changed.register()
    }

    pub fn unregister_for_radio_state_changed(&self, registrant: Registrant<'_, RadioState>) {
        self.radio_state_changed.unregister(registrant)
    }

    pub fn register_for_card_status_changed(
        &self,
    ) -> Result<Registrant<'_, CardStatus>, ConfigError> {
        self.card_status_changed.register()
    }

    pub fn unregister_for_card_status_changed(&self, registrant: Registrant<'_, CardStatus>) {
        self.card_status_changed.unregister(registrant)
    }
}
