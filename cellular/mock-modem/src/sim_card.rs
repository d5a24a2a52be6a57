//! A physical SIM card sitting in one slot of the mock modem.
//!
//! The identity of the card comes from a fixed profile table. Profile 0 is the
//! empty slot, the other profiles are operator cards with stable identities.
use heapless::Vec;

use crate::types::{
    to_string, AppState, AppStatus, AppType, Atr, CardState, CardStatus, Eid, Iccid, Imsi,
    PinState, SimPortInfo, SimSlotStatus, SlotPortMapping, APP_INDEX_ABSENT,
    LOGICAL_SLOT_UNASSIGNED, MAX_SIM_APPS,
};

pub const SIM_PROFILE_ID_DEFAULT: u8 = 0;
pub const SIM_PROFILE_ID_TWN_CHT: u8 = 1;
pub const SIM_PROFILE_ID_TWN_FET: u8 = 2;

struct SimProfile {
    id: u8,
    iccid: &'static str,
    atr: &'static str,
    eid: &'static str,
    imsi: &'static str,
    aid: &'static str,
}

static PROFILES: [SimProfile; 2] = [
    SimProfile {
        id: SIM_PROFILE_ID_TWN_CHT,
        iccid: "89886920042507847155",
        atr: "3B9F96801FC78031E073FE211B630579DB8300FF",
        eid: "",
        imsi: "466920123456789",
        aid: "A0000000871002F886FF9289050B00FE",
    },
    SimProfile {
        id: SIM_PROFILE_ID_TWN_FET,
        iccid: "89886021157300856597",
        atr: "3B9F96801FC78031E073FE211B6458",
        eid: "89049032000001000000012345678901",
        imsi: "466011234567890",
        aid: "A0000000871002F310FFFF89080000FF",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimCard {
    physical_slot_id: usize,
    logical_slot_id: i32,
    port_id: i32,
    port_active: bool,
    card_present: bool,
    profile_id: u8,
    /// Profile of the last operator card, restored when the card comes back
    removed_profile_id: u8,
    iccid: Iccid,
    atr: Atr,
    eid: Eid,
    imsi: Imsi,
    universal_pin_state: PinState,
    gsm_app_index: i32,
    cdma_app_index: i32,
    ims_app_index: i32,
    applications: Vec<AppStatus, MAX_SIM_APPS>,
}

impl SimCard {
    /// Create the card of `physical_slot_id` with the empty slot profile.
    /// The single port is active and mapped to the logical slot with the same index.
    pub fn new(physical_slot_id: usize) -> Self {
        Self {
            physical_slot_id,
            logical_slot_id: physical_slot_id as i32,
            port_id: 0,
            port_active: true,
            card_present: false,
            profile_id: SIM_PROFILE_ID_DEFAULT,
            removed_profile_id: SIM_PROFILE_ID_DEFAULT,
            iccid: Iccid::new(),
            atr: Atr::new(),
            eid: Eid::new(),
            imsi: Imsi::new(),
            universal_pin_state: PinState::Unknown,
            gsm_app_index: APP_INDEX_ABSENT,
            cdma_app_index: APP_INDEX_ABSENT,
            ims_app_index: APP_INDEX_ABSENT,
            applications: Vec::new(),
        }
    }

    pub fn load_profile(&mut self, profile_id: u8) {
        let Some(profile) = PROFILES.iter().find(|p| p.id == profile_id) else {
            if profile_id != SIM_PROFILE_ID_DEFAULT {
                warn!(
                    "Unknown sim profile {} in slot {}, treating it as absent",
                    profile_id,
                    self.physical_slot_id
                );
            }
            self.clear();
            return;
        };

        debug!(
            "Loading sim profile {} in slot {}",
            profile_id, self.physical_slot_id
        );
        self.profile_id = profile.id;
        self.card_present = true;
        self.iccid = to_string(profile.iccid);
        self.atr = to_string(profile.atr);
        self.eid = to_string(profile.eid);
        self.imsi = to_string(profile.imsi);
        self.universal_pin_state = PinState::Disabled;
        self.gsm_app_index = 0;
        self.cdma_app_index = APP_INDEX_ABSENT;
        self.ims_app_index = APP_INDEX_ABSENT;
        self.applications.clear();
        // The table never holds more apps than the card can carry
        let _ = self.applications.push(AppStatus {
            app_type: AppType::Usim,
            app_state: AppState::Ready,
            aid: to_string(profile.aid),
            pin1: PinState::Disabled,
        });
    }

    /// Removing a card drops its identity. Putting it back reloads the operator
    /// profile it had; a slot that never held one gets a blank card with no
    /// identity and no applications.
    pub fn set_present(&mut self, present: bool) {
        match (present, self.card_present) {
            (true, false) if self.removed_profile_id != SIM_PROFILE_ID_DEFAULT => {
                self.load_profile(self.removed_profile_id)
            }
            (true, _) => self.card_present = true,
            (false, true) => {
                let removed_profile_id = self.profile_id;
                self.clear();
                self.removed_profile_id = removed_profile_id;
            }
            (false, false) => {}
        }
    }

    /// Map the port of this card to `logical_slot_id` and activate it
    pub fn set_logical_slot(&mut self, logical_slot_id: i32) {
        self.logical_slot_id = logical_slot_id;
        self.port_active = true;
    }

    fn clear(&mut self) {
        let physical_slot_id = self.physical_slot_id;
        let logical_slot_id = self.logical_slot_id;
        let port_active = self.port_active;
        *self = Self::new(physical_slot_id);
        self.logical_slot_id = logical_slot_id;
        self.port_active = port_active;
    }

    pub fn is_card_present(&self) -> bool {
        self.card_present
    }

    pub fn is_slot_port_active(&self) -> bool {
        self.port_active
    }

    pub fn profile_id(&self) -> u8 {
        self.profile_id
    }

    pub fn physical_slot_id(&self) -> usize {
        self.physical_slot_id
    }

    /// The logical slot, or [`LOGICAL_SLOT_UNASSIGNED`] while the port is inactive
    pub fn logical_slot_id(&self) -> i32 {
        if self.port_active {
            self.logical_slot_id
        } else {
            LOGICAL_SLOT_UNASSIGNED
        }
    }

    pub fn slot_port_id(&self) -> i32 {
        self.port_id
    }

    pub fn iccid(&self) -> &Iccid {
        &self.iccid
    }

    pub fn atr(&self) -> &Atr {
        &self.atr
    }

    pub fn eid(&self) -> &Eid {
        &self.eid
    }

    pub fn imsi(&self) -> &Imsi {
        &self.imsi
    }

    pub fn universal_pin_state(&self) -> PinState {
        self.universal_pin_state
    }

    pub fn gsm_app_index(&self) -> i32 {
        self.gsm_app_index
    }

    pub fn cdma_app_index(&self) -> i32 {
        self.cdma_app_index
    }

    pub fn ims_app_index(&self) -> i32 {
        self.ims_app_index
    }

    pub fn applications(&self) -> &[AppStatus] {
        &self.applications
    }

    pub fn card_state(&self) -> CardState {
        if self.card_present {
            CardState::Present
        } else {
            CardState::Absent
        }
    }

    pub fn slot_port_mapping(&self) -> SlotPortMapping {
        SlotPortMapping {
            physical_slot_id: self.physical_slot_id as i32,
            port_id: self.port_id,
        }
    }

    pub fn slot_status(&self) -> SimSlotStatus {
        let mut port_info = Vec::new();
        let _ = port_info.push(SimPortInfo {
            icc_id: self.iccid.clone(),
            logical_slot_id: self.logical_slot_id(),
            port_active: self.port_active,
        });
        SimSlotStatus {
            card_state: self.card_state(),
            atr: self.atr.clone(),
            eid: self.eid.clone(),
            port_info,
        }
    }

    pub fn card_status(&self) -> CardStatus {
        CardStatus {
            card_state: self.card_state(),
            universal_pin_state: self.universal_pin_state,
            gsm_umts_subscription_app_index: self.gsm_app_index,
            cdma_subscription_app_index: self.cdma_app_index,
            ims_subscription_app_index: self.ims_app_index,
            applications: self.applications.clone(),
            atr: self.atr.clone(),
            iccid: self.iccid.clone(),
            eid: self.eid.clone(),
            slot_map: self.slot_port_mapping(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_is_absent() {
        let card = SimCard::new(1);

        assert!(!card.is_card_present());
        assert!(card.is_slot_port_active());
        assert_eq!(1, card.logical_slot_id());
        assert_eq!(CardState::Absent, card.card_state());
        assert!(card.iccid().is_empty());
        assert_eq!(APP_INDEX_ABSENT, card.gsm_app_index());
        assert!(card.applications().is_empty());
    }

    #[test]
    fn can_load_vendor_profile() {
        let mut card = SimCard::new(0);

        card.load_profile(SIM_PROFILE_ID_TWN_FET);

        assert!(card.is_card_present());
        assert_eq!(SIM_PROFILE_ID_TWN_FET, card.profile_id());
        assert_eq!("89886021157300856597", card.iccid().as_str());
        assert_eq!("466011234567890", card.imsi().as_str());
        assert_eq!(32, card.eid().len());
        assert_eq!(0, card.gsm_app_index());
        assert_eq!(1, card.applications().len());
        assert_eq!(AppState::Ready, card.applications()[0].app_state);
    }

    #[test]
    fn unknown_profile_is_absent() {
        let mut card = SimCard::new(0);
        card.load_profile(SIM_PROFILE_ID_TWN_CHT);

        card.load_profile(42);

        assert!(!card.is_card_present());
        assert_eq!(SIM_PROFILE_ID_DEFAULT, card.profile_id());
        assert!(card.iccid().is_empty());
    }

    #[test]
    fn removing_card_clears_identity() {
        let mut card = SimCard::new(0);
        card.load_profile(SIM_PROFILE_ID_TWN_CHT);
        card.set_logical_slot(1);

        card.set_present(false);

        assert!(!card.is_card_present());
        assert!(card.iccid().is_empty());
        assert!(card.atr().is_empty());
        assert!(card.imsi().is_empty());
        assert_eq!(1, card.logical_slot_id());
    }

    #[test]
    fn card_comes_back_with_its_profile() {
        let mut card = SimCard::new(0);
        card.load_profile(SIM_PROFILE_ID_TWN_FET);

        card.set_present(false);
        card.set_present(true);

        assert!(card.is_card_present());
        assert_eq!(SIM_PROFILE_ID_TWN_FET, card.profile_id());
        assert_eq!("89886021157300856597", card.iccid().as_str());
        assert_eq!(1, card.applications().len());
    }

    #[test]
    fn present_flag_alone_gives_blank_card() {
        let mut card = SimCard::new(0);
        card.load_profile(SIM_PROFILE_ID_TWN_CHT);
        card.load_profile(SIM_PROFILE_ID_DEFAULT);

        card.set_present(true);
        card.set_present(true);

        assert!(card.is_card_present());
        assert_eq!(CardState::Present, card.card_state());
        assert_eq!(SIM_PROFILE_ID_DEFAULT, card.profile_id());
        assert!(card.iccid().is_empty());
        assert!(card.applications().is_empty());
    }

    #[test]
    fn card_status_follows_card() {
        let mut card = SimCard::new(1);
        card.load_profile(SIM_PROFILE_ID_TWN_CHT);

        let status = card.card_status();

        assert_eq!(CardState::Present, status.card_state);
        assert_eq!(card.iccid(), &status.iccid);
        assert_eq!(1, status.slot_map.physical_slot_id);
        assert_eq!(0, status.slot_map.port_id);
        assert_eq!(PinState::Disabled, status.universal_pin_state);
    }

    #[test]
    fn slot_status_follows_card() {
        let mut card = SimCard::new(0);
        card.load_profile(SIM_PROFILE_ID_TWN_FET);

        let status = card.slot_status();

        assert_eq!(CardState::Present, status.card_state);
        assert_eq!(card.eid(), &status.eid);
        assert_eq!(1, status.port_info.len());
        assert_eq!(card.iccid(), &status.port_info[0].icc_id);
        assert_eq!(0, status.port_info[0].logical_slot_id);
        assert!(status.port_info[0].port_active);
    }
}
