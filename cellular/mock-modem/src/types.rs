use heapless::{String, Vec};
use num_traits::FromPrimitive;

use crate::{MAX_NUM_OF_LOGICAL_MODEM, MAX_NUM_OF_SIM_SLOT};

pub const ICCID_LEN: usize = 22;
pub const ATR_LEN: usize = 80;
pub const EID_LEN: usize = 32;
pub const IMSI_LEN: usize = 15;
pub const AID_LEN: usize = 32;
pub const BASEBAND_VERSION_LEN: usize = 32;
pub const MAX_SIM_APPS: usize = 4;
pub const MAX_PORTS_PER_SLOT: usize = 1;

pub type Iccid = String<ICCID_LEN>;
pub type Atr = String<ATR_LEN>;
pub type Eid = String<EID_LEN>;
pub type Imsi = String<IMSI_LEN>;
pub type BasebandVersion = String<BASEBAND_VERSION_LEN>;
pub type SimSlotStatusList = Vec<SimSlotStatus, MAX_NUM_OF_SIM_SLOT>;

/// Logical slot of a port that is not mapped to any subscription
pub const LOGICAL_SLOT_UNASSIGNED: i32 = -1;
/// App index of an application type the card does not carry
pub const APP_INDEX_ABSENT: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum RadioState {
    Unavailable = 0,
    Off = 1,
    On = 2,
}

impl TryFrom<i32> for RadioState {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        RadioState::from_i32(value).ok_or(value)
    }
}

impl From<RadioState> for i32 {
    fn from(value: RadioState) -> Self {
        value as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum CardState {
    #[default]
    Absent = 0,
    Present = 1,
    Error = 2,
    Restricted = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    #[default]
    Unknown,
    EnabledNotVerified,
    EnabledVerified,
    Disabled,
    EnabledBlocked,
    EnabledPermBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppType {
    Unknown,
    Sim,
    Usim,
    Ruim,
    Csim,
    Isim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    Unknown,
    Detected,
    Pin,
    Puk,
    SubscriptionPerso,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppStatus {
    pub app_type: AppType,
    pub app_state: AppState,
    pub aid: String<AID_LEN>,
    pub pin1: PinState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotPortMapping {
    pub physical_slot_id: i32,
    pub port_id: i32,
}

/// Card status as reported to the subscription owning the slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CardStatus {
    pub card_state: CardState,
    pub universal_pin_state: PinState,
    pub gsm_umts_subscription_app_index: i32,
    pub cdma_subscription_app_index: i32,
    pub ims_subscription_app_index: i32,
    pub applications: Vec<AppStatus, MAX_SIM_APPS>,
    pub atr: Atr,
    pub iccid: Iccid,
    pub eid: Eid,
    pub slot_map: SlotPortMapping,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self {
            card_state: CardState::Absent,
            universal_pin_state: PinState::Unknown,
            gsm_umts_subscription_app_index: APP_INDEX_ABSENT,
            cdma_subscription_app_index: APP_INDEX_ABSENT,
            ims_subscription_app_index: APP_INDEX_ABSENT,
            applications: Vec::new(),
            atr: String::new(),
            iccid: String::new(),
            eid: String::new(),
            slot_map: SlotPortMapping::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimPortInfo {
    pub icc_id: Iccid,
    pub logical_slot_id: i32,
    pub port_active: bool,
}

/// Physical slot status as reported to the config interface
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimSlotStatus {
    pub card_state: CardState,
    pub atr: Atr,
    pub eid: Eid,
    pub port_info: Vec<SimPortInfo, MAX_PORTS_PER_SLOT>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhoneCapability {
    pub max_active_data: u8,
    pub max_active_internet_data: u8,
    pub is_internet_lingering_supported: bool,
    pub logical_modem_ids: Vec<u8, MAX_NUM_OF_LOGICAL_MODEM>,
}

impl Default for PhoneCapability {
    fn default() -> Self {
        let mut logical_modem_ids = Vec::new();
        for id in 0..MAX_NUM_OF_LOGICAL_MODEM as u8 {
            // Capacity is the loop bound
            let _ = logical_modem_ids.push(id);
        }
        Self {
            max_active_data: 2,
            max_active_internet_data: 1,
            is_internet_lingering_supported: false,
            logical_modem_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    pub imei: String<16>,
    pub imeisv: String<2>,
    pub esn: String<16>,
    pub meid: String<16>,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            imei: to_string("123456789012345"),
            imeisv: to_string("01"),
            esn: to_string("123456789"),
            meid: to_string("123456789012345"),
        }
    }
}

/// Copy `value` into a bounded string, truncating whatever does not fit
pub(crate) fn to_string<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
