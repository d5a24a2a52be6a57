//! IRadioConfig
use embassy_sync::mutex::Mutex;
use heapless::Vec;

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::modem_config::notifier::drain;
use crate::modem_config::Registrant;
use crate::types::{PhoneCapability, SimSlotStatusList, SlotPortMapping};
use crate::{ConfigError, Domain, ModemConfig, Opcode, RawMutex, MAX_NUM_OF_SIM_SLOT};

const CLIENT: &str = "MRCFG";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigRequest {
    GetHalDeviceCapabilities,
    GetNumOfLiveModems,
    GetPhoneCapability,
    GetSimSlotsStatus,
    SetNumOfLiveModems {
        num_of_live_modems: u8,
    },
    SetPreferredDataModem {
        modem_id: u8,
    },
    /// Entry `n` is the port logical slot `n` is mapped to
    SetSimSlotsMapping {
        slot_map: Vec<SlotPortMapping, MAX_NUM_OF_SIM_SLOT>,
    },
}

impl RadioRequest for ConfigRequest {
    fn opcode(&self) -> Opcode {
        match self {
            ConfigRequest::GetHalDeviceCapabilities => Opcode::GetHalDeviceCapabilities,
            ConfigRequest::GetNumOfLiveModems => Opcode::GetNumOfLiveModems,
            ConfigRequest::GetPhoneCapability => Opcode::GetPhoneCapability,
            ConfigRequest::GetSimSlotsStatus => Opcode::GetSimSlotsStatus,
            ConfigRequest::SetNumOfLiveModems { .. } => Opcode::SetNumOfLiveModems,
            ConfigRequest::SetPreferredDataModem { .. } => Opcode::SetPreferredDataModem,
            ConfigRequest::SetSimSlotsMapping { .. } => Opcode::SetSimSlotsMapping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigResponse {
    HalDeviceCapabilities { modem_reduced_feature_set1: bool },
    NumOfLiveModems(u8),
    PhoneCapability(PhoneCapability),
    SimSlotsStatus(SimSlotStatusList),
    SetNumOfLiveModems,
    SetPreferredDataModem,
    SetSimSlotsMapping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIndication {
    SimSlotsStatusChanged(SimSlotStatusList),
}

/// Answers from the store of the default subscription
pub struct ConfigHandler<'a> {
    config: &'a ModemConfig,
    sim_slot_status: Mutex<RawMutex, Registrant<'a, SimSlotStatusList>>,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(config: &'a ModemConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            sim_slot_status: Mutex::new(config.register_for_sim_slot_status_changed()?),
        })
    }
}

impl RadioInterfaceHandler for ConfigHandler<'_> {
    const DOMAIN: Domain = Domain::Config;

    type Request = ConfigRequest;
    type Response = ConfigResponse;
    type Indication = ConfigIndication;

    fn process(&self, request: ConfigRequest) -> Result<ConfigResponse, RadioError> {
        match request {
            ConfigRequest::GetHalDeviceCapabilities => Ok(ConfigResponse::HalDeviceCapabilities {
                modem_reduced_feature_set1: false,
            }),
            ConfigRequest::GetNumOfLiveModems => Ok(ConfigResponse::NumOfLiveModems(
                self.config.num_of_live_modems(),
            )),
            ConfigRequest::GetPhoneCapability => Ok(ConfigResponse::PhoneCapability(
                self.config.phone_capability(),
            )),
            ConfigRequest::GetSimSlotsStatus => Ok(ConfigResponse::SimSlotsStatus(
                self.config.sim_slot_status(),
            )),
            ConfigRequest::SetNumOfLiveModems { num_of_live_modems } => {
                if num_of_live_modems == 0
                    || usize::from(num_of_live_modems) > self.config.num_of_phone()
                {
                    warn!("{}: Invalid live modem count {}", CLIENT, num_of_live_modems);
                    return Err(RadioError::InvalidArguments);
                }
                self.config
                    .set_num_of_live_modems(num_of_live_modems, CLIENT)
                    .map_err(store_error)?;
                Ok(ConfigResponse::SetNumOfLiveModems)
            }
            ConfigRequest::SetPreferredDataModem { modem_id } => {
                if !self
                    .config
                    .phone_capability()
                    .logical_modem_ids
                    .contains(&modem_id)
                {
                    warn!("{}: Unknown modem id {}", CLIENT, modem_id);
                    return Err(RadioError::InvalidArguments);
                }
                Ok(ConfigResponse::SetPreferredDataModem)
            }
            ConfigRequest::SetSimSlotsMapping { slot_map } => {
                let port_ok = slot_map.iter().all(|mapping| mapping.port_id == 0);
                if !port_ok {
                    return Err(RadioError::InvalidArguments);
                }
                self.config
                    .set_sim_slots_mapping(&slot_map, CLIENT)
                    .map_err(store_error)?;
                Ok(ConfigResponse::SetSimSlotsMapping)
            }
        }
    }

    fn drain_notifications(&self, indicate: &mut dyn FnMut(ConfigIndication)) {
        if let Ok(mut registrant) = self.sim_slot_status.try_lock() {
            drain(&mut registrant, |notification| match notification {
                Ok(status) => indicate(ConfigIndication::SimSlotsStatusChanged(status)),
                Err(failure) => warn!("{}: Ignoring {:?}", CLIENT, failure),
            });
        }
    }
}

pub(crate) fn store_error(error: ConfigError) -> RadioError {
    match error {
        ConfigError::QueueFull | ConfigError::TooManyRegistrants => RadioError::NoResources,
        ConfigError::InvalidSlot => RadioError::InvalidArguments,
    }
}
