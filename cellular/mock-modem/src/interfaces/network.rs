//! IRadioNetwork
use embassy_sync::mutex::Mutex;
use heapless::{String, Vec};

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::modem_config::notifier::drain;
use crate::modem_config::Registrant;
use crate::types::{to_string, RadioState};
use crate::{ConfigError, Domain, ModemConfig, Opcode, RawMutex};

const CLIENT: &str = "MRNW";

pub const PLMN_LEN: usize = 6;
pub const MAX_BAND_MODES: usize = 4;
pub const MAX_OPERATORS: usize = 4;
pub const MAX_CHANNEL_SPECIFIERS: usize = 4;

pub type Plmn = String<PLMN_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegState {
    NotRegMtNotSearchingOp,
    RegHome,
    NotRegMtSearchingOp,
    RegDenied,
    Unknown,
    RegRoaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioTechnology {
    Unknown,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegStateResult {
    pub reg_state: RegState,
    pub rat: RadioTechnology,
    pub registered_plmn: Plmn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorInfo {
    pub alpha_long: String<32>,
    pub alpha_short: String<16>,
    pub operator_numeric: Plmn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioAccessSpecifier {
    pub access_network: i32,
    pub bands: Vec<i32, MAX_BAND_MODES>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkRequest {
    GetAvailableBandModes,
    GetAvailableNetworks,
    GetCellInfoList,
    GetDataRegistrationState,
    GetImsRegistrationState,
    GetNetworkSelectionMode,
    GetOperator,
    GetSignalStrength,
    GetSystemSelectionChannels,
    GetUsageSetting,
    GetVoiceRadioTechnology,
    GetVoiceRegistrationState,
    IsNrDualConnectivityEnabled,
    SetNetworkSelectionModeAutomatic,
    SetNetworkSelectionModeManual { operator_numeric: Plmn, ran: i32 },
    SetNrDualConnectivityState { nr_dual_connectivity_state: i32 },
    SetUsageSetting { usage_setting: i32 },
}

impl RadioRequest for NetworkRequest {
    fn opcode(&self) -> Opcode {
        match self {
            NetworkRequest::GetAvailableBandModes => Opcode::GetAvailableBandModes,
            NetworkRequest::GetAvailableNetworks => Opcode::GetAvailableNetworks,
            NetworkRequest::GetCellInfoList => Opcode::GetCellInfoList,
            NetworkRequest::GetDataRegistrationState => Opcode::GetDataRegistrationState,
            NetworkRequest::GetImsRegistrationState => Opcode::GetImsRegistrationState,
            NetworkRequest::GetNetworkSelectionMode => Opcode::GetNetworkSelectionMode,
            NetworkRequest::GetOperator => Opcode::GetOperator,
            NetworkRequest::GetSignalStrength => Opcode::GetSignalStrength,
            NetworkRequest::GetSystemSelectionChannels => Opcode::GetSystemSelectionChannels,
            NetworkRequest::GetUsageSetting => Opcode::GetUsageSetting,
            NetworkRequest::GetVoiceRadioTechnology => Opcode::GetVoiceRadioTechnology,
            NetworkRequest::GetVoiceRegistrationState => Opcode::GetVoiceRegistrationState,
            NetworkRequest::IsNrDualConnectivityEnabled => Opcode::IsNrDualConnectivityEnabled,
            NetworkRequest::SetNetworkSelectionModeAutomatic => {
                Opcode::SetNetworkSelectionModeAutomatic
            }
            NetworkRequest::SetNetworkSelectionModeManual { .. } => {
                Opcode::SetNetworkSelectionModeManual
            }
            NetworkRequest::SetNrDualConnectivityState { .. } => {
                Opcode::SetNrDualConnectivityState
            }
            NetworkRequest::SetUsageSetting { .. } => Opcode::SetUsageSetting,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkResponse {
    AvailableBandModes(Vec<i32, MAX_BAND_MODES>),
    AvailableNetworks(Vec<OperatorInfo, MAX_OPERATORS>),
    DataRegistrationState(RegStateResult),
    SystemSelectionChannels(Vec<RadioAccessSpecifier, MAX_CHANNEL_SPECIFIERS>),
    VoiceRegistrationState(RegStateResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkIndication {
    NetworkStateChanged,
}

pub struct NetworkHandler<'a> {
    config: &'a ModemConfig,
    radio_state: Mutex<RawMutex, Registrant<'a, RadioState>>,
}

impl<'a> NetworkHandler<'a> {
    pub fn new(config: &'a ModemConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            radio_state: Mutex::new(config.register_for_radio_state_changed()?),
        })
    }

    /// Registered on the home network of the sim while the radio is on and a sim is present
    fn registration_state(&self) -> RegStateResult {
        let card = self
            .config
            .own_sim_card()
            .filter(|card| card.is_card_present());
        match card {
            Some(card) if self.config.radio_state() == RadioState::On => RegStateResult {
                reg_state: RegState::RegHome,
                rat: RadioTechnology::Lte,
                registered_plmn: to_string(card.imsi().get(..5).unwrap_or_default()),
            },
            _ => RegStateResult {
                reg_state: RegState::NotRegMtNotSearchingOp,
                rat: RadioTechnology::Unknown,
                registered_plmn: Plmn::new(),
            },
        }
    }
}

impl RadioInterfaceHandler for NetworkHandler<'_> {
    const DOMAIN: Domain = Domain::Network;

    type Request = NetworkRequest;
    type Response = NetworkResponse;
    type Indication = NetworkIndication;

    fn process(&self, request: NetworkRequest) -> Result<NetworkResponse, RadioError> {
        match request {
            NetworkRequest::GetVoiceRegistrationState => Ok(
                NetworkResponse::VoiceRegistrationState(self.registration_state()),
            ),
            NetworkRequest::GetDataRegistrationState => Ok(
                NetworkResponse::DataRegistrationState(self.registration_state()),
            ),
            NetworkRequest::GetAvailableBandModes => {
                Ok(NetworkResponse::AvailableBandModes(Vec::new()))
            }
            NetworkRequest::GetAvailableNetworks => {
                Ok(NetworkResponse::AvailableNetworks(Vec::new()))
            }
            NetworkRequest::GetSystemSelectionChannels => {
                Ok(NetworkResponse::SystemSelectionChannels(Vec::new()))
            }
            _ => Err(RadioError::RequestNotSupported),
        }
    }

    fn drain_notifications(&self, indicate: &mut dyn FnMut(NetworkIndication)) {
        if let Ok(mut registrant) = self.radio_state.try_lock() {
            drain(&mut registrant, |notification| match notification {
                Ok(state) => {
                    debug!("{}: Radio state {:?}, network state changed", CLIENT, state);
                    indicate(NetworkIndication::NetworkStateChanged);
                }
                Err(failure) => warn!("{}: Ignoring {:?}", CLIENT, failure),
            });
        }
    }
}
