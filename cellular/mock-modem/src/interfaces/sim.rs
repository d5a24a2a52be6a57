//! IRadioSim
use embassy_sync::mutex::Mutex;
use heapless::String;

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::modem_config::notifier::drain;
use crate::modem_config::Registrant;
use crate::service::ServiceContext;
use crate::types::{CardStatus, Imsi, AID_LEN};
use crate::{ConfigError, Domain, Latch, ModemConfig, Opcode, Participant, RawMutex};

const CLIENT: &str = "MRSIM";

pub const PIN_LEN: usize = 8;
pub const FACILITY_LEN: usize = 4;
pub const APDU_DATA_LEN: usize = 64;

pub type Pin = String<PIN_LEN>;
pub type Aid = String<AID_LEN>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimApdu {
    pub session_id: i32,
    pub cla: i32,
    pub instruction: i32,
    pub p1: i32,
    pub p2: i32,
    pub p3: i32,
    pub data: String<APDU_DATA_LEN>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhonebookRecord {
    pub record_id: i32,
    pub name: String<32>,
    pub number: String<24>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimRequest {
    AreUiccApplicationsEnabled,
    ChangeIccPin2ForApp {
        old_pin2: Pin,
        new_pin2: Pin,
        aid: Aid,
    },
    ChangeIccPinForApp {
        old_pin: Pin,
        new_pin: Pin,
        aid: Aid,
    },
    EnableUiccApplications {
        enable: bool,
    },
    GetFacilityLockForApp {
        facility: String<FACILITY_LEN>,
        password: Pin,
        service_class: i32,
        aid: Aid,
    },
    GetIccCardStatus,
    GetImsiForApp {
        aid: Aid,
    },
    GetSimPhonebookCapacity,
    GetSimPhonebookRecords,
    IccCloseLogicalChannel {
        channel_id: i32,
    },
    IccOpenLogicalChannel {
        aid: Aid,
        p2: i32,
    },
    IccTransmitApduBasicChannel(SimApdu),
    IccTransmitApduLogicalChannel(SimApdu),
    ReportStkServiceIsRunning,
    SetFacilityLockForApp {
        facility: String<FACILITY_LEN>,
        lock_state: bool,
        password: Pin,
        service_class: i32,
        aid: Aid,
    },
    SetSimCardPower {
        power_up: bool,
    },
    SupplyIccPin2ForApp {
        pin2: Pin,
        aid: Aid,
    },
    SupplyIccPinForApp {
        pin: Pin,
        aid: Aid,
    },
    SupplyIccPuk2ForApp {
        puk2: Pin,
        pin2: Pin,
        aid: Aid,
    },
    SupplyIccPukForApp {
        puk: Pin,
        pin: Pin,
        aid: Aid,
    },
    UpdateSimPhonebookRecords(PhonebookRecord),
}

impl RadioRequest for SimRequest {
    fn opcode(&self) -> Opcode {
        match self {
            SimRequest::AreUiccApplicationsEnabled => Opcode::AreUiccApplicationsEnabled,
            SimRequest::ChangeIccPin2ForApp { .. } => Opcode::ChangeIccPin2ForApp,
            SimRequest::ChangeIccPinForApp { .. } => Opcode::ChangeIccPinForApp,
            SimRequest::EnableUiccApplications { .. } => Opcode::EnableUiccApplications,
            SimRequest::GetFacilityLockForApp { .. } => Opcode::GetFacilityLockForApp,
            SimRequest::GetIccCardStatus => Opcode::GetIccCardStatus,
            SimRequest::GetImsiForApp { .. } => Opcode::GetImsiForApp,
            SimRequest::GetSimPhonebookCapacity => Opcode::GetSimPhonebookCapacity,
            SimRequest::GetSimPhonebookRecords => Opcode::GetSimPhonebookRecords,
            SimRequest::IccCloseLogicalChannel { .. } => Opcode::IccCloseLogicalChannel,
            SimRequest::IccOpenLogicalChannel { .. } => Opcode::IccOpenLogicalChannel,
            SimRequest::IccTransmitApduBasicChannel(_) => Opcode::IccTransmitApduBasicChannel,
            SimRequest::IccTransmitApduLogicalChannel(_) => Opcode::IccTransmitApduLogicalChannel,
            SimRequest::ReportStkServiceIsRunning => Opcode::ReportStkServiceIsRunning,
            SimRequest::SetFacilityLockForApp { .. } => Opcode::SetFacilityLockForApp,
            SimRequest::SetSimCardPower { .. } => Opcode::SetSimCardPower,
            SimRequest::SupplyIccPin2ForApp { .. } => Opcode::SupplyIccPin2ForApp,
            SimRequest::SupplyIccPinForApp { .. } => Opcode::SupplyIccPinForApp,
            SimRequest::SupplyIccPuk2ForApp { .. } => Opcode::SupplyIccPuk2ForApp,
            SimRequest::SupplyIccPukForApp { .. } => Opcode::SupplyIccPukForApp,
            SimRequest::UpdateSimPhonebookRecords(_) => Opcode::UpdateSimPhonebookRecords,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimResponse {
    IccCardStatus(CardStatus),
    ImsiForApp(Imsi),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimIndication {
    SimStatusChanged,
    SubscriptionStatusChanged { activate: bool },
    UiccApplicationsEnablementChanged { enabled: bool },
    SimPhonebookChanged,
}

pub struct SimHandler<'a> {
    config: &'a ModemConfig,
    context: &'a ServiceContext,
    card_status: Mutex<RawMutex, Registrant<'a, CardStatus>>,
    participant: Participant,
}

impl<'a> SimHandler<'a> {
    pub fn new(config: &'a ModemConfig, context: &'a ServiceContext) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            context,
            card_status: Mutex::new(config.register_for_card_status_changed()?),
            participant: Participant::new(),
        })
    }
}

impl RadioInterfaceHandler for SimHandler<'_> {
    const DOMAIN: Domain = Domain::Sim;

    type Request = SimRequest;
    type Response = SimResponse;
    type Indication = SimIndication;

    fn process(&self, request: SimRequest) -> Result<SimResponse, RadioError> {
        match request {
            SimRequest::GetIccCardStatus => {
                // The framework reading the card status is what makes the sim ready
                self.context
                    .readiness()
                    .count_down_once(Latch::SimReady, &self.participant);
                Ok(SimResponse::IccCardStatus(self.config.card_status()))
            }
            SimRequest::GetImsiForApp { .. } => match self.config.own_sim_card() {
                Some(card) if card.is_card_present() && !card.imsi().is_empty() => {
                    Ok(SimResponse::ImsiForApp(card.imsi().clone()))
                }
                _ => {
                    warn!(
                        "{}[{}]: No sim to read the IMSI from",
                        CLIENT,
                        self.config.instance_id()
                    );
                    Err(RadioError::InvalidSimState)
                }
            },
            _ => Err(RadioError::RequestNotSupported),
        }
    }

    fn drain_notifications(&self, indicate: &mut dyn FnMut(SimIndication)) {
        if let Ok(mut registrant) = self.card_status.try_lock() {
            drain(&mut registrant, |notification| match notification {
                Ok(status) => {
                    info!(
                        "{}[{}]: Card state is {:?}",
                        CLIENT,
                        self.config.instance_id(),
                        status.card_state
                    );
                    indicate(SimIndication::SimStatusChanged);
                }
                Err(failure) => warn!("{}: Ignoring {:?}", CLIENT, failure),
            });
        }
    }
}
