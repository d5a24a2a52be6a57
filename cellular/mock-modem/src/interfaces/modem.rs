//! IRadioModem
use embassy_sync::mutex::Mutex;
use heapless::{String, Vec};

use super::config::store_error;
use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::modem_config::notifier::drain;
use crate::modem_config::Registrant;
use crate::service::ServiceContext;
use crate::types::{BasebandVersion, DeviceIdentity, RadioState};
use crate::{ConfigError, Domain, Latch, ModemConfig, Opcode, Participant, RawMutex};

const CLIENT: &str = "MRMDM";

pub const NV_VALUE_LEN: usize = 32;
pub const MAX_PRL_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemRequest {
    EnableModem {
        on: bool,
    },
    GetBasebandVersion,
    GetDeviceIdentity,
    GetHardwareConfig,
    GetModemActivityInfo,
    GetModemStackStatus,
    GetRadioCapability,
    NvReadItem {
        item_id: i32,
    },
    NvResetConfig {
        reset_type: i32,
    },
    NvWriteCdmaPrl {
        prl: Vec<u8, MAX_PRL_LEN>,
    },
    NvWriteItem {
        item_id: i32,
        value: String<NV_VALUE_LEN>,
    },
    RequestShutdown,
    SendDeviceState {
        device_state_type: i32,
        state: bool,
    },
    SetRadioCapability,
    SetRadioPower {
        power_on: bool,
        for_emergency_call: bool,
        preferred_for_emergency_call: bool,
    },
}

impl RadioRequest for ModemRequest {
    fn opcode(&self) -> Opcode {
        match self {
            ModemRequest::EnableModem { .. } => Opcode::EnableModem,
            ModemRequest::GetBasebandVersion => Opcode::GetBasebandVersion,
            ModemRequest::GetDeviceIdentity => Opcode::GetDeviceIdentity,
            ModemRequest::GetHardwareConfig => Opcode::GetHardwareConfig,
            ModemRequest::GetModemActivityInfo => Opcode::GetModemActivityInfo,
            ModemRequest::GetModemStackStatus => Opcode::GetModemStackStatus,
            ModemRequest::GetRadioCapability => Opcode::GetRadioCapability,
            ModemRequest::NvReadItem { .. } => Opcode::NvReadItem,
            ModemRequest::NvResetConfig { .. } => Opcode::NvResetConfig,
            ModemRequest::NvWriteCdmaPrl { .. } => Opcode::NvWriteCdmaPrl,
            ModemRequest::NvWriteItem { .. } => Opcode::NvWriteItem,
            ModemRequest::RequestShutdown => Opcode::RequestShutdown,
            ModemRequest::SendDeviceState { .. } => Opcode::SendDeviceState,
            ModemRequest::SetRadioCapability => Opcode::SetRadioCapability,
            ModemRequest::SetRadioPower { .. } => Opcode::SetRadioPower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemResponse {
    BasebandVersion(BasebandVersion),
    DeviceIdentity(DeviceIdentity),
    RequestShutdown,
    SendDeviceState,
    SetRadioPower,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemIndication {
    RilConnected,
    RadioStateChanged(RadioState),
}

pub struct ModemHandler<'a> {
    config: &'a ModemConfig,
    context: &'a ServiceContext,
    radio_state: Mutex<RawMutex, Registrant<'a, RadioState>>,
    participant: Participant,
}

impl<'a> ModemHandler<'a> {
    pub fn new(config: &'a ModemConfig, context: &'a ServiceContext) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            context,
            radio_state: Mutex::new(config.register_for_radio_state_changed()?),
            participant: Participant::new(),
        })
    }

    fn set_radio_state(&self, state: RadioState) -> Result<(), RadioError> {
        self.config
            .set_radio_state(state.into(), CLIENT)
            .map_err(store_error)
    }

    fn radio_power_ready(&self) {
        let readiness = self.context.readiness();
        if readiness.count_down_once(Latch::RadioPowerReady, &self.participant) {
            debug!(
                "{}[{}]: Radio power is ready",
                CLIENT,
                self.config.instance_id()
            );
        }
    }
}

impl RadioInterfaceHandler for ModemHandler<'_> {
    const DOMAIN: Domain = Domain::Modem;

    type Request = ModemRequest;
    type Response = ModemResponse;
    type Indication = ModemIndication;

    fn process(&self, request: ModemRequest) -> Result<ModemResponse, RadioError> {
        match request {
            ModemRequest::GetBasebandVersion => Ok(ModemResponse::BasebandVersion(
                self.config.baseband_version(),
            )),
            ModemRequest::GetDeviceIdentity => Ok(ModemResponse::DeviceIdentity(
                self.config.device_identity(),
            )),
            ModemRequest::RequestShutdown => {
                self.set_radio_state(RadioState::Off)?;
                Ok(ModemResponse::RequestShutdown)
            }
            ModemRequest::SendDeviceState {
                device_state_type,
                state,
            } => {
                debug!(
                    "{}: Device state {} is {}",
                    CLIENT, device_state_type, state
                );
                Ok(ModemResponse::SendDeviceState)
            }
            ModemRequest::SetRadioPower { power_on, .. } => {
                let state = if power_on {
                    RadioState::On
                } else {
                    RadioState::Off
                };
                self.set_radio_state(state)?;
                Ok(ModemResponse::SetRadioPower)
            }
            ModemRequest::EnableModem { .. }
            | ModemRequest::GetHardwareConfig
            | ModemRequest::GetModemActivityInfo
            | ModemRequest::GetModemStackStatus
            | ModemRequest::GetRadioCapability
            | ModemRequest::NvReadItem { .. }
            | ModemRequest::NvResetConfig { .. }
            | ModemRequest::NvWriteCdmaPrl { .. }
            | ModemRequest::NvWriteItem { .. }
            | ModemRequest::SetRadioCapability => Err(RadioError::RequestNotSupported),
        }
    }

    fn drain_notifications(&self, indicate: &mut dyn FnMut(ModemIndication)) {
        if let Ok(mut registrant) = self.radio_state.try_lock() {
            drain(&mut registrant, |notification| match notification {
                Ok(state) => {
                    info!(
                        "{}[{}]: Radio state is {:?}",
                        CLIENT,
                        self.config.instance_id(),
                        state
                    );
                    indicate(ModemIndication::RadioStateChanged(state));
                    if state == self.context.target_radio_state() {
                        self.radio_power_ready();
                    }
                }
                Err(failure) => warn!("{}: Ignoring {:?}", CLIENT, failure),
            });
        }

        // A request for the state the radio is already in publishes nothing,
        // so once every interface is bound the snapshot decides as well.
        let readiness = self.context.readiness();
        if readiness.is_ready(Latch::RadioInterfacesReady)
            && self.config.radio_state() == self.context.target_radio_state()
        {
            self.radio_power_ready();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::test_support::{context, Framework};
    use crate::interfaces::RadioInterface;
    use crate::modem_config::DEFAULT_BASEBAND_VERSION;

    #[tokio::test]
    async fn reports_identity() {
        let context = context();
        let store = ModemConfig::new(0, 1, 1);
        let framework = Framework::<ModemHandler>::new();
        let interface =
            RadioInterface::new(ModemHandler::new(&store, &context).unwrap(), &context);
        framework.bind(&interface);

        interface.request(1, ModemRequest::GetBasebandVersion).await;
        interface.request(2, ModemRequest::GetDeviceIdentity).await;

        let Some(ModemResponse::BasebandVersion(version)) = framework.response().payload else {
            panic!("Expected baseband version");
        };
        assert_eq!(DEFAULT_BASEBAND_VERSION, version.as_str());
        let Some(ModemResponse::DeviceIdentity(identity)) = framework.response().payload else {
            panic!("Expected device identity");
        };
        assert_eq!(DeviceIdentity::default(), identity);
    }

    #[tokio::test]
    async fn radio_power_reaches_store() {
        let context = context();
        let store = ModemConfig::new(0, 1, 1);
        let framework = Framework::<ModemHandler>::new();
        let interface =
            RadioInterface::new(ModemHandler::new(&store, &context).unwrap(), &context);
        framework.bind(&interface);

        interface
            .request(
                4,
                ModemRequest::SetRadioPower {
                    power_on: true,
                    for_emergency_call: false,
                    preferred_for_emergency_call: false,
                },
            )
            .await;
        store.process_events();
        interface.pump_indications();

        assert_eq!(Some(ModemResponse::SetRadioPower), framework.response().payload);
        assert_eq!(RadioState::On, store.radio_state());
        assert_eq!(
            Some(ModemIndication::RadioStateChanged(RadioState::On)),
            framework.indication()
        );
        assert!(context.readiness().is_ready(Latch::RadioPowerReady));

        interface.request(5, ModemRequest::RequestShutdown).await;
        store.process_events();
        interface.pump_indications();
        assert_eq!(RadioState::Off, store.radio_state());
        assert_eq!(
            Some(ModemIndication::RadioStateChanged(RadioState::Off)),
            framework.indication()
        );
    }

    #[tokio::test]
    async fn radio_already_off_is_ready_after_reset() {
        let context = ServiceContext::new(crate::Readiness::new(1, 1), true);
        let store = ModemConfig::new(0, 1, 1);
        let framework = Framework::<ModemHandler>::new();
        let interface =
            RadioInterface::new(ModemHandler::new(&store, &context).unwrap(), &context);
        framework.bind(&interface);

        store.set_radio_state(RadioState::Off.into(), "test").unwrap();
        store.process_events();
        interface.pump_indications();
        assert!(context.readiness().is_ready(Latch::RadioPowerReady));

        context.readiness().reset();
        interface.pump_indications();
        assert!(!context.readiness().is_ready(Latch::RadioPowerReady));

        framework.bind(&interface);
        store.set_radio_state(RadioState::Off.into(), "test").unwrap();
        store.process_events();
        interface.pump_indications();

        assert!(context.readiness().is_ready(Latch::RadioPowerReady));
        assert_eq!(
            Some(ModemIndication::RadioStateChanged(RadioState::Off)),
            framework.indication()
        );
        assert_eq!(None, framework.indication());
    }

    #[tokio::test]
    async fn ignores_failure_markers() {
        let context = context();
        let store = ModemConfig::new(0, 1, 1);
        let framework = Framework::<ModemHandler>::new();
        let interface =
            RadioInterface::new(ModemHandler::new(&store, &context).unwrap(), &context);
        framework.bind(&interface);

        store.set_radio_state(99, "test").unwrap();
        store.process_events();
        interface.pump_indications();

        assert_eq!(None, framework.indication());
        assert!(!context.readiness().is_ready(Latch::RadioPowerReady));
    }

    #[tokio::test]
    async fn nv_items_are_not_supported() {
        let context = context();
        let store = ModemConfig::new(0, 1, 1);
        let framework = Framework::<ModemHandler>::new();
        let interface =
            RadioInterface::new(ModemHandler::new(&store, &context).unwrap(), &context);
        framework.bind(&interface);

        interface
            .request(9, ModemRequest::NvReadItem { item_id: 1 })
            .await;

        let response = framework.response();
        assert_eq!(9, response.info.serial);
        assert_eq!(RadioError::RequestNotSupported, response.info.error);
        assert_eq!(None, response.payload);
    }
}
