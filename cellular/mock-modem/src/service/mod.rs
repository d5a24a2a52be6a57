//! The front door of the mock modem.
//!
//! [`ModemResources`] owns the stores and the shared context. It is created by
//! the caller, typically in a `static`, and borrowed by [`MockModemService`]
//! which composes the interfaces, sequences the bring-up and exposes the
//! control plane used by test code.
use core::future::poll_fn;
use core::pin::pin;
use core::task::Poll;

use embassy_time::{with_timeout, Duration, Timer};
use futures::future::{select, Either};
use heapless::Vec;

use crate::interfaces::{
    ConfigHandler, DataHandler, MessagingHandler, ModemHandler, ModemIndication, NetworkHandler,
    RadioError, RadioInterface, SimHandler, SimIndication, VoiceHandler,
};
use crate::sim_card::SIM_PROFILE_ID_DEFAULT;
use crate::types::RadioState;
use crate::{
    num_of_interfaces, Latch, MockModemConfig, ModemConfig, Opcode, Readiness, ServiceError,
    MAX_NUM_OF_LOGICAL_MODEM,
};

mod context;

pub use context::{ServiceContext, FORCED_ERROR_CAPACITY};

const TAG: &str = "MockModemService";

pub struct ModemResources {
    context: ServiceContext,
    configs: Vec<ModemConfig, MAX_NUM_OF_LOGICAL_MODEM>,
}

impl ModemResources {
    pub fn new<C: MockModemConfig>(config: &C) -> Self {
        let num_of_sim = config.num_sim_slots();
        let num_of_phone = config.num_logical_modems();

        let mut configs = Vec::new();
        for instance_id in 0..num_of_phone {
            if configs
                .push(ModemConfig::new(instance_id as u8, num_of_sim, num_of_phone))
                .is_err()
            {
                break;
            }
        }

        Self {
            context: ServiceContext::new(
                Readiness::new(num_of_interfaces(num_of_phone), num_of_phone),
                config.airplane_mode(),
            ),
            configs,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    pub fn modem_config(&self, instance_id: usize) -> Option<&ModemConfig> {
        self.configs.get(instance_id)
    }

    pub fn modem_configs(&self) -> &[ModemConfig] {
        &self.configs
    }
}

/// The interfaces of one logical modem
pub struct Phone<'a> {
    pub modem: RadioInterface<'a, ModemHandler<'a>>,
    pub sim: RadioInterface<'a, SimHandler<'a>>,
    pub network: RadioInterface<'a, NetworkHandler<'a>>,
    pub data: RadioInterface<'a, DataHandler>,
    pub messaging: RadioInterface<'a, MessagingHandler>,
    pub voice: RadioInterface<'a, VoiceHandler>,
}

impl<'a> Phone<'a> {
    fn new(config: &'a ModemConfig, context: &'a ServiceContext) -> Result<Self, ServiceError> {
        Ok(Self {
            modem: RadioInterface::new(ModemHandler::new(config, context)?, context),
            sim: RadioInterface::new(SimHandler::new(config, context)?, context),
            network: RadioInterface::new(NetworkHandler::new(config)?, context),
            data: RadioInterface::new(DataHandler, context),
            messaging: RadioInterface::new(MessagingHandler, context),
            voice: RadioInterface::new(VoiceHandler, context),
        })
    }

    fn pump_indications(&self) {
        self.modem.pump_indications();
        self.sim.pump_indications();
        self.network.pump_indications();
        self.data.pump_indications();
        self.messaging.pump_indications();
        self.voice.pump_indications();
    }

    fn unbind(&self) {
        self.modem.unbind();
        self.sim.unbind();
        self.network.unbind();
        self.data.unbind();
        self.messaging.unbind();
        self.voice.unbind();
    }
}

pub struct MockModemService<'a, C: MockModemConfig> {
    config: C,
    resources: &'a ModemResources,
    radio_config: RadioInterface<'a, ConfigHandler<'a>>,
    phones: Vec<Phone<'a>, MAX_NUM_OF_LOGICAL_MODEM>,
}

impl<'a, C: MockModemConfig> MockModemService<'a, C> {
    pub fn new(config: C, resources: &'a ModemResources) -> Result<Self, ServiceError> {
        let context = resources.context();
        let primary = resources
            .modem_config(0)
            .ok_or(ServiceError::InvalidSlot)?;

        let mut phones = Vec::new();
        for modem_config in resources.modem_configs() {
            if phones.push(Phone::new(modem_config, context)?).is_err() {
                break;
            }
        }

        info!(
            "{}: {} logical modems, {} sim slots",
            TAG,
            phones.len(),
            primary.num_of_sim()
        );

        Ok(Self {
            config,
            resources,
            radio_config: RadioInterface::new(ConfigHandler::new(primary)?, context),
            phones,
        })
    }

    pub fn radio_config(&self) -> &RadioInterface<'a, ConfigHandler<'a>> {
        &self.radio_config
    }

    pub fn phone(&self, instance_id: usize) -> Option<&Phone<'a>> {
        self.phones.get(instance_id)
    }

    pub fn phones(&self) -> &[Phone<'a>] {
        &self.phones
    }

    pub fn context(&self) -> &'a ServiceContext {
        self.resources.context()
    }

    fn primary(&self) -> Result<&'a ModemConfig, ServiceError> {
        self.resources
            .modem_config(0)
            .ok_or(ServiceError::InvalidSlot)
    }

    fn phone_or_err(&self, instance_id: usize) -> Result<&Phone<'a>, ServiceError> {
        self.phones.get(instance_id).ok_or(ServiceError::InvalidModem)
    }

    /// Apply every queued store event and forward the resulting notifications as indications
    pub fn process_pending(&self) {
        for modem_config in self.resources.modem_configs() {
            modem_config.process_events();
        }
        self.pump_indications();
    }

    fn pump_indications(&self) {
        self.radio_config.pump_indications();
        for phone in self.phones.iter() {
            phone.pump_indications();
        }
    }

    /// The service loop, drives every store
    pub async fn run(&self) -> ! {
        loop {
            self.process_pending();
            poll_fn(|cx| {
                let mut ready = false;
                for modem_config in self.resources.modem_configs() {
                    if modem_config.poll_events(cx).is_ready() {
                        ready = true;
                    }
                }
                if ready {
                    Poll::Ready(())
                } else {
                    Poll::Pending
                }
            })
            .await;
        }
    }

    /// Bring the modem up the way a real one would, see [`Latch`] for the stages
    pub async fn initialization(&self) -> Result<(), ServiceError> {
        info!("{}: Waiting for the framework to bind", TAG);
        self.await_latch(Latch::RadioInterfacesReady).await?;

        for phone in self.phones.iter() {
            phone.modem.indicate(ModemIndication::RilConnected);
        }

        let airplane_mode = self.context().airplane_mode();
        for modem_config in self.resources.modem_configs() {
            modem_config.set_radio_state(RadioState::Off.into(), TAG)?;
            if !airplane_mode {
                modem_config.set_radio_state(RadioState::On.into(), TAG)?;
            }
        }
        self.await_latch(Latch::RadioPowerReady).await?;

        for phone in self.phones.iter() {
            phone.sim.indicate(SimIndication::SimStatusChanged);
        }
        self.await_latch(Latch::SimReady).await?;

        // Listeners bound during bring-up start from a full snapshot
        for modem_config in self.resources.modem_configs() {
            modem_config.notify_all_registrant_notifications();
        }
        self.pump_indications();

        self.context()
            .readiness()
            .count_down(Latch::InitializationReady);
        info!("{}: Initialization is done", TAG);
        Ok(())
    }

    /// Run the service loop until the initialization finished
    pub async fn bring_up(&self) -> Result<(), ServiceError> {
        let initialization = pin!(self.initialization());
        let run = pin!(self.run());
        match select(initialization, run).await {
            Either::Left((result, _)) => result,
            Either::Right((never, _)) => never,
        }
    }

    async fn await_latch(&self, latch: Latch) -> Result<(), ServiceError> {
        let timeout = self.config.readiness_timeout(latch);
        self.wait_latch(latch, timeout).await
    }

    async fn wait_latch(&self, latch: Latch, timeout: Duration) -> Result<(), ServiceError> {
        with_timeout(timeout, self.context().readiness().wait(latch))
            .await
            .map_err(|_| {
                error!(
                    "{}: Timeout waiting for {:?}, {} remaining",
                    TAG,
                    latch,
                    self.context().readiness().count(latch)
                );
                ServiceError::ReadinessTimeout(latch)
            })
    }

    // Control plane

    /// Wait until the modem is fully initialized
    pub async fn connect(&self) -> Result<(), ServiceError> {
        self.wait_latch(Latch::InitializationReady, self.config.connect_timeout())
            .await?;
        info!("{}: Connected", TAG);
        Ok(())
    }

    /// Unbind every interface, responses to requests still in flight are dropped
    pub fn disconnect(&self) {
        self.radio_config.unbind();
        for phone in self.phones.iter() {
            phone.unbind();
        }
        info!("{}: Disconnected", TAG);
    }

    pub fn reset_state(&self) {
        info!("{}: Reset state", TAG);
        self.context().readiness().reset();
    }

    pub async fn insert_sim_card(&self, slot: usize, profile_id: u8) -> Result<(), ServiceError> {
        if profile_id == SIM_PROFILE_ID_DEFAULT {
            warn!("{}: Inserting the absent profile in slot {}", TAG, slot);
        }
        self.change_sim_card(slot, profile_id).await
    }

    pub async fn remove_sim_card(&self, slot: usize) -> Result<(), ServiceError> {
        self.change_sim_card(slot, SIM_PROFILE_ID_DEFAULT).await
    }

    async fn change_sim_card(&self, slot: usize, profile_id: u8) -> Result<(), ServiceError> {
        if slot >= self.primary()?.num_of_sim() {
            error!("{}: Invalid sim slot {}", TAG, slot);
            return Err(ServiceError::InvalidSlot);
        }
        info!("{}: Sim slot {} gets profile {}", TAG, slot, profile_id);
        for modem_config in self.resources.modem_configs() {
            modem_config.change_sim_profile(slot, profile_id, TAG)?;
        }
        Timer::after(self.config.sim_settle_delay()).await;
        Ok(())
    }

    pub fn is_sim_card_present(&self, slot: usize) -> Result<bool, ServiceError> {
        self.primary()?
            .sim_card(slot)
            .map(|card| card.is_card_present())
            .ok_or(ServiceError::InvalidSlot)
    }

    /// Answer every request for `opcode` with `error`, or go back to normal with `None`
    pub fn force_error_response(
        &self,
        opcode: Opcode,
        error: Option<RadioError>,
    ) -> Result<(), ServiceError> {
        self.context().force_error(opcode, error)
    }

    /// Tell the framework that the phonebook of `instance_id` changed
    pub fn sim_phonebook_changed(&self, instance_id: usize) -> Result<(), ServiceError> {
        self.phone_or_err(instance_id)?
            .sim
            .indicate(SimIndication::SimPhonebookChanged);
        Ok(())
    }

    pub fn subscription_status_changed(
        &self,
        instance_id: usize,
        activate: bool,
    ) -> Result<(), ServiceError> {
        self.phone_or_err(instance_id)?
            .sim
            .indicate(SimIndication::SubscriptionStatusChanged { activate });
        Ok(())
    }

    pub fn uicc_applications_enablement_changed(
        &self,
        instance_id: usize,
        enabled: bool,
    ) -> Result<(), ServiceError> {
        self.phone_or_err(instance_id)?
            .sim
            .indicate(SimIndication::UiccApplicationsEnablementChanged { enabled });
        Ok(())
    }

    /// Takes effect the next time the modem is initialized
    pub fn set_airplane_mode(&self, enabled: bool) {
        info!("{}: Airplane mode {}", TAG, enabled);
        self.context().set_airplane_mode(enabled);
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Duration;
    use static_cell::StaticCell;

    use super::*;
    use crate::interfaces::test_support::Framework;
    use crate::interfaces::{
        ConfigIndication, ModemRequest, ModemResponse, SimRequest, SimResponse,
    };
    use crate::sim_card::{SIM_PROFILE_ID_TWN_CHT, SIM_PROFILE_ID_TWN_FET};
    use crate::types::CardState;

    struct TestConfig {
        airplane_mode: bool,
    }

    impl MockModemConfig for TestConfig {
        fn airplane_mode(&self) -> bool {
            self.airplane_mode
        }

        fn readiness_timeout(&self, _latch: Latch) -> Duration {
            Duration::from_millis(200)
        }

        fn connect_timeout(&self) -> Duration {
            Duration::from_millis(200)
        }

        fn sim_settle_delay(&self) -> Duration {
            Duration::from_millis(0)
        }
    }

    struct DualSim;

    impl MockModemConfig for DualSim {
        const NUM_LOGICAL_MODEMS: usize = 2;

        fn sim_settle_delay(&self) -> Duration {
            Duration::from_millis(0)
        }
    }

    /// Framework side of every interface of a single modem phone
    struct Frameworks {
        config: Framework<ConfigHandler<'static>>,
        modem: Framework<ModemHandler<'static>>,
        sim: Framework<SimHandler<'static>>,
        network: Framework<NetworkHandler<'static>>,
        data: Framework<DataHandler>,
        messaging: Framework<MessagingHandler>,
        voice: Framework<VoiceHandler>,
    }

    impl Frameworks {
        fn new() -> Self {
            Self {
                config: Framework::new(),
                modem: Framework::new(),
                sim: Framework::new(),
                network: Framework::new(),
                data: Framework::new(),
                messaging: Framework::new(),
                voice: Framework::new(),
            }
        }

        fn bind<C: MockModemConfig>(&'static self, service: &MockModemService<'static, C>) {
            let phone = service.phone(0).unwrap();
            self.config.bind(service.radio_config());
            self.modem.bind(&phone.modem);
            self.sim.bind(&phone.sim);
            self.network.bind(&phone.network);
            self.data.bind(&phone.data);
            self.messaging.bind(&phone.messaging);
            self.voice.bind(&phone.voice);
        }

        /// Answer `SimStatusChanged` the way the telephony framework does
        async fn read_card_status_on_sim_change<C: MockModemConfig>(
            &self,
            service: &MockModemService<'static, C>,
        ) {
            loop {
                let indication = self.sim.indications.receive().await;
                if indication.payload == SimIndication::SimStatusChanged {
                    break;
                }
            }
            let sim = &service.phone(0).unwrap().sim;
            sim.request(1, SimRequest::GetIccCardStatus).await;
        }
    }

    fn setup(
        airplane_mode: bool,
    ) -> (
        &'static MockModemService<'static, TestConfig>,
        &'static Frameworks,
    ) {
        let config = TestConfig { airplane_mode };
        let resources: &'static ModemResources =
            Box::leak(Box::new(ModemResources::new(&config)));
        let service: &'static MockModemService<'static, TestConfig> =
            Box::leak(Box::new(MockModemService::new(config, resources).unwrap()));
        let frameworks: &'static Frameworks = Box::leak(Box::new(Frameworks::new()));
        (service, frameworks)
    }

    #[tokio::test]
    async fn brings_modem_up() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);

        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );

        assert_eq!(Ok(()), result);
        assert!(service
            .context()
            .readiness()
            .is_ready(Latch::InitializationReady));
        assert_eq!(
            Some(ModemIndication::RilConnected),
            frameworks.modem.indication()
        );
        assert_eq!(
            Some(ModemIndication::RadioStateChanged(RadioState::Off)),
            frameworks.modem.indication()
        );
        assert_eq!(
            Some(ModemIndication::RadioStateChanged(RadioState::On)),
            frameworks.modem.indication()
        );
        let response = frameworks.sim.response();
        assert_eq!(1, response.info.serial);
        let Some(SimResponse::IccCardStatus(status)) = response.payload else {
            panic!("Expected card status");
        };
        assert_eq!(CardState::Absent, status.card_state);

        assert_eq!(Ok(()), service.connect().await);
    }

    #[tokio::test]
    async fn airplane_mode_keeps_radio_off() {
        let (service, frameworks) = setup(true);
        frameworks.bind(service);

        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );

        assert_eq!(Ok(()), result);
        let primary = service.resources.modem_config(0).unwrap();
        assert_eq!(RadioState::Off, primary.radio_state());
    }

    #[tokio::test]
    async fn airplane_mode_survives_reset() {
        let (service, frameworks) = setup(true);
        frameworks.bind(service);
        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );
        assert_eq!(Ok(()), result);

        service.reset_state();
        while frameworks.sim.indication().is_some() {}
        frameworks.bind(service);
        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );

        assert_eq!(Ok(()), result);
        assert_eq!(1, service.context().readiness().generation());
        let primary = service.resources.modem_config(0).unwrap();
        assert_eq!(RadioState::Off, primary.radio_state());
        assert_eq!(Ok(()), service.connect().await);
    }

    #[tokio::test]
    async fn bring_up_ends_with_snapshot() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);

        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );
        assert_eq!(Ok(()), result);

        let Some(ConfigIndication::SimSlotsStatusChanged(slots)) = frameworks.config.indication()
        else {
            panic!("Expected slot status");
        };
        assert_eq!(2, slots.len());
        assert_eq!(None, frameworks.config.indication());
        assert_eq!(
            Some(SimIndication::SimStatusChanged),
            frameworks.sim.indication()
        );
    }

    #[tokio::test]
    async fn bring_up_times_out_without_framework() {
        let (service, _) = setup(false);

        assert_eq!(
            Err(ServiceError::ReadinessTimeout(Latch::RadioInterfacesReady)),
            service.bring_up().await
        );
        assert!(!service
            .context()
            .readiness()
            .is_ready(Latch::InitializationReady));
        assert_eq!(
            Err(ServiceError::ReadinessTimeout(Latch::InitializationReady)),
            service.connect().await
        );
    }

    #[tokio::test]
    async fn bring_up_times_out_without_card_status_read() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);

        assert_eq!(
            Err(ServiceError::ReadinessTimeout(Latch::SimReady)),
            service.bring_up().await
        );
        assert!(service.context().readiness().is_ready(Latch::RadioPowerReady));
    }

    #[tokio::test]
    async fn sim_insert_and_remove_round_trip() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);

        service
            .insert_sim_card(0, SIM_PROFILE_ID_TWN_CHT)
            .await
            .unwrap();
        service.process_pending();
        assert_eq!(Ok(true), service.is_sim_card_present(0));
        assert_eq!(
            Some(SimIndication::SimStatusChanged),
            frameworks.sim.indication()
        );

        service.remove_sim_card(0).await.unwrap();
        service.process_pending();
        assert_eq!(Ok(false), service.is_sim_card_present(0));
        assert_eq!(
            Some(SimIndication::SimStatusChanged),
            frameworks.sim.indication()
        );
        let primary = service.resources.modem_config(0).unwrap();
        assert!(primary.sim_card(0).unwrap().iccid().is_empty());

        assert_eq!(
            Err(ServiceError::InvalidSlot),
            service.insert_sim_card(5, SIM_PROFILE_ID_TWN_CHT).await
        );
        assert_eq!(
            Err(ServiceError::InvalidSlot),
            service.is_sim_card_present(5)
        );
    }

    #[tokio::test]
    async fn forced_error_is_scoped_and_disabled() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);
        let phone = service.phone(0).unwrap();

        service
            .force_error_response(Opcode::GetBasebandVersion, Some(RadioError::InvalidState))
            .unwrap();
        phone.modem.request(1, ModemRequest::GetBasebandVersion).await;
        phone.modem.request(2, ModemRequest::GetDeviceIdentity).await;
        service
            .force_error_response(Opcode::GetBasebandVersion, None)
            .unwrap();
        phone.modem.request(3, ModemRequest::GetBasebandVersion).await;

        let forced = frameworks.modem.response();
        assert_eq!(1, forced.info.serial);
        assert_eq!(RadioError::InvalidState, forced.info.error);
        assert_eq!(None, forced.payload);
        assert_eq!(RadioError::None, frameworks.modem.response().info.error);
        let restored = frameworks.modem.response();
        assert_eq!(3, restored.info.serial);
        assert_eq!(RadioError::None, restored.info.error);
        assert!(restored.payload.is_some());
    }

    #[tokio::test]
    async fn concurrent_requests_keep_their_serials() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);
        let phone = service.phone(0).unwrap();

        let baseband_client = async {
            for serial in 10..13 {
                phone.modem.request(serial, ModemRequest::GetBasebandVersion).await;
                tokio::task::yield_now().await;
            }
        };
        let identity_client = async {
            for serial in 20..23 {
                phone.modem.request(serial, ModemRequest::GetDeviceIdentity).await;
                tokio::task::yield_now().await;
            }
        };
        let sim_client = async {
            for serial in 30..33 {
                phone.sim.request(serial, SimRequest::GetIccCardStatus).await;
                tokio::task::yield_now().await;
            }
        };
        tokio::join!(baseband_client, identity_client, sim_client);

        let mut baseband_serials = std::vec::Vec::new();
        let mut identity_serials = std::vec::Vec::new();
        while let Ok(response) = frameworks.modem.responses.try_receive() {
            assert_eq!(RadioError::None, response.info.error);
            match response.payload {
                Some(ModemResponse::BasebandVersion(_)) => {
                    baseband_serials.push(response.info.serial)
                }
                Some(ModemResponse::DeviceIdentity(_)) => {
                    identity_serials.push(response.info.serial)
                }
                other => panic!("Unexpected response {:?}", other),
            }
        }
        assert_eq!(vec![10, 11, 12], baseband_serials);
        assert_eq!(vec![20, 21, 22], identity_serials);

        for serial in 30..33 {
            let response = frameworks.sim.response();
            assert_eq!(serial, response.info.serial);
            assert!(matches!(
                response.payload,
                Some(SimResponse::IccCardStatus(_))
            ));
        }
        assert!(frameworks.sim.responses.try_receive().is_err());
    }

    #[tokio::test]
    async fn sim_control_plane_indications() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);

        service.sim_phonebook_changed(0).unwrap();
        service.subscription_status_changed(0, true).unwrap();
        service.uicc_applications_enablement_changed(0, false).unwrap();

        assert_eq!(
            Some(SimIndication::SimPhonebookChanged),
            frameworks.sim.indication()
        );
        assert_eq!(
            Some(SimIndication::SubscriptionStatusChanged { activate: true }),
            frameworks.sim.indication()
        );
        assert_eq!(
            Some(SimIndication::UiccApplicationsEnablementChanged { enabled: false }),
            frameworks.sim.indication()
        );
        assert_eq!(
            Err(ServiceError::InvalidModem),
            service.sim_phonebook_changed(1)
        );
    }

    #[tokio::test]
    async fn disconnect_drops_responses() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);
        let phone = service.phone(0).unwrap();

        service.disconnect();
        phone.modem.request(1, ModemRequest::GetBasebandVersion).await;

        assert!(!phone.modem.is_bound());
        assert!(frameworks.modem.responses.try_receive().is_err());
    }

    #[tokio::test]
    async fn reset_state_requires_new_bring_up() {
        let (service, frameworks) = setup(false);
        frameworks.bind(service);
        let (result, _) = tokio::join!(
            service.bring_up(),
            frameworks.read_card_status_on_sim_change(service)
        );
        assert_eq!(Ok(()), result);

        service.reset_state();

        let readiness = service.context().readiness();
        assert_eq!(1, readiness.generation());
        assert!(!readiness.is_ready(Latch::InitializationReady));
        assert_eq!(
            num_of_interfaces(1),
            readiness.count(Latch::RadioInterfacesReady)
        );
        assert_eq!(
            Err(ServiceError::ReadinessTimeout(Latch::InitializationReady)),
            service.connect().await
        );
    }

    #[test]
    fn creates_store_per_logical_modem() {
        static RESOURCES: StaticCell<ModemResources> = StaticCell::new();
        let resources: &'static ModemResources = RESOURCES.init(ModemResources::new(&DualSim));

        let service = MockModemService::new(DualSim, resources).unwrap();

        assert_eq!(2, resources.modem_configs().len());
        assert_eq!(2, service.phones().len());
        assert!(resources.modem_config(0).unwrap().is_primary());
        assert_eq!(Some(1), resources.modem_config(1).unwrap().sim_physical_id());
        assert_eq!(
            num_of_interfaces(2),
            service
                .context()
                .readiness()
                .count(Latch::RadioInterfacesReady)
        );
    }

    #[tokio::test]
    async fn sim_change_reaches_every_store() {
        static RESOURCES: StaticCell<ModemResources> = StaticCell::new();
        let resources: &'static ModemResources = RESOURCES.init(ModemResources::new(&DualSim));
        let service = MockModemService::new(DualSim, resources).unwrap();

        service
            .insert_sim_card(1, SIM_PROFILE_ID_TWN_FET)
            .await
            .unwrap();
        service.process_pending();

        for modem_config in resources.modem_configs() {
            assert!(modem_config.sim_card(1).unwrap().is_card_present());
        }
        let secondary = resources.modem_config(1).unwrap();
        assert_eq!(CardState::Present, secondary.card_status().card_state);
        let primary = resources.modem_config(0).unwrap();
        assert_eq!(CardState::Absent, primary.card_status().card_state);
        assert_eq!(CardState::Present, primary.sim_slot_status()[1].card_state);
    }
}
