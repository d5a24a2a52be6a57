//! The radio HAL surfaces of the mock modem.
//!
//! Each surface is a [`RadioInterfaceHandler`] wrapped in a [`RadioInterface`].
//! The wrapper serializes requests, applies forced errors and delivers
//! responses and indications through the channels the framework bound.
use core::cell::Cell;

use embassy_sync::blocking_mutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;

use crate::service::ServiceContext;
use crate::{Domain, Latch, Opcode, Participant, RawMutex};

pub mod config;
pub mod data;
pub mod messaging;
pub mod modem;
pub mod network;
pub mod sim;
pub mod voice;

pub use config::{ConfigHandler, ConfigIndication, ConfigRequest, ConfigResponse};
pub use data::{DataHandler, DataRequest, DataResponse};
pub use messaging::{MessagingHandler, MessagingRequest, MessagingResponse};
pub use modem::{ModemHandler, ModemIndication, ModemRequest, ModemResponse};
pub use network::{NetworkHandler, NetworkIndication, NetworkRequest, NetworkResponse};
pub use sim::{SimHandler, SimIndication, SimRequest, SimResponse};
pub use voice::{VoiceHandler, VoiceRequest, VoiceResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum RadioError {
    None = 0,
    RadioNotAvailable = 1,
    GenericFailure = 2,
    RequestNotSupported = 6,
    SimAbsent = 11,
    NoMemory = 37,
    InternalErr = 38,
    InvalidState = 41,
    NoResources = 42,
    InvalidArguments = 44,
    InvalidSimState = 45,
    InvalidModemState = 46,
}

impl TryFrom<i32> for RadioError {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => RadioError::None,
            1 => RadioError::RadioNotAvailable,
            2 => RadioError::GenericFailure,
            6 => RadioError::RequestNotSupported,
            11 => RadioError::SimAbsent,
            37 => RadioError::NoMemory,
            38 => RadioError::InternalErr,
            41 => RadioError::InvalidState,
            42 => RadioError::NoResources,
            44 => RadioError::InvalidArguments,
            45 => RadioError::InvalidSimState,
            46 => RadioError::InvalidModemState,
            other => return Err(other),
        })
    }
}

impl From<RadioError> for i32 {
    fn from(value: RadioError) -> Self {
        value as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioResponseType {
    Solicited,
    SolicitedAck,
    SolicitedAckExp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioIndicationType {
    Unsolicited,
    UnsolicitedAckExp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioResponseInfo {
    pub kind: RadioResponseType,
    pub serial: i32,
    pub error: RadioError,
}

/// The answer to a single request.
/// The payload is present exactly when the request succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioResponse<P> {
    pub info: RadioResponseInfo,
    pub opcode: Opcode,
    pub payload: Option<P>,
}

impl<P> RadioResponse<P> {
    pub fn new(serial: i32, opcode: Opcode, result: Result<P, RadioError>) -> Self {
        let (error, payload) = match result {
            Ok(payload) => (RadioError::None, Some(payload)),
            Err(error) => (error, None),
        };
        Self {
            info: RadioResponseInfo {
                kind: RadioResponseType::Solicited,
                serial,
                error,
            },
            opcode,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioIndication<P> {
    pub kind: RadioIndicationType,
    pub payload: P,
}

impl<P> RadioIndication<P> {
    pub fn unsolicited(payload: P) -> Self {
        Self {
            kind: RadioIndicationType::Unsolicited,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    Full,
}

/// Sink bound by the framework for responses or indications
pub trait RadioChannel<T>: Sync {
    fn deliver(&self, message: T) -> Result<(), ChannelError>;
}

impl<T: Send, const N: usize> RadioChannel<T> for Channel<RawMutex, T, N> {
    fn deliver(&self, message: T) -> Result<(), ChannelError> {
        self.try_send(message).map_err(|_| ChannelError::Full)
    }
}

pub trait RadioRequest {
    fn opcode(&self) -> Opcode;
}

/// The behavior of one radio HAL surface
pub trait RadioInterfaceHandler {
    const DOMAIN: Domain;

    type Request: RadioRequest;
    type Response;
    type Indication;

    /// Compute the result of `request`, never panics
    fn process(&self, request: Self::Request) -> Result<Self::Response, RadioError>;

    /// Turn pending store notifications into indications
    fn drain_notifications(&self, _indicate: &mut dyn FnMut(Self::Indication)) {}
}

/// The channels the framework bound to an interface
pub struct Binding<'a, H: RadioInterfaceHandler> {
    pub response: &'a dyn RadioChannel<RadioResponse<H::Response>>,
    pub indication: &'a dyn RadioChannel<RadioIndication<H::Indication>>,
}

impl<'a, H: RadioInterfaceHandler> Clone for Binding<'a, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, H: RadioInterfaceHandler> Copy for Binding<'a, H> {}

pub struct RadioInterface<'a, H: RadioInterfaceHandler> {
    handler: H,
    context: &'a ServiceContext,
    binding: blocking_mutex::Mutex<RawMutex, Cell<Option<Binding<'a, H>>>>,
    session: Mutex<RawMutex, ()>,
    participant: Participant,
}

impl<'a, H: RadioInterfaceHandler> RadioInterface<'a, H> {
    pub fn new(handler: H, context: &'a ServiceContext) -> Self {
        Self {
            handler,
            context,
            binding: blocking_mutex::Mutex::new(Cell::new(None)),
            session: Mutex::new(()),
            participant: Participant::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Bind the framework channels and count the interface as ready.
    /// Binding again within the same readiness generation only replaces the channels.
    pub fn set_response_functions(
        &self,
        response: &'a dyn RadioChannel<RadioResponse<H::Response>>,
        indication: &'a dyn RadioChannel<RadioIndication<H::Indication>>,
    ) {
        debug!("{}: setResponseFunctions", H::DOMAIN.tag());
        self.binding.lock(|binding| {
            binding.set(Some(Binding {
                response,
                indication,
            }))
        });
        self.context
            .readiness()
            .count_down_once(Latch::RadioInterfacesReady, &self.participant);
    }

    pub fn unbind(&self) {
        self.binding.lock(|binding| binding.set(None));
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    fn binding(&self) -> Option<Binding<'a, H>> {
        self.binding.lock(|binding| binding.get())
    }

    pub fn response_acknowledgement(&self) {
        debug!("{}: responseAcknowledgement", H::DOMAIN.tag());
    }

    /// Answer `request` with exactly one response carrying `serial`
    pub async fn request(&self, serial: i32, request: H::Request) {
        let _session = self.session.lock().await;
        let opcode = request.opcode();
        debug!("{}: {:?} serial {}", H::DOMAIN.tag(), opcode, serial);

        let result = match self.context.forced_error(opcode) {
            Some(error) => {
                debug!(
                    "{}: {:?} answered with forced {:?}",
                    H::DOMAIN.tag(),
                    opcode,
                    error
                );
                Err(error)
            }
            None => self.handler.process(request),
        };

        self.respond(self.binding(), RadioResponse::new(serial, opcode, result));
    }

    fn respond(&self, binding: Option<Binding<'a, H>>, response: RadioResponse<H::Response>) {
        let Some(binding) = binding else {
            error!(
                "{}: Failed to respond to {:?}, no response channel",
                H::DOMAIN.tag(),
                response.opcode
            );
            return;
        };
        let opcode = response.opcode;
        if binding.response.deliver(response).is_err() {
            error!(
                "{}: Failed to respond to {:?}, response channel is full",
                H::DOMAIN.tag(),
                opcode
            );
        }
    }

    pub fn indicate(&self, indication: H::Indication) {
        let Some(binding) = self.binding() else {
            error!(
                "{}: Failed to indicate, no indication channel",
                H::DOMAIN.tag()
            );
            return;
        };
        if binding
            .indication
            .deliver(RadioIndication::unsolicited(indication))
            .is_err()
        {
            error!(
                "{}: Failed to indicate, indication channel is full",
                H::DOMAIN.tag()
            );
        }
    }

    /// Forward the store notifications observed by the handler as indications
    pub fn pump_indications(&self) {
        self.handler
            .drain_notifications(&mut |indication| self.indicate(indication));
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    struct Echo;

    #[derive(Debug)]
    enum EchoRequest {
        Ping(u8),
        Unsupported,
    }

    impl RadioRequest for EchoRequest {
        fn opcode(&self) -> Opcode {
            match self {
                EchoRequest::Ping(_) => Opcode::GetBasebandVersion,
                EchoRequest::Unsupported => Opcode::NvReadItem,
            }
        }
    }

    impl RadioInterfaceHandler for Echo {
        const DOMAIN: Domain = Domain::Modem;

        type Request = EchoRequest;
        type Response = u8;
        type Indication = u8;

        fn process(&self, request: Self::Request) -> Result<Self::Response, RadioError> {
            match request {
                EchoRequest::Ping(value) => Ok(value),
                EchoRequest::Unsupported => Err(RadioError::RequestNotSupported),
            }
        }
    }

    #[test]
    fn can_convert_radio_error() {
        assert_eq!(Ok(RadioError::InvalidArguments), RadioError::try_from(44));
        assert_eq!(Err(3), RadioError::try_from(3));
        assert_eq!(6, i32::from(RadioError::RequestNotSupported));
    }

    #[tokio::test]
    async fn responses_carry_request_serial() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);
        framework.bind(&interface);

        interface.request(7, EchoRequest::Ping(1)).await;
        interface.request(3, EchoRequest::Unsupported).await;
        interface.request(7, EchoRequest::Ping(2)).await;

        let first = framework.response();
        assert_eq!(7, first.info.serial);
        assert_eq!(RadioError::None, first.info.error);
        assert_eq!(RadioResponseType::Solicited, first.info.kind);
        assert_eq!(Some(1), first.payload);

        let second = framework.response();
        assert_eq!(3, second.info.serial);
        assert_eq!(RadioError::RequestNotSupported, second.info.error);
        assert_eq!(Opcode::NvReadItem, second.opcode);
        assert_eq!(None, second.payload);

        assert_eq!(Some(2), framework.response().payload);
        assert!(framework.responses.try_receive().is_err());
    }

    #[tokio::test]
    async fn forced_error_replaces_result() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);
        framework.bind(&interface);

        context
            .force_error(Opcode::GetBasebandVersion, Some(RadioError::InternalErr))
            .unwrap();
        interface.request(1, EchoRequest::Ping(1)).await;
        interface.request(2, EchoRequest::Unsupported).await;
        context.force_error(Opcode::GetBasebandVersion, None).unwrap();
        interface.request(3, EchoRequest::Ping(3)).await;

        let forced = framework.response();
        assert_eq!(RadioError::InternalErr, forced.info.error);
        assert_eq!(None, forced.payload);
        assert_eq!(
            RadioError::RequestNotSupported,
            framework.response().info.error
        );
        let restored = framework.response();
        assert_eq!(RadioError::None, restored.info.error);
        assert_eq!(Some(3), restored.payload);
    }

    #[tokio::test]
    async fn drops_response_without_binding() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);

        interface.request(1, EchoRequest::Ping(1)).await;
        interface.indicate(1);

        framework.bind(&interface);
        interface.unbind();
        interface.request(2, EchoRequest::Ping(2)).await;

        assert!(!interface.is_bound());
        assert!(framework.responses.try_receive().is_err());
        assert_eq!(None, framework.indication());
    }

    #[test]
    fn binding_counts_interface_ready() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);
        let before = context.readiness().count(Latch::RadioInterfacesReady);

        framework.bind(&interface);
        interface.indicate(5);

        assert_eq!(
            before - 1,
            context.readiness().count(Latch::RadioInterfacesReady)
        );
        let indication = framework.indications.try_receive().ok().unwrap();
        assert_eq!(RadioIndicationType::Unsolicited, indication.kind);
        assert_eq!(5, indication.payload);
    }

    #[test]
    fn rebinding_counts_interface_once() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);
        let before = context.readiness().count(Latch::RadioInterfacesReady);

        framework.bind(&interface);
        framework.bind(&interface);
        assert_eq!(
            before - 1,
            context.readiness().count(Latch::RadioInterfacesReady)
        );

        context.readiness().reset();
        framework.bind(&interface);
        assert_eq!(
            before - 1,
            context.readiness().count(Latch::RadioInterfacesReady)
        );
    }

    #[test]
    fn full_channel_drops_indication() {
        let context = context();
        let framework = Framework::<Echo>::new();
        let interface = RadioInterface::new(Echo, &context);
        framework.bind(&interface);

        for value in 0..CHANNEL_CAPACITY as u8 + 1 {
            interface.indicate(value);
        }

        for value in 0..CHANNEL_CAPACITY as u8 {
            assert_eq!(Some(value), framework.indication());
        }
        assert_eq!(None, framework.indication());
    }
}
