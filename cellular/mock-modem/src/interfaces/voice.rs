//! IRadioVoice
use core::convert::Infallible;

use heapless::{String, Vec};

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::{Domain, Opcode};

pub const NUMBER_LEN: usize = 24;
pub const MAX_CALLS: usize = 4;

pub type Number = String<NUMBER_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallState {
    Active,
    Holding,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Call {
    pub index: i32,
    pub state: CallState,
    pub number: Number,
    pub is_mt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoiceRequest {
    Dial { address: Number, clir: i32 },
    GetClir,
    GetCurrentCalls,
    Hangup { gsm_index: i32 },
}

impl RadioRequest for VoiceRequest {
    fn opcode(&self) -> Opcode {
        match self {
            VoiceRequest::Dial { .. } => Opcode::Dial,
            VoiceRequest::GetClir => Opcode::GetClir,
            VoiceRequest::GetCurrentCalls => Opcode::GetCurrentCalls,
            VoiceRequest::Hangup { .. } => Opcode::Hangup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoiceResponse {
    CurrentCalls(Vec<Call, MAX_CALLS>),
}

/// There are never any calls
pub struct VoiceHandler;

impl RadioInterfaceHandler for VoiceHandler {
    const DOMAIN: Domain = Domain::Voice;

    type Request = VoiceRequest;
    type Response = VoiceResponse;
    type Indication = Infallible;

    fn process(&self, request: VoiceRequest) -> Result<VoiceResponse, RadioError> {
        match request {
            VoiceRequest::GetCurrentCalls => Ok(VoiceResponse::CurrentCalls(Vec::new())),
            VoiceRequest::Dial { .. } | VoiceRequest::GetClir | VoiceRequest::Hangup { .. } => {
                Err(RadioError::RequestNotSupported)
            }
        }
    }
}
