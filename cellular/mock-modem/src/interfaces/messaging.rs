//! IRadioMessaging
use core::convert::Infallible;

use heapless::String;

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::{Domain, Opcode};

pub const PDU_LEN: usize = 64;
pub const SMSC_LEN: usize = 24;

pub type Smsc = String<SMSC_LEN>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GsmSmsMessage {
    pub smsc_pdu: String<PDU_LEN>,
    pub pdu: String<PDU_LEN>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessagingRequest {
    AcknowledgeLastIncomingGsmSms { success: bool, cause: i32 },
    GetSmscAddress,
    SendSms(GsmSmsMessage),
    SetSmscAddress { smsc: Smsc },
}

impl RadioRequest for MessagingRequest {
    fn opcode(&self) -> Opcode {
        match self {
            MessagingRequest::AcknowledgeLastIncomingGsmSms { .. } => {
                Opcode::AcknowledgeLastIncomingGsmSms
            }
            MessagingRequest::GetSmscAddress => Opcode::GetSmscAddress,
            MessagingRequest::SendSms(_) => Opcode::SendSms,
            MessagingRequest::SetSmscAddress { .. } => Opcode::SetSmscAddress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessagingResponse {
    SendSms { message_ref: i32 },
    SmscAddress(Smsc),
}

/// SMS is not supported
pub struct MessagingHandler;

impl RadioInterfaceHandler for MessagingHandler {
    const DOMAIN: Domain = Domain::Messaging;

    type Request = MessagingRequest;
    type Response = MessagingResponse;
    type Indication = Infallible;

    fn process(&self, _request: MessagingRequest) -> Result<MessagingResponse, RadioError> {
        Err(RadioError::RequestNotSupported)
    }
}
