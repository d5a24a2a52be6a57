//! IRadioData
use core::convert::Infallible;

use heapless::{String, Vec};

use super::{RadioError, RadioInterfaceHandler, RadioRequest};
use crate::{Domain, Opcode};

pub const APN_LEN: usize = 32;
pub const MAX_DATA_CALLS: usize = 4;

pub type Apn = String<APN_LEN>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataProfile {
    pub profile_id: i32,
    pub apn: Apn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataCall {
    pub cid: i32,
    pub active: bool,
    pub ifname: String<16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRequest {
    DeactivateDataCall { cid: i32, reason: i32 },
    GetDataCallList,
    SetDataAllowed { allow: bool },
    SetInitialAttachApn(DataProfile),
    SetupDataCall { access_network: i32, profile: DataProfile, roaming_allowed: bool },
}

impl RadioRequest for DataRequest {
    fn opcode(&self) -> Opcode {
        match self {
            DataRequest::DeactivateDataCall { .. } => Opcode::DeactivateDataCall,
            DataRequest::GetDataCallList => Opcode::GetDataCallList,
            DataRequest::SetDataAllowed { .. } => Opcode::SetDataAllowed,
            DataRequest::SetInitialAttachApn(_) => Opcode::SetInitialAttachApn,
            DataRequest::SetupDataCall { .. } => Opcode::SetupDataCall,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataResponse {
    DataCallList(Vec<DataCall, MAX_DATA_CALLS>),
}

/// The mock modem never sets up data calls
pub struct DataHandler;

impl RadioInterfaceHandler for DataHandler {
    const DOMAIN: Domain = Domain::Data;

    type Request = DataRequest;
    type Response = DataResponse;
    type Indication = Infallible;

    fn process(&self, request: DataRequest) -> Result<DataResponse, RadioError> {
        match request {
            DataRequest::GetDataCallList => Ok(DataResponse::DataCallList(Vec::new())),
            _ => Err(RadioError::RequestNotSupported),
        }
    }
}
