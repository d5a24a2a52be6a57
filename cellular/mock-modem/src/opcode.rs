/// The radio HAL surface a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Domain {
    Config,
    Modem,
    Sim,
    Network,
    Data,
    Messaging,
    Voice,
}

impl Domain {
    pub const fn tag(self) -> &'static str {
        match self {
            Domain::Config => "MRCFG",
            Domain::Modem => "MRMDM",
            Domain::Sim => "MRSIM",
            Domain::Network => "MRNW",
            Domain::Data => "MRDATA",
            Domain::Messaging => "MRMSG",
            Domain::Voice => "MRVOICE",
        }
    }
}

/// Every request understood by the mock modem, across all domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    // Config
    GetHalDeviceCapabilities,
    GetNumOfLiveModems,
    GetPhoneCapability,
    GetSimSlotsStatus,
    SetNumOfLiveModems,
    SetPreferredDataModem,
    SetSimSlotsMapping,

    // Modem
    EnableModem,
    GetBasebandVersion,
    GetDeviceIdentity,
    GetHardwareConfig,
    GetModemActivityInfo,
    GetModemStackStatus,
    GetRadioCapability,
    NvReadItem,
    NvResetConfig,
    NvWriteCdmaPrl,
    NvWriteItem,
    RequestShutdown,
    SendDeviceState,
    SetRadioCapability,
    SetRadioPower,

    // Sim
    AreUiccApplicationsEnabled,
    ChangeIccPin2ForApp,
    ChangeIccPinForApp,
    EnableUiccApplications,
    GetFacilityLockForApp,
    GetIccCardStatus,
    GetImsiForApp,
    GetSimPhonebookCapacity,
    GetSimPhonebookRecords,
    IccCloseLogicalChannel,
    IccOpenLogicalChannel,
    IccTransmitApduBasicChannel,
    IccTransmitApduLogicalChannel,
    ReportStkServiceIsRunning,
    SetFacilityLockForApp,
    SetSimCardPower,
    SupplyIccPin2ForApp,
    SupplyIccPinForApp,
    SupplyIccPuk2ForApp,
    SupplyIccPukForApp,
    UpdateSimPhonebookRecords,

    // Network
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
    SetNetworkSelectionModeManual,
    SetNrDualConnectivityState,
    SetUsageSetting,

    // Data
    DeactivateDataCall,
    GetDataCallList,
    SetDataAllowed,
    SetInitialAttachApn,
    SetupDataCall,

    // Messaging
    AcknowledgeLastIncomingGsmSms,
    GetSmscAddress,
    SendSms,
    SetSmscAddress,

    // Voice
    Dial,
    GetClir,
    GetCurrentCalls,
    Hangup,
}

impl Opcode {
    pub const fn domain(self) -> Domain {
        use Opcode::*;
        match self {
            GetHalDeviceCapabilities | GetNumOfLiveModems | GetPhoneCapability
            | GetSimSlotsStatus | SetNumOfLiveModems | SetPreferredDataModem
            | SetSimSlotsMapping => Domain::Config,

            EnableModem | GetBasebandVersion | GetDeviceIdentity | GetHardwareConfig
            | GetModemActivityInfo | GetModemStackStatus | GetRadioCapability | NvReadItem
            | NvResetConfig | NvWriteCdmaPrl | NvWriteItem | RequestShutdown
            | SendDeviceState | SetRadioCapability | SetRadioPower => Domain::Modem,

            AreUiccApplicationsEnabled | ChangeIccPin2ForApp | ChangeIccPinForApp
            | EnableUiccApplications | GetFacilityLockForApp | GetIccCardStatus
            | GetImsiForApp | GetSimPhonebookCapacity | GetSimPhonebookRecords
            | IccCloseLogicalChannel | IccOpenLogicalChannel | IccTransmitApduBasicChannel
            | IccTransmitApduLogicalChannel | ReportStkServiceIsRunning
            | SetFacilityLockForApp | SetSimCardPower | SupplyIccPin2ForApp
            | SupplyIccPinForApp | SupplyIccPuk2ForApp | SupplyIccPukForApp
            | UpdateSimPhonebookRecords => Domain::Sim,

            GetAvailableBandModes | GetAvailableNetworks | GetCellInfoList
            | GetDataRegistrationState | GetImsRegistrationState | GetNetworkSelectionMode
            | GetOperator | GetSignalStrength | GetSystemSelectionChannels | GetUsageSetting
            | GetVoiceRadioTechnology | GetVoiceRegistrationState
            | IsNrDualConnectivityEnabled | SetNetworkSelectionModeAutomatic
            | SetNetworkSelectionModeManual | SetNrDualConnectivityState
            | SetUsageSetting => Domain::Network,

            DeactivateDataCall | GetDataCallList | SetDataAllowed | SetInitialAttachApn
            | SetupDataCall => Domain::Data,

            AcknowledgeLastIncomingGsmSms | GetSmscAddress | SendSms | SetSmscAddress => {
                Domain::Messaging
            }

            Dial | GetClir | GetCurrentCalls | Hangup => Domain::Voice,
        }
    }
}
