/// Message-service errors reported through `+CMS ERROR:`, as defined in
/// 3GPP TS 27.005 section 3.2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum CmsError {
    MeFailure = 300,
    SmsServiceReserved = 301,
    NotAllowed = 302,
    NotSupported = 303,
    InvalidPduParameter = 304,
    InvalidTextParameter = 305,
    SimNotInserted = 310,
    SimPin = 311,
    PhSimPin = 312,
    SimFailure = 313,
    SimBusy = 314,
    SimWrong = 315,
    SimPuk = 316,
    SimPin2 = 317,
    SimPuk2 = 318,
    MemoryFailure = 320,
    InvalidMemoryIndex = 321,
    MemoryFull = 322,
    SmscAddressUnknown = 330,
    NoNetwork = 331,
    NetworkTimeout = 332,
    NoCnmaAckExpected = 340,
    Unknown = 500,
}

impl From<u16> for CmsError {
    fn from(value: u16) -> Self {
        match value {
            300 => Self::MeFailure,
            301 => Self::SmsServiceReserved,
            302 => Self::NotAllowed,
            303 => Self::NotSupported,
            304 => Self::InvalidPduParameter,
            305 => Self::InvalidTextParameter,
            310 => Self::SimNotInserted,
            311 => Self::SimPin,
            312 => Self::PhSimPin,
            313 => Self::SimFailure,
            314 => Self::SimBusy,
            315 => Self::SimWrong,
            316 => Self::SimPuk,
            317 => Self::SimPin2,
            318 => Self::SimPuk2,
            320 => Self::MemoryFailure,
            321 => Self::InvalidMemoryIndex,
            322 => Self::MemoryFull,
            330 => Self::SmscAddressUnknown,
            331 => Self::NoNetwork,
            332 => Self::NetworkTimeout,
            340 => Self::NoCnmaAckExpected,
            _ => Self::Unknown,
        }
    }
}

impl CmsError {
    /// Parses the verbose form some modems report instead of the numeric
    /// code.
    pub fn from_verbose(text: &[u8]) -> Option<Self> {
        Some(match text {
            b"ME failure" => Self::MeFailure,
            b"SMS service of ME reserved" => Self::SmsServiceReserved,
            b"operation not allowed" => Self::NotAllowed,
            b"operation not supported" => Self::NotSupported,
            b"invalid PDU mode parameter" => Self::InvalidPduParameter,
            b"invalid text mode parameter" => Self::InvalidTextParameter,
            b"(U)SIM not inserted" => Self::SimNotInserted,
            b"(U)SIM PIN required" => Self::SimPin,
            b"PH-(U)SIM PIN required" => Self::PhSimPin,
            b"(U)SIM failure" => Self::SimFailure,
            b"(U)SIM busy" => Self::SimBusy,
            b"(U)SIM wrong" => Self::SimWrong,
            b"(U)SIM PUK required" => Self::SimPuk,
            b"(U)SIM PIN2 required" => Self::SimPin2,
            b"(U)SIM PUK2 required" => Self::SimPuk2,
            b"memory failure" => Self::MemoryFailure,
            b"invalid memory index" => Self::InvalidMemoryIndex,
            b"memory full" => Self::MemoryFull,
            b"SMSC address unknown" => Self::SmscAddressUnknown,
            b"no network service" => Self::NoNetwork,
            b"network timeout" => Self::NetworkTimeout,
            b"no +CNMA acknowledgement expected" => Self::NoCnmaAckExpected,
            b"unknown error" => Self::Unknown,
            _ => return None,
        })
    }
}
