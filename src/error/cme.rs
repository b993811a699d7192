/// Mobile-equipment errors reported through `+CME ERROR:`, as defined in
/// 3GPP TS 27.007 section 9.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum CmeError {
    PhoneFailure = 0,
    NoConnection = 1,
    LinkReserved = 2,
    NotAllowed = 3,
    NotSupported = 4,
    PhSimPin = 5,
    PhFsimPin = 6,
    PhFsimPuk = 7,
    SimNotInserted = 10,
    SimPin = 11,
    SimPuk = 12,
    SimFailure = 13,
    SimBusy = 14,
    SimWrong = 15,
    IncorrectPassword = 16,
    SimPin2 = 17,
    SimPuk2 = 18,
    MemoryFull = 20,
    InvalidIndex = 21,
    NotFound = 22,
    MemoryFailure = 23,
    TextTooLong = 24,
    InvalidTextChars = 25,
    DialStringTooLong = 26,
    InvalidDialChars = 27,
    NoNetwork = 30,
    NetworkTimeout = 31,
    EmergencyOnly = 32,
    NetworkPin = 40,
    NetworkPuk = 41,
    NetworkSubsetPin = 42,
    NetworkSubsetPuk = 43,
    ServicePin = 44,
    ServicePuk = 45,
    CorporatePin = 46,
    CorporatePuk = 47,
    HiddenKeyRequired = 48,
    Unknown = 100,
    IllegalMs = 103,
    IllegalMe = 106,
    GprsNotAllowed = 107,
    PlmnNotAllowed = 111,
    LocationAreaNotAllowed = 112,
    RoamingNotAllowed = 113,
    ServiceOptionNotSupported = 132,
    ServiceOptionNotSubscribed = 133,
    ServiceOptionOutOfOrder = 134,
    UnspecifiedGprsError = 148,
    PdpAuthenticationFailure = 149,
    InvalidMobileClass = 150,
}

impl From<u16> for CmeError {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::PhoneFailure,
            1 => Self::NoConnection,
            2 => Self::LinkReserved,
            3 => Self::NotAllowed,
            4 => Self::NotSupported,
            5 => Self::PhSimPin,
            6 => Self::PhFsimPin,
            7 => Self::PhFsimPuk,
            10 => Self::SimNotInserted,
            11 => Self::SimPin,
            12 => Self::SimPuk,
            13 => Self::SimFailure,
            14 => Self::SimBusy,
            15 => Self::SimWrong,
            16 => Self::IncorrectPassword,
            17 => Self::SimPin2,
            18 => Self::SimPuk2,
            20 => Self::MemoryFull,
            21 => Self::InvalidIndex,
            22 => Self::NotFound,
            23 => Self::MemoryFailure,
            24 => Self::TextTooLong,
            25 => Self::InvalidTextChars,
            26 => Self::DialStringTooLong,
            27 => Self::InvalidDialChars,
            30 => Self::NoNetwork,
            31 => Self::NetworkTimeout,
            32 => Self::EmergencyOnly,
            40 => Self::NetworkPin,
            41 => Self::NetworkPuk,
            42 => Self::NetworkSubsetPin,
            43 => Self::NetworkSubsetPuk,
            44 => Self::ServicePin,
            45 => Self::ServicePuk,
            46 => Self::CorporatePin,
            47 => Self::CorporatePuk,
            48 => Self::HiddenKeyRequired,
            103 => Self::IllegalMs,
            106 => Self::IllegalMe,
            107 => Self::GprsNotAllowed,
            111 => Self::PlmnNotAllowed,
            112 => Self::LocationAreaNotAllowed,
            113 => Self::RoamingNotAllowed,
            132 => Self::ServiceOptionNotSupported,
            133 => Self::ServiceOptionNotSubscribed,
            134 => Self::ServiceOptionOutOfOrder,
            148 => Self::UnspecifiedGprsError,
            149 => Self::PdpAuthenticationFailure,
            150 => Self::InvalidMobileClass,
            _ => Self::Unknown,
        }
    }
}

impl CmeError {
    /// Parses the verbose form some modems report instead of the numeric
    /// code. These strings are wire values, not user-facing text.
    pub fn from_verbose(text: &[u8]) -> Option<Self> {
        Some(match text {
            b"phone failure" => Self::PhoneFailure,
            b"no connection to phone" => Self::NoConnection,
            b"phone-adaptor link reserved" => Self::LinkReserved,
            b"operation not allowed" => Self::NotAllowed,
            b"operation not supported" => Self::NotSupported,
            b"PH-SIM PIN required" => Self::PhSimPin,
            b"PH-FSIM PIN required" => Self::PhFsimPin,
            b"PH-FSIM PUK required" => Self::PhFsimPuk,
            b"SIM not inserted" => Self::SimNotInserted,
            b"SIM PIN required" => Self::SimPin,
            b"SIM PUK required" => Self::SimPuk,
            b"SIM failure" => Self::SimFailure,
            b"SIM busy" => Self::SimBusy,
            b"SIM wrong" => Self::SimWrong,
            b"incorrect password" => Self::IncorrectPassword,
            b"SIM PIN2 required" => Self::SimPin2,
            b"SIM PUK2 required" => Self::SimPuk2,
            b"memory full" => Self::MemoryFull,
            b"invalid index" => Self::InvalidIndex,
            b"not found" => Self::NotFound,
            b"memory failure" => Self::MemoryFailure,
            b"text string too long" => Self::TextTooLong,
            b"invalid characters in text string" => Self::InvalidTextChars,
            b"dial string too long" => Self::DialStringTooLong,
            b"invalid characters in dial string" => Self::InvalidDialChars,
            b"no network service" => Self::NoNetwork,
            b"network timeout" => Self::NetworkTimeout,
            b"network not allowed - emergency calls only" => Self::EmergencyOnly,
            b"network personalization PIN required" => Self::NetworkPin,
            b"network personalization PUK required" => Self::NetworkPuk,
            b"network subset personalization PIN required" => Self::NetworkSubsetPin,
            b"network subset personalization PUK required" => Self::NetworkSubsetPuk,
            b"service provider personalization PIN required" => Self::ServicePin,
            b"service provider personalization PUK required" => Self::ServicePuk,
            b"corporate personalization PIN required" => Self::CorporatePin,
            b"corporate personalization PUK required" => Self::CorporatePuk,
            b"hidden key required" => Self::HiddenKeyRequired,
            b"unknown" => Self::Unknown,
            b"Illegal MS" => Self::IllegalMs,
            b"Illegal ME" => Self::IllegalMe,
            b"GPRS services not allowed" => Self::GprsNotAllowed,
            b"PLMN not allowed" => Self::PlmnNotAllowed,
            b"Location area not allowed" => Self::LocationAreaNotAllowed,
            b"Roaming not allowed in this location area" => Self::RoamingNotAllowed,
            b"service option not supported" => Self::ServiceOptionNotSupported,
            b"requested service option not subscribed" => Self::ServiceOptionNotSubscribed,
            b"service option temporarily out of order" => Self::ServiceOptionOutOfOrder,
            b"unspecified GPRS error" => Self::UnspecifiedGprsError,
            b"PDP authentication failure" => Self::PdpAuthenticationFailure,
            b"invalid mobile class" => Self::InvalidMobileClass,
            _ => return None,
        })
    }
}
