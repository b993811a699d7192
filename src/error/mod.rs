mod cme;
mod cms;

pub use cme::CmeError;
pub use cms::CmsError;

use crate::result::FinalCode;

/// Errors surfaced to callers of the chat client and the retry decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Serial read error
    Read,
    /// Serial write error
    Write,
    /// Timed out while waiting for a terminal response
    Timeout,
    /// Receive buffer overflowed while a command was in flight
    Overflow,
    /// Failed to parse a structured response
    Parse,
    /// The modem produced something other than the expected response kind
    InvalidResponse,
    /// Command finished with a failure code (`ERROR`, `NO CARRIER`, ...)
    Command(FinalCode),
    /// GSM equipment error (`+CME ERROR`)
    Cme(CmeError),
    /// GSM network/message error (`+CMS ERROR`)
    Cms(CmsError),
}

impl Error {
    /// Whether the retry decorator may usefully resubmit the command.
    ///
    /// Rejections by the modem and response timeouts are worth another
    /// attempt; transport failures and local parse problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::Command(_) | Error::Cme(_) | Error::Cms(_)
        )
    }
}

impl From<FinalCode> for Error {
    fn from(code: FinalCode) -> Self {
        match code {
            FinalCode::Cme(e) => Error::Cme(e),
            FinalCode::Cms(e) => Error::Cms(e),
            code => Error::Command(code),
        }
    }
}
