//! RF functionality control (`AT+CFUN`).

use core::fmt::Write as _;

use heapless::String;

use crate::client::Chat;
use crate::error::Error;
use crate::retry::Retry;

/// Radio functionality level, the `<fun>` parameter of `AT+CFUN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfLevel {
    /// Minimum functionality, RF off
    Minimum,
    /// Full functionality
    Full,
    /// Transmit disabled
    TransmitDisabled,
    /// Receive disabled
    ReceiveDisabled,
    /// Both disabled (airplane mode)
    Airplane,
}

impl RfLevel {
    fn value(self) -> u8 {
        match self {
            RfLevel::Minimum => 0,
            RfLevel::Full => 1,
            RfLevel::TransmitDisabled => 2,
            RfLevel::ReceiveDisabled => 3,
            RfLevel::Airplane => 4,
        }
    }
}

impl TryFrom<u32> for RfLevel {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        Ok(match value {
            0 => RfLevel::Minimum,
            1 => RfLevel::Full,
            2 => RfLevel::TransmitDisabled,
            3 => RfLevel::ReceiveDisabled,
            4 => RfLevel::Airplane,
            _ => return Err(()),
        })
    }
}

/// Controller for querying and switching the radio functionality level.
///
/// Level changes go through the retry decorator: modems routinely reject
/// `AT+CFUN=<n>` while still powering up.
pub struct RfFunctionality<C> {
    chat: C,
    retry: Retry,
}

impl<C> RfFunctionality<C> {
    pub fn new(chat: C) -> Self {
        Self {
            chat,
            retry: Retry::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// `AT+CFUN?`, parsing the `+CFUN: <n>` report.
    pub async fn level<const N: usize>(&mut self) -> Result<RfLevel, Error>
    where
        C: Chat<N>,
    {
        let result = self.chat.chat("AT+CFUN?").await?;
        let mut parser = result.parser();
        let mut fields = parser.find("+CFUN:").ok_or(Error::Parse)?;
        let level = fields.uint().ok_or(Error::Parse)?;
        RfLevel::try_from(level).map_err(|_| Error::Parse)
    }

    /// `AT+CFUN=<n>`, retried per the configured policy.
    pub async fn set_level<const N: usize>(&mut self, level: RfLevel) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<16>::new();
        write!(command, "AT+CFUN={}", level.value()).map_err(|_| Error::Parse)?;
        self.retry.run(&mut self.chat, &command).await?;
        Ok(())
    }
}
