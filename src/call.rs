//! Voice call control: dial, accept, hold and hangup, plus the `+CLCC`
//! call list.

use core::fmt::Write as _;

use embassy_time::Duration;
use heapless::{String, Vec};

use crate::client::Chat;
use crate::error::Error;
use crate::result::AtResult;

/// Dial and answer outcomes arrive as call-progress codes, which can take
/// the network a while to produce.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

pub const MAX_NUMBER_LEN: usize = 32;
const MAX_CALLS: usize = 8;

/// State of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallState {
    /// No call activity
    Idle,
    /// Outgoing call, number sent
    Dialing,
    /// Outgoing call, remote party ringing
    Alerting,
    /// Call is up
    Connected,
    /// Call parked on hold
    Held,
    /// Incoming call ringing
    Incoming,
    /// Incoming call waiting behind an active call
    Waiting,
    /// Call has been torn down
    Hangup,
}

impl CallState {
    /// Maps the `<stat>` digit of a `+CLCC` entry.
    fn from_clcc(stat: u32) -> Option<Self> {
        Some(match stat {
            0 => CallState::Connected,
            1 => CallState::Held,
            2 => CallState::Dialing,
            3 => CallState::Alerting,
            4 => CallState::Incoming,
            5 => CallState::Waiting,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

/// One entry of the `+CLCC` current-call list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallInfo {
    pub id: u8,
    pub direction: CallDirection,
    pub state: CallState,
    pub number: Option<String<MAX_NUMBER_LEN>>,
}

/// Call-control client of the chat engine.
pub struct Calls<C> {
    chat: C,
}

impl<C> Calls<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    /// Dials `number` as a voice call (`ATD<number>;`). Spaces and dashes
    /// are stripped; everything else is sent as-is, including supplementary
    /// service prefixes.
    pub async fn dial<const N: usize>(&mut self, number: &str) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<{ MAX_NUMBER_LEN + 8 }>::new();
        command.push_str("ATD").map_err(|_| Error::Parse)?;
        for ch in number.chars() {
            if ch == ' ' || ch == '-' {
                continue;
            }
            command.push(ch).map_err(|_| Error::Parse)?;
        }
        command.push(';').map_err(|_| Error::Parse)?;

        self.chat
            .chat_with_timeout(&command, CALL_TIMEOUT)
            .await
            .map(drop)
    }

    /// Accepts the ringing incoming call (`ATA`).
    pub async fn accept<const N: usize>(&mut self) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        self.chat
            .chat_with_timeout("ATA", CALL_TIMEOUT)
            .await
            .map(drop)
    }

    /// Releases the active calls (`AT+CHLD=1`), accepting a held or
    /// waiting call if one exists.
    pub async fn hangup<const N: usize>(&mut self) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        self.chat.chat("AT+CHLD=1").await.map(drop)
    }

    /// Releases a specific call by its `+CLCC` id (`AT+CHLD=1<id>`).
    pub async fn release<const N: usize>(&mut self, id: u8) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<16>::new();
        write!(command, "AT+CHLD=1{}", id).map_err(|_| Error::Parse)?;
        self.chat.chat(&command).await.map(drop)
    }

    /// Hangs up everything (`ATH`), the big hammer.
    pub async fn hangup_all<const N: usize>(&mut self) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        self.chat.chat("ATH").await.map(drop)
    }

    /// Swaps active and held calls (`AT+CHLD=2`).
    pub async fn hold<const N: usize>(&mut self) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        self.chat.chat("AT+CHLD=2").await.map(drop)
    }

    /// Lists current calls (`AT+CLCC`). Entries the modem reports with an
    /// unknown state digit are skipped.
    pub async fn list<const N: usize>(&mut self) -> Result<Vec<CallInfo, MAX_CALLS>, Error>
    where
        C: Chat<N>,
    {
        let result = self.chat.chat("AT+CLCC").await?;
        Ok(parse_call_list(&result))
    }
}

fn parse_call_list<const N: usize>(result: &AtResult<N>) -> Vec<CallInfo, MAX_CALLS> {
    let mut calls = Vec::new();
    let mut parser = result.parser();

    while let Some(mut fields) = parser.find("+CLCC:") {
        let entry = (|| {
            let id = fields.uint()? as u8;
            let direction = match fields.uint()? {
                0 => CallDirection::Outgoing,
                _ => CallDirection::Incoming,
            };
            let state = CallState::from_clcc(fields.uint()?)?;
            let _mode = fields.uint()?;
            let _multiparty = fields.uint()?;
            let number = fields.string().and_then(|num| {
                let mut owned = String::new();
                owned.push_str(num).ok()?;
                Some(owned)
            });
            Some(CallInfo {
                id,
                direction,
                state,
                number,
            })
        })();

        match entry {
            Some(entry) => {
                if calls.push(entry).is_err() {
                    warn!("Call list truncated at {} entries", calls.len());
                    break;
                }
            }
            None => warn!("Skipping malformed call entry"),
        }
    }

    calls
}
