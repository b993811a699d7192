use embassy_time::{Duration, Timer};

use crate::client::Chat;
use crate::error::Error;
use crate::result::AtResult;

/// Bounded retry policy for a single command.
///
/// The command is issued immediately; each failure worth another attempt
/// starts a single-shot delay before the same command string is submitted
/// again. Success or the final failure is reported exactly once, through
/// the same `Result` the plain [`Chat::chat`] call would produce, so
/// callers distinguish outcomes by `Ok`/`Err` alone.
///
/// Transport failures abort the retry loop right away, see
/// [`Error::is_retryable`].
///
/// The default of 15 attempts one second apart suits initialisation
/// commands that a modem rejects while it is still starting up.
///
/// Dropping the future returned by [`Retry::run`] cancels the pending
/// delay; the command is not resubmitted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Retry {
    attempts: u8,
    delay: Duration,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            attempts: 15,
            delay: Duration::from_secs(1),
        }
    }
}

impl Retry {
    /// Policy with the given number of attempts (at least one) and the
    /// default one second delay between them.
    pub const fn new(attempts: u8) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            delay: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs `command` under this policy.
    pub async fn run<C, const N: usize>(
        &self,
        chat: &mut C,
        command: &str,
    ) -> Result<AtResult<N>, Error>
    where
        C: Chat<N>,
    {
        let mut remaining = self.attempts;
        loop {
            match chat.chat(command).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    remaining -= 1;
                    if remaining == 0 {
                        return Err(e);
                    }
                    debug!("Command failed ({:?}), {} attempts left", e, remaining);
                    Timer::after(self.delay).await;
                }
            }
        }
    }
}
