use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_time::{with_timeout, Duration, Timer};
use embedded_io_async::Write;

use crate::config::Config;
use crate::error::Error;
use crate::helpers::{hex_pair, LossyStr};
use crate::response::Response;
use crate::response_slot::ResponseSlot;
use crate::result::AtResult;

const CTRL_Z: u8 = 0x1A;

/// How the digester must treat terminal codes for the command in flight.
///
/// Call-control commands (`ATD`, `ATA`, `ATH`, `ATO`, `AT+CHLD=`) are
/// terminated by the call-progress codes; for every other command those
/// codes are unsolicited notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandClass {
    None = 0,
    Basic = 1,
    CallControl = 2,
}

impl CommandClass {
    pub fn of(command: &str) -> Self {
        const CALL_VERBS: &[&[u8]] = &[b"ATD", b"ATA", b"ATH", b"ATO", b"AT+CHLD="];
        let cmd = command.as_bytes();
        if CALL_VERBS.iter().any(|verb| cmd.starts_with(verb)) {
            CommandClass::CallControl
        } else {
            CommandClass::Basic
        }
    }
}

/// In-flight command state shared between the client and the ingress half.
///
/// The client stores the class of the command it is about to write; the
/// digester reads it to classify terminal codes; the ingress half clears
/// it when the completion is delivered. A reset request tells the ingress
/// half to discard digester state after an abandoned (timed out) command.
///
/// Accesses use relaxed ordering: both halves run on the same cooperative
/// executor, the atomics only exist to make the shared reference safe.
pub struct ActiveCommand {
    class: AtomicU8,
    reset: AtomicBool,
}

impl ActiveCommand {
    pub const fn new() -> Self {
        Self {
            class: AtomicU8::new(CommandClass::None as u8),
            reset: AtomicBool::new(false),
        }
    }

    pub(crate) fn set(&self, class: CommandClass) {
        self.class.store(class as u8, Ordering::Relaxed);
    }

    pub(crate) fn finish(&self) {
        self.set(CommandClass::None);
    }

    pub(crate) fn class(&self) -> CommandClass {
        match self.class.load(Ordering::Relaxed) {
            1 => CommandClass::Basic,
            2 => CommandClass::CallControl,
            _ => CommandClass::None,
        }
    }

    pub(crate) fn request_reset(&self) {
        self.reset.store(true, Ordering::Relaxed);
    }

    pub(crate) fn take_reset(&self) -> bool {
        self.reset.swap(false, Ordering::Relaxed)
    }
}

impl Default for ActiveCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// The command/response contract of the chat engine: exactly one
/// completion per call, success or failure in the returned `Result`.
///
/// The retry decorator and the controllers are written against this trait
/// so they can be exercised without a transport.
pub trait Chat<const N: usize> {
    async fn chat(&mut self, command: &str) -> Result<AtResult<N>, Error>;

    async fn chat_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<AtResult<N>, Error>;
}

impl<const N: usize, C: Chat<N>> Chat<N> for &mut C {
    async fn chat(&mut self, command: &str) -> Result<AtResult<N>, Error> {
        (**self).chat(command).await
    }

    async fn chat_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<AtResult<N>, Error> {
        (**self).chat_with_timeout(command, timeout).await
    }
}

/// Client half of the chat engine.
///
/// Serializes commands onto the transport (`&mut self` enforces the
/// one-in-flight discipline), awaits the completion delivered by the
/// ingress half and maps it into [`AtResult`]/[`Error`]. A cooldown timer
/// spaces consecutive commands the way the modem expects.
pub struct ChatClient<'a, W: Write, const INGRESS_BUF_SIZE: usize> {
    writer: W,
    res_slot: &'a ResponseSlot<INGRESS_BUF_SIZE>,
    active: &'a ActiveCommand,
    config: Config,
    cooldown_timer: Option<Timer>,
}

impl<'a, W: Write, const INGRESS_BUF_SIZE: usize> ChatClient<'a, W, INGRESS_BUF_SIZE> {
    pub fn new(
        writer: W,
        res_slot: &'a ResponseSlot<INGRESS_BUF_SIZE>,
        active: &'a ActiveCommand,
        config: Config,
    ) -> Self {
        Self {
            writer,
            res_slot,
            active,
            config,
            cooldown_timer: None,
        }
    }

    async fn request(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<Response<INGRESS_BUF_SIZE>, Error> {
        self.wait_cooldown_timer().await;

        self.res_slot.reset();
        self.active.set(CommandClass::of(command));

        debug!("Sending command: {:?}", LossyStr(command.as_bytes()));

        if let Err(e) = self.write_line(command).await {
            self.active.finish();
            return Err(e);
        }

        let result = self.await_completion(timeout).await;
        self.start_cooldown_timer();
        result
    }

    async fn await_completion(
        &mut self,
        timeout: Duration,
    ) -> Result<Response<INGRESS_BUF_SIZE>, Error> {
        match with_timeout(timeout, self.res_slot.wait()).await {
            Ok(()) => Ok(self.res_slot.read()),
            Err(_) => {
                warn!("No terminal response within {}ms", timeout.as_millis());
                // A late response must not complete the next command.
                self.active.finish();
                self.active.request_reset();
                Err(Error::Timeout)
            }
        }
    }

    async fn write_line(&mut self, command: &str) -> Result<(), Error> {
        self.writer
            .write_all(command.as_bytes())
            .await
            .map_err(|_| Error::Write)?;
        self.writer.write_all(b"\r").await.map_err(|_| Error::Write)?;
        self.writer.flush().await.map_err(|_| Error::Write)
    }

    /// Sends `command`, waits for the `> ` prompt and transmits `pdu`
    /// hex-encoded, terminated by CTRL-Z without a trailing CR, then waits
    /// for the terminal response. Used for `AT+CMGS` and friends.
    pub async fn chat_pdu(
        &mut self,
        command: &str,
        pdu: &[u8],
    ) -> Result<AtResult<INGRESS_BUF_SIZE>, Error> {
        let timeout = self.config.response_timeout;
        match self.request(command, timeout).await? {
            Response::Prompt(_) => {
                debug!("Sending {} byte PDU", pdu.len());
                self.res_slot.reset();
                if let Err(e) = self.write_pdu(pdu).await {
                    self.active.finish();
                    return Err(e);
                }
                self.await_completion(timeout).await?.into_result()
            }
            // The modem may reject the command before prompting.
            response => response.into_result(),
        }
    }

    async fn write_pdu(&mut self, pdu: &[u8]) -> Result<(), Error> {
        let mut out = [0u8; 64];
        for chunk in pdu.chunks(out.len() / 2) {
            let mut len = 0;
            for byte in chunk {
                let pair = hex_pair(*byte);
                out[len] = pair[0];
                out[len + 1] = pair[1];
                len += 2;
            }
            self.writer
                .write_all(&out[..len])
                .await
                .map_err(|_| Error::Write)?;
        }
        self.writer
            .write_all(&[CTRL_Z])
            .await
            .map_err(|_| Error::Write)?;
        self.writer.flush().await.map_err(|_| Error::Write)
    }

    fn start_cooldown_timer(&mut self) {
        self.cooldown_timer = Some(Timer::after(self.config.cmd_cooldown));
    }

    async fn wait_cooldown_timer(&mut self) {
        if let Some(cooldown) = self.cooldown_timer.take() {
            cooldown.await
        }
    }
}

impl<W: Write, const INGRESS_BUF_SIZE: usize> Chat<INGRESS_BUF_SIZE>
    for ChatClient<'_, W, INGRESS_BUF_SIZE>
{
    async fn chat(&mut self, command: &str) -> Result<AtResult<INGRESS_BUF_SIZE>, Error> {
        let timeout = self.config.response_timeout;
        self.chat_with_timeout(command, timeout).await
    }

    async fn chat_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<AtResult<INGRESS_BUF_SIZE>, Error> {
        self.request(command, timeout).await?.into_result()
    }
}
