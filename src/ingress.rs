use embedded_io_async::{Error, Read};
use heapless::Vec;

use crate::client::{ActiveCommand, CommandClass};
use crate::digest::{DigestResult, Digester};
use crate::helpers::LossyStr;
use crate::response::Response;
use crate::response_slot::ResponseSlot;
use crate::urc::{AtUrc, UrcMatcher};
use crate::urc_channel::UrcChannel;

/// Receive half of the chat engine.
///
/// Pumps transport bytes through the digester, delivers exactly one
/// completion per in-flight command into the response slot and publishes
/// parsed notifications on the URC channel.
pub struct Ingress<
    'a,
    D,
    M,
    U,
    const INGRESS_BUF_SIZE: usize,
    const URC_CAPACITY: usize,
    const URC_SUBSCRIBERS: usize,
> where
    D: Digester<INGRESS_BUF_SIZE>,
    M: UrcMatcher,
    U: AtUrc,
{
    digester: D,
    urc_matcher: M,
    buf: Vec<u8, INGRESS_BUF_SIZE>,
    res_slot: &'a ResponseSlot<INGRESS_BUF_SIZE>,
    urc_channel: &'a UrcChannel<U, URC_CAPACITY, URC_SUBSCRIBERS>,
    active: &'a ActiveCommand,
}

impl<
        'a,
        D,
        M,
        U,
        const INGRESS_BUF_SIZE: usize,
        const URC_CAPACITY: usize,
        const URC_SUBSCRIBERS: usize,
    > Ingress<'a, D, M, U, INGRESS_BUF_SIZE, URC_CAPACITY, URC_SUBSCRIBERS>
where
    D: Digester<INGRESS_BUF_SIZE>,
    M: UrcMatcher,
    U: AtUrc,
{
    pub fn new(
        digester: D,
        urc_matcher: M,
        res_slot: &'a ResponseSlot<INGRESS_BUF_SIZE>,
        urc_channel: &'a UrcChannel<U, URC_CAPACITY, URC_SUBSCRIBERS>,
        active: &'a ActiveCommand,
    ) -> Self {
        Self {
            digester,
            urc_matcher,
            buf: Vec::new(),
            res_slot,
            urc_channel,
            active,
        }
    }

    /// Feed received bytes into the engine and process whatever becomes
    /// complete.
    pub fn write(&mut self, data: &[u8]) {
        if self.active.take_reset() {
            debug!("Dropping receive state after abandoned command");
            self.digester.reset();
            self.buf.clear();
        }

        if self.buf.extend_from_slice(data).is_err() {
            error!("Receive buffer overflow! Buffer: {:?}", LossyStr(&self.buf));
            self.buf.clear();
            self.digester.reset();
            if self.active.class() != CommandClass::None {
                self.active.finish();
                if self.res_slot.signal(Response::Overflow).is_err() {
                    error!("Overflow completion dropped, previous one not consumed");
                }
            }
            return;
        }

        self.process();
    }

    fn process(&mut self) {
        loop {
            let class = self.active.class();
            match self
                .digester
                .digest(&mut self.buf, class, &mut self.urc_matcher)
            {
                DigestResult::None => break,
                DigestResult::Urc(line) => match U::parse(&line) {
                    Some(urc) => {
                        debug!("Received URC: {:?}", LossyStr(&line));
                        self.urc_channel.publish(urc);
                    }
                    None => {
                        warn!("Unrecognised notification: {:?}", LossyStr(&line));
                    }
                },
                DigestResult::Prompt(prompt) => {
                    debug!("Received prompt");
                    if self.res_slot.signal(Response::Prompt(prompt)).is_err() {
                        error!("Prompt dropped, previous completion not consumed");
                    }
                }
                DigestResult::Response { code, content } => {
                    if code.is_ok() {
                        if content.is_empty() {
                            debug!("Received OK");
                        } else {
                            debug!("Received response: {:?}", LossyStr(&content));
                        }
                    } else {
                        warn!("Command failed: {:?}", code);
                    }
                    self.active.finish();
                    if self.res_slot.signal(Response::Result { code, content }).is_err() {
                        error!("Response dropped, previous completion not consumed");
                    }
                }
            }
        }
    }

    /// Drive the engine from a serial receiver. Never returns; run it as
    /// its own task.
    pub async fn read_from(&mut self, serial: &mut impl Read) -> ! {
        loop {
            let mut buf = [0u8; 32];
            match serial.read(&mut buf).await {
                Ok(received) => {
                    if received > 0 {
                        self.write(&buf[..received]);
                    }
                }
                Err(e) => {
                    error!("Serial read error: {:?}", e.kind());
                }
            }
        }
    }
}
