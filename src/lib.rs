//! AT command session layer for GSM/3G modems.
//!
//! Sits between a serial transport and the telephony stack: commands go
//! in as strings, and each one comes back as exactly one completion
//! pairing a terminal result code with the response content. On top of
//! that sit a bounded retry decorator and controllers for RF
//! functionality, voice calls and the SIM phonebook.
//!
//! The engine is split in two halves sharing statically allocated state:
//!
//! - [`Ingress`] owns the receive side. Fed from the serial device (or
//!   driven by [`Ingress::read_from`] as its own task), it digests bytes
//!   into command completions and unsolicited notifications.
//! - [`ChatClient`] owns the transmit side. It writes one command at a
//!   time and waits for the completion the ingress half delivers.
//!
//! The AT protocol does not tag responses with request ids, so the whole
//! layer is built around one in-flight command per channel: responses
//! pair with commands purely by order.
//!
//! ```ignore
//! static BUFFERS: ChatBuffers<Urc, 512, 8, 2> = ChatBuffers::new();
//!
//! let (mut ingress, mut client) = BUFFERS.split(
//!     tx,
//!     DefaultDigester::<512>::new(),
//!     PduMatcher::default(),
//!     Config::new(),
//! );
//! spawner.spawn(ingress_task(ingress, rx)).unwrap();
//!
//! // Plain command/response:
//! let revision = client.chat("AT+CGMR").await?;
//!
//! // Start-up commands that need coaxing:
//! Retry::new(15).run(&mut client, "AT+CFUN=1").await?;
//!
//! // Typed controllers:
//! let mut phonebook = Phonebook::new(&mut client);
//! phonebook.select(PhonebookStorage::Sim).await?;
//! ```
//!
//! Unsolicited notifications (`RING`, `+CLIP:`, `+CREG:`, two-line
//! `+CMT:` PDUs, ...) are parsed into [`Urc`] values and fanned out on a
//! subscription channel, see [`ChatBuffers::urc_subscription`].

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod buffers;
mod client;
mod config;
mod digest;
mod helpers;
mod ingress;
mod response;
mod response_slot;
mod result;
mod retry;
mod urc;
mod urc_channel;

pub mod call;
pub mod error;
pub mod phonebook;
pub mod rf;

#[cfg(test)]
mod test_helpers;

pub use buffers::ChatBuffers;
pub use client::{ActiveCommand, Chat, ChatClient, CommandClass};
pub use config::Config;
pub use digest::{DefaultDigester, DigestResult, Digester};
pub use error::Error;
pub use helpers::LossyStr;
pub use ingress::Ingress;
pub use response::Response;
pub use response_slot::ResponseSlot;
pub use result::{AtResult, Fields, FinalCode, ResultParser};
pub use retry::Retry;
pub use urc::{
    AtUrc, CallerId, IndicatorEvent, NoopMatcher, PduKind, PduMatcher, PduNotification,
    RegistrationState, Urc, UrcMatcher, UrcMatcherResult,
};
pub use urc_channel::{SubscribeError, UrcChannel, UrcSubscription};
