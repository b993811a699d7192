//! SIM/device phonebook access (`AT+CPBS`, `AT+CPBR`, `AT+CPBW`).

use core::fmt::Write as _;

use embassy_time::Duration;
use heapless::{String, Vec};

use crate::client::Chat;
use crate::error::Error;
use crate::retry::Retry;

const MAX_ENTRIES_PER_READ: usize = 16;

pub const MAX_NUMBER_LEN: usize = 32;
pub const MAX_TEXT_LEN: usize = 32;

/// Phonebook storages of 3GPP TS 27.007 section 8.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhonebookStorage {
    /// SIM phonebook
    Sim,
    /// Fixed dialing numbers
    FixedDialing,
    /// Last dialed numbers
    LastDialed,
    /// Missed calls
    MissedCalls,
    /// Received calls
    ReceivedCalls,
    /// Own numbers
    OwnNumbers,
    /// Emergency numbers
    Emergency,
}

impl PhonebookStorage {
    fn as_str(&self) -> &'static str {
        match self {
            PhonebookStorage::Sim => "SM",
            PhonebookStorage::FixedDialing => "FD",
            PhonebookStorage::LastDialed => "DC",
            PhonebookStorage::MissedCalls => "MC",
            PhonebookStorage::ReceivedCalls => "RC",
            PhonebookStorage::OwnNumbers => "ON",
            PhonebookStorage::Emergency => "EN",
        }
    }
}

/// Index bounds and field widths of the selected storage, from `+CPBR=?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhonebookLimits {
    pub first_index: u16,
    pub last_index: u16,
    pub max_number_len: u16,
    pub max_text_len: u16,
}

/// One phonebook slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhonebookEntry {
    pub index: u16,
    pub number: String<MAX_NUMBER_LEN>,
    /// Type-of-address octet; 145 for international numbers.
    pub kind: u8,
    pub text: String<MAX_TEXT_LEN>,
}

/// Phonebook client of the chat engine.
///
/// Storage selection goes through the retry decorator: right after power
/// up the SIM rejects `AT+CPBS` until its filesystem is ready.
pub struct Phonebook<C> {
    chat: C,
    retry: Retry,
}

impl<C> Phonebook<C> {
    pub fn new(chat: C) -> Self {
        Self {
            chat,
            retry: Retry::new(2).delay(Duration::from_millis(500)),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Selects `storage` for the subsequent read/write operations.
    pub async fn select<const N: usize>(
        &mut self,
        storage: PhonebookStorage,
    ) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<16>::new();
        write!(command, "AT+CPBS=\"{}\"", storage.as_str()).map_err(|_| Error::Parse)?;
        self.retry.run(&mut self.chat, &command).await?;
        Ok(())
    }

    /// Queries the selected storage's index bounds and field widths.
    pub async fn limits<const N: usize>(&mut self) -> Result<PhonebookLimits, Error>
    where
        C: Chat<N>,
    {
        let result = self.chat.chat("AT+CPBR=?").await?;
        let mut parser = result.parser();
        let mut fields = parser.find("+CPBR:").ok_or(Error::Parse)?;
        let (first_index, last_index) = fields.range().ok_or(Error::Parse)?;
        let max_number_len = fields.uint().ok_or(Error::Parse)? as u16;
        let max_text_len = fields.uint().ok_or(Error::Parse)? as u16;
        Ok(PhonebookLimits {
            first_index: first_index as u16,
            last_index: last_index as u16,
            max_number_len,
            max_text_len,
        })
    }

    /// Reads the entries in `first..=last`. Unused slots are simply absent
    /// from the response. At most 16 entries come back per call; page
    /// through larger storages.
    pub async fn read<const N: usize>(
        &mut self,
        first: u16,
        last: u16,
    ) -> Result<Vec<PhonebookEntry, MAX_ENTRIES_PER_READ>, Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<24>::new();
        if first == last {
            write!(command, "AT+CPBR={}", first).map_err(|_| Error::Parse)?;
        } else {
            write!(command, "AT+CPBR={},{}", first, last).map_err(|_| Error::Parse)?;
        }
        let result = self.chat.chat(&command).await?;

        let mut entries = Vec::new();
        let mut parser = result.parser();
        while let Some(mut fields) = parser.find("+CPBR:") {
            let entry = (|| {
                let index = fields.uint()? as u16;
                let number_raw = fields.string()?;
                let kind = fields.uint()? as u8;
                let text_raw = fields.string().unwrap_or("");

                let mut number = String::new();
                number.push_str(number_raw).ok()?;
                let mut text = String::new();
                text.push_str(text_raw).ok()?;
                Some(PhonebookEntry {
                    index,
                    number,
                    kind,
                    text,
                })
            })();

            match entry {
                Some(entry) => {
                    if entries.push(entry).is_err() {
                        warn!("Phonebook read truncated at {} entries", entries.len());
                        break;
                    }
                }
                None => warn!("Skipping malformed phonebook entry"),
            }
        }
        Ok(entries)
    }

    /// Writes `number`/`text` at `index`. The type of address is derived
    /// from the number: international when it starts with `+`.
    pub async fn write<const N: usize>(
        &mut self,
        index: u16,
        number: &str,
        text: &str,
    ) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let kind: u8 = if number.starts_with('+') { 145 } else { 129 };
        let mut command = String::<{ 24 + MAX_NUMBER_LEN + MAX_TEXT_LEN }>::new();
        write!(command, "AT+CPBW={},\"{}\",{},\"{}\"", index, number, kind, text)
            .map_err(|_| Error::Parse)?;
        self.chat.chat(&command).await.map(drop)
    }

    /// Clears the slot at `index` (`AT+CPBW=<index>`).
    pub async fn erase<const N: usize>(&mut self, index: u16) -> Result<(), Error>
    where
        C: Chat<N>,
    {
        let mut command = String::<16>::new();
        write!(command, "AT+CPBW={}", index).map_err(|_| Error::Parse)?;
        self.chat.chat(&command).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmeError;
    use crate::test_helpers::{ok, MockChat};

    #[tokio::test]
    async fn select_retries_while_sim_busy() {
        let chat = MockChat::<64>::new()
            .expect(Err(Error::Cme(CmeError::SimBusy)))
            .expect(ok(b""));
        let mut phonebook =
            Phonebook::new(chat).with_retry(Retry::new(2).delay(Duration::from_millis(1)));

        phonebook.select(PhonebookStorage::Sim).await.unwrap();

        assert_eq!(phonebook.chat.sent, ["AT+CPBS=\"SM\"", "AT+CPBS=\"SM\""]);
    }

    #[tokio::test]
    async fn select_gives_up_after_budget() {
        let chat = MockChat::<64>::new()
            .expect(Err(Error::Cme(CmeError::SimBusy)))
            .expect(Err(Error::Cme(CmeError::SimBusy)));
        let mut phonebook =
            Phonebook::new(chat).with_retry(Retry::new(2).delay(Duration::from_millis(1)));

        assert_eq!(
            phonebook.select(PhonebookStorage::Sim).await,
            Err(Error::Cme(CmeError::SimBusy))
        );
        assert_eq!(phonebook.chat.sent.len(), 2);
    }

    #[tokio::test]
    async fn limits_parse() {
        let chat = MockChat::<64>::new().expect(ok(b"+CPBR: (1-250),40,18"));
        let mut phonebook = Phonebook::new(chat);

        assert_eq!(
            phonebook.limits().await,
            Ok(PhonebookLimits {
                first_index: 1,
                last_index: 250,
                max_number_len: 40,
                max_text_len: 18,
            })
        );
        assert_eq!(phonebook.chat.sent, ["AT+CPBR=?"]);
    }

    #[tokio::test]
    async fn read_range() {
        let content = b"+CPBR: 1,\"12345\",129,\"Alice\"\r\n+CPBR: 3,\"+4567890\",145,\"Bob\"";
        let chat = MockChat::<128>::new().expect(ok(content));
        let mut phonebook = Phonebook::new(chat);

        let entries = phonebook.read(1, 10).await.unwrap();

        assert_eq!(phonebook.chat.sent, ["AT+CPBR=1,10"]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].number.as_str(), "12345");
        assert_eq!(entries[0].kind, 129);
        assert_eq!(entries[0].text.as_str(), "Alice");
        assert_eq!(entries[1].index, 3);
        assert_eq!(entries[1].kind, 145);
    }

    #[tokio::test]
    async fn read_single_slot() {
        let chat = MockChat::<64>::new().expect(ok(b"+CPBR: 7,\"555\",129,\"Carol\""));
        let mut phonebook = Phonebook::new(chat);

        let entries = phonebook.read(7, 7).await.unwrap();

        assert_eq!(phonebook.chat.sent, ["AT+CPBR=7"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text.as_str(), "Carol");
    }

    #[tokio::test]
    async fn write_and_erase() {
        let chat = MockChat::<256>::new().expect(ok(b"")).expect(ok(b"")).expect(ok(b""));
        let mut phonebook = Phonebook::new(chat);

        phonebook.write(5, "+4512345678", "Alice").await.unwrap();
        phonebook.write(6, "80808080", "Bank").await.unwrap();
        phonebook.erase(5).await.unwrap();

        assert_eq!(
            phonebook.chat.sent,
            [
                "AT+CPBW=5,\"+4512345678\",145,\"Alice\"",
                "AT+CPBW=6,\"80808080\",129,\"Bank\"",
                "AT+CPBW=5"
            ]
        );
    }
}
