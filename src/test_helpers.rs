//! Scripted [`Chat`] implementation for exercising the retry decorator
//! and the controllers without a transport.

use std::collections::VecDeque;

use embassy_time::Duration;
use heapless::Vec;

use crate::client::Chat;
use crate::error::Error;
use crate::result::{AtResult, FinalCode};

pub struct MockChat<const N: usize = 64> {
    pub script: VecDeque<Result<AtResult<N>, Error>>,
    pub sent: std::vec::Vec<String>,
}

impl<const N: usize> MockChat<N> {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            sent: std::vec::Vec::new(),
        }
    }

    #[must_use]
    pub fn expect(mut self, outcome: Result<AtResult<N>, Error>) -> Self {
        self.script.push_back(outcome);
        self
    }
}

impl<const N: usize> Chat<N> for MockChat<N> {
    async fn chat(&mut self, command: &str) -> Result<AtResult<N>, Error> {
        self.sent.push(command.to_owned());
        self.script
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted command: {command}"))
    }

    async fn chat_with_timeout(
        &mut self,
        command: &str,
        _timeout: Duration,
    ) -> Result<AtResult<N>, Error> {
        self.chat(command).await
    }
}

pub fn ok<const N: usize>(content: &[u8]) -> Result<AtResult<N>, Error> {
    Ok(AtResult {
        code: FinalCode::Ok,
        content: Vec::from_slice(content).unwrap(),
    })
}

pub fn rejected<const N: usize>() -> Result<AtResult<N>, Error> {
    Err(Error::Command(FinalCode::Error))
}
