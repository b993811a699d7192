use heapless::Vec;

use crate::client::CommandClass;
use crate::helpers::{complete_line, consume, LossyStr};
use crate::result::FinalCode;
use crate::urc::{UrcMatcher, UrcMatcherResult};

/// One unit of progress extracted from the receive buffer.
#[derive(Debug, PartialEq)]
pub enum DigestResult<const L: usize> {
    /// An unsolicited notification line.
    Urc(Vec<u8, L>),
    /// The in-flight command reached its terminal code; `content` holds the
    /// newline-joined lines that preceded it.
    Response { code: FinalCode, content: Vec<u8, L> },
    /// The modem is prompting for PDU data.
    Prompt(u8),
    /// No complete unit available yet.
    None,
}

pub trait Digester<const L: usize> {
    fn reset(&mut self);

    fn digest(
        &mut self,
        buf: &mut Vec<u8, L>,
        class: CommandClass,
        urc_matcher: &mut impl UrcMatcher,
    ) -> DigestResult<L>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Idle,
    Response,
}

/// Line-oriented digester for the standard AT response protocol.
///
/// Tracks whether a response is being received (armed by the command echo,
/// or forced when echo is disabled) and classifies every complete line as
/// echo, response content, terminal code, prompt or notification. The
/// call-progress codes (`CONNECT`, `NO CARRIER`, `BUSY`, ...) terminate the
/// in-flight command only when that command is call control; at any other
/// time they are notifications.
#[derive(Debug)]
pub struct DefaultDigester<const L: usize> {
    state: State,
    content: Vec<u8, L>,
    echo: bool,
}

impl<const L: usize> Default for DefaultDigester<L> {
    fn default() -> Self {
        Self {
            state: State::Idle,
            content: Vec::new(),
            echo: true,
        }
    }
}

impl<const L: usize> DefaultDigester<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect no command echo from the modem (`ATE0`). Response content can
    /// then not be told apart from unknown notifications, so unregistered
    /// `+...` lines are treated as content while a command is in flight.
    #[must_use]
    pub fn with_echo(mut self, enabled: bool) -> Self {
        self.echo = enabled;
        self
    }

    fn push_content(&mut self, line: &[u8]) {
        if !self.content.is_empty() && self.content.push(b'\n').is_err() {
            return;
        }
        let available = self.content.capacity() - self.content.len();
        if line.len() > available {
            warn!("Response content truncated ({} bytes over)", line.len() - available);
        }
        let take = line.len().min(available);
        let _ = self.content.extend_from_slice(&line[..take]);
    }

    fn finish(&mut self, code: FinalCode) -> DigestResult<L> {
        self.state = State::Idle;
        DigestResult::Response {
            code,
            content: core::mem::take(&mut self.content),
        }
    }
}

impl<const L: usize> Digester<L> for DefaultDigester<L> {
    fn reset(&mut self) {
        self.state = State::Idle;
        self.content.clear();
    }

    fn digest(
        &mut self,
        buf: &mut Vec<u8, L>,
        class: CommandClass,
        urc_matcher: &mut impl UrcMatcher,
    ) -> DigestResult<L> {
        loop {
            // Leftover line terminators between units.
            let ws = buf
                .iter()
                .position(|c| *c != b'\r' && *c != b'\n')
                .unwrap_or(buf.len());
            if ws > 0 {
                consume(buf, ws);
            }

            if buf.is_empty() {
                return DigestResult::None;
            }

            trace!("Digest {:?} / {:?}", self.state, LossyStr(buf));

            // Data prompt, only meaningful while a command waits for it.
            if class != CommandClass::None
                && (buf.as_slice() == b">" || buf.as_slice() == b"> ")
            {
                buf.clear();
                return DigestResult::Prompt(b'>');
            }

            match self.state {
                State::Idle => {
                    // Custom/PDU notification matching gets the first look.
                    let before = buf.len();
                    match urc_matcher.process(buf) {
                        UrcMatcherResult::Complete(urc) => return DigestResult::Urc(urc),
                        UrcMatcherResult::Incomplete => {
                            if buf.len() == before {
                                return DigestResult::None;
                            }
                            continue;
                        }
                        UrcMatcherResult::NotHandled => {}
                    }

                    let Some((span, used)) = complete_line(buf) else {
                        return DigestResult::None;
                    };
                    if span.is_empty() {
                        consume(buf, used);
                        continue;
                    }

                    if buf[span.clone()].starts_with(b"AT") {
                        // Command echo arms the response state.
                        consume(buf, used);
                        self.state = State::Response;
                        continue;
                    }

                    if let Some(code) = FinalCode::parse(&buf[span.clone()]) {
                        if code.is_call_progress() && class != CommandClass::CallControl {
                            let urc = line_vec(buf, span.clone());
                            consume(buf, used);
                            return DigestResult::Urc(urc);
                        }
                        consume(buf, used);
                        if class != CommandClass::None {
                            // Terminal code without a preceding echo.
                            return self.finish(code);
                        }
                        debug!("Stray terminal code with nothing in flight");
                        continue;
                    }

                    let looks_unsolicited =
                        buf[span.clone()] == *b"RING" || buf[span.clone()].starts_with(b"+");

                    if looks_unsolicited && (self.echo || class == CommandClass::None) {
                        let urc = line_vec(buf, span.clone());
                        consume(buf, used);
                        return DigestResult::Urc(urc);
                    }

                    if class != CommandClass::None {
                        // Echo is disabled; this must be response content.
                        self.state = State::Response;
                        continue;
                    }

                    debug!("Ignoring line: {:?}", LossyStr(&buf[span]));
                    consume(buf, used);
                }
                State::Response => {
                    let Some((span, used)) = complete_line(buf) else {
                        return DigestResult::None;
                    };
                    if span.is_empty() {
                        consume(buf, used);
                        continue;
                    }

                    if let Some(code) = FinalCode::parse(&buf[span.clone()]) {
                        if !code.is_call_progress() || class == CommandClass::CallControl {
                            consume(buf, used);
                            return self.finish(code);
                        }
                        // Call progress while an ordinary command runs.
                        let urc = line_vec(buf, span.clone());
                        consume(buf, used);
                        return DigestResult::Urc(urc);
                    }

                    let line: Vec<u8, L> = line_vec(buf, span);
                    self.push_content(&line);
                    consume(buf, used);
                }
            }
        }
    }
}

fn line_vec<const L: usize>(buf: &[u8], span: core::ops::Range<usize>) -> Vec<u8, L> {
    Vec::from_slice(&buf[span]).unwrap_or_default()
}
