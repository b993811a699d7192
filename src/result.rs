use heapless::Vec;
use nom::{
    bytes::complete::{tag, take_until},
    character::complete,
    sequence::{delimited, separated_pair},
};

use crate::error::{CmeError, CmsError};
use crate::helpers::SliceExt;

/// Terminal result code of a single command, covering the V.25ter basic
/// codes and the 27.007/27.005 extended error forms. Both the verbose and
/// the numeric wire representations are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FinalCode {
    Ok,
    Connect,
    NoCarrier,
    Error,
    NoDialtone,
    Busy,
    NoAnswer,
    /// `+CME ERROR: <n|verbose>`
    Cme(CmeError),
    /// `+CMS ERROR: <n|verbose>`
    Cms(CmsError),
    /// `+EXT ERROR: <n>`
    Ext(u16),
}

impl FinalCode {
    /// Whether the command completed successfully. `VCON` and `CONNECT`
    /// count as success; everything else is a failure the caller sees as
    /// an [`crate::Error`].
    pub fn is_ok(&self) -> bool {
        matches!(self, FinalCode::Ok | FinalCode::Connect)
    }

    /// Call-progress codes terminate dial/answer/hangup commands but are
    /// unsolicited notifications at any other time.
    pub fn is_call_progress(&self) -> bool {
        matches!(
            self,
            FinalCode::Connect
                | FinalCode::NoCarrier
                | FinalCode::NoDialtone
                | FinalCode::Busy
                | FinalCode::NoAnswer
        )
    }

    /// Parses a whole line as a terminal result code.
    pub fn parse(line: &[u8]) -> Option<Self> {
        match line {
            b"OK" | b"0" | b"VCON" => Some(FinalCode::Ok),
            b"CONNECT" | b"1" => Some(FinalCode::Connect),
            b"NO CARRIER" | b"3" => Some(FinalCode::NoCarrier),
            b"ERROR" | b"4" => Some(FinalCode::Error),
            b"NO DIALTONE" | b"6" => Some(FinalCode::NoDialtone),
            b"BUSY" | b"7" => Some(FinalCode::Busy),
            b"NO ANSWER" | b"8" => Some(FinalCode::NoAnswer),
            // Data-mode connects carry a rate: `CONNECT 9600`
            _ if line.starts_with(b"CONNECT ") => Some(FinalCode::Connect),
            _ if line.starts_with(b"+CME ERROR:") => {
                let detail = line[b"+CME ERROR:".len()..].trim(b" \t");
                Some(FinalCode::Cme(match parse_u16(detail) {
                    Some(n) => n.into(),
                    None => CmeError::from_verbose(detail).unwrap_or(CmeError::Unknown),
                }))
            }
            _ if line.starts_with(b"+CMS ERROR:") => {
                let detail = line[b"+CMS ERROR:".len()..].trim(b" \t");
                Some(FinalCode::Cms(match parse_u16(detail) {
                    Some(n) => n.into(),
                    None => CmsError::from_verbose(detail).unwrap_or(CmsError::Unknown),
                }))
            }
            _ if line.starts_with(b"+EXT ERROR:") => {
                let detail = line[b"+EXT ERROR:".len()..].trim(b" \t");
                Some(FinalCode::Ext(parse_u16(detail).unwrap_or(0)))
            }
            _ => None,
        }
    }
}

fn parse_u16(input: &[u8]) -> Option<u16> {
    match complete::u16::<_, nom::error::Error<&[u8]>>(input) {
        Ok((rest, n)) if rest.is_empty() => Some(n),
        _ => None,
    }
}

/// Completed command response: the terminal code plus the content lines
/// that preceded it, newline separated.
#[derive(Debug, Clone, PartialEq)]
pub struct AtResult<const N: usize> {
    pub code: FinalCode,
    pub content: Vec<u8, N>,
}

impl<const N: usize> AtResult<N> {
    pub fn ok(&self) -> bool {
        self.code.is_ok()
    }

    /// Content as text; lossy in the sense that a non-UTF8 response reads
    /// as empty.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.content).unwrap_or("")
    }

    pub fn parser(&self) -> ResultParser<'_> {
        ResultParser::new(&self.content)
    }
}

/// Line/field scanner over response content, for pulling values out of
/// lines like `+CFUN: 1` or `+CPBR: 3,"+4512345678",145,"Alice"`.
pub struct ResultParser<'a> {
    rest: &'a [u8],
}

impl<'a> ResultParser<'a> {
    pub fn new(content: &'a [u8]) -> Self {
        Self { rest: content }
    }

    /// Next non-empty line, trimmed.
    pub fn next_line(&mut self) -> Option<&'a [u8]> {
        loop {
            let current = self.rest;
            if current.is_empty() {
                return None;
            }
            let (line, rest) = match current.iter().position(|c| *c == b'\r' || *c == b'\n') {
                Some(pos) => {
                    let mut next = pos + 1;
                    while next < current.len()
                        && (current[next] == b'\r' || current[next] == b'\n')
                    {
                        next += 1;
                    }
                    (&current[..pos], &current[next..])
                }
                None => (current, &[][..]),
            };
            self.rest = rest;
            let line = line.trim(b" \t");
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    /// Scans forward for the next line starting with `prefix` and returns
    /// a field scanner over the rest of that line. Repeated calls walk
    /// multi-entry responses.
    pub fn find(&mut self, prefix: &str) -> Option<Fields<'a>> {
        while let Some(line) = self.next_line() {
            if line.starts_with(prefix.as_bytes()) {
                return Some(Fields {
                    rest: line[prefix.len()..].trim_start(b" \t"),
                    first: true,
                });
            }
        }
        None
    }
}

/// Comma-separated field scanner for one response line.
pub struct Fields<'a> {
    rest: &'a [u8],
    first: bool,
}

impl<'a> Fields<'a> {
    fn sep(&mut self) {
        self.rest = self.rest.trim_start(b" \t");
        if !self.first {
            if let Some(rest) = self.rest.strip_prefix(b",") {
                self.rest = rest.trim_start(b" \t");
            }
        }
        self.first = false;
    }

    pub fn uint(&mut self) -> Option<u32> {
        self.sep();
        let (rest, n) = complete::u32::<_, nom::error::Error<&[u8]>>(self.rest).ok()?;
        self.rest = rest;
        Some(n)
    }

    pub fn string(&mut self) -> Option<&'a str> {
        self.sep();
        let (rest, s) = quoted(self.rest).ok()?;
        self.rest = rest;
        core::str::from_utf8(s).ok()
    }

    /// A `(first-last)` index range, as used by `+CPBR=?`.
    pub fn range(&mut self) -> Option<(u32, u32)> {
        self.sep();
        let (rest, bounds) = index_range(self.rest).ok()?;
        self.rest = rest;
        Some(bounds)
    }

    pub fn remainder(&self) -> &'a [u8] {
        self.rest
    }
}

fn quoted(i: &[u8]) -> nom::IResult<&[u8], &[u8]> {
    delimited(tag("\""), take_until("\""), tag("\""))(i)
}

fn index_range(i: &[u8]) -> nom::IResult<&[u8], (u32, u32)> {
    delimited(
        tag("("),
        separated_pair(complete::u32, tag("-"), complete::u32),
        tag(")"),
    )(i)
}
