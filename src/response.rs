use heapless::Vec;

use crate::error::Error;
use crate::result::{AtResult, FinalCode};

/// Completion value delivered from the ingress half to the waiting client.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<const N: usize> {
    /// The command reached a terminal code.
    Result { code: FinalCode, content: Vec<u8, N> },
    /// The modem is prompting for payload data.
    Prompt(u8),
    /// The receive buffer overflowed while the command was in flight.
    Overflow,
}

impl<const N: usize> Response<N> {
    pub(crate) const fn empty() -> Self {
        Response::Result {
            code: FinalCode::Ok,
            content: Vec::new(),
        }
    }

    /// Collapses the completion into the caller-facing result shape; a
    /// prompt is an invalid response to a command that did not offer data.
    pub fn into_result(self) -> Result<AtResult<N>, Error> {
        match self {
            Response::Result { code, content } => {
                if code.is_ok() {
                    Ok(AtResult { code, content })
                } else {
                    Err(code.into())
                }
            }
            Response::Prompt(_) => Err(Error::InvalidResponse),
            Response::Overflow => Err(Error::Overflow),
        }
    }
}
