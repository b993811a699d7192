use core::cell::RefCell;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::Mutex,
    signal::Signal,
};

use crate::response::Response;

/// Single-completion hand-off between the ingress half and the client.
///
/// Holds at most one completion; the one-command-in-flight discipline of
/// the client guarantees the previous completion is consumed before the
/// next command is written.
pub struct ResponseSlot<const N: usize>(
    Mutex<CriticalSectionRawMutex, RefCell<Response<N>>>,
    Signal<CriticalSectionRawMutex, ()>,
);

#[derive(Debug)]
pub struct SlotInUseError;

impl<const N: usize> ResponseSlot<N> {
    pub const fn new() -> Self {
        Self(
            Mutex::new(RefCell::new(Response::empty())),
            Signal::new(),
        )
    }

    /// Drop a completion left over from an abandoned command.
    pub fn reset(&self) {
        self.1.reset();
    }

    /// Wait until a completion is delivered.
    pub async fn wait(&self) {
        self.1.wait().await
    }

    /// Whether an unconsumed completion is pending.
    pub fn available(&self) -> bool {
        self.1.signaled()
    }

    /// Read out the delivered completion.
    pub fn read(&self) -> Response<N> {
        let guard = self.0.try_lock().unwrap();
        let response = guard.borrow();
        response.clone()
    }

    pub(crate) fn signal(&self, response: Response<N>) -> Result<(), SlotInUseError> {
        if self.1.signaled() {
            return Err(SlotInUseError);
        }
        let guard = self.0.try_lock().unwrap();
        *guard.borrow_mut() = response;
        self.1.signal(());
        Ok(())
    }
}

impl<const N: usize> Default for ResponseSlot<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::FinalCode;
    use heapless::Vec;

    #[test]
    fn deliver_and_read() {
        let slot: ResponseSlot<64> = ResponseSlot::new();
        assert!(!slot.available());

        slot.signal(Response::Result {
            code: FinalCode::Ok,
            content: Vec::from_slice(b"+CGMI: Test").unwrap(),
        })
        .unwrap();

        assert!(slot.available());
        assert_eq!(
            slot.read(),
            Response::Result {
                code: FinalCode::Ok,
                content: Vec::from_slice(b"+CGMI: Test").unwrap(),
            }
        );
    }

    #[test]
    fn second_delivery_refused_until_consumed() {
        let slot: ResponseSlot<64> = ResponseSlot::new();
        slot.signal(Response::Prompt(b'>')).unwrap();
        assert!(slot.signal(Response::Overflow).is_err());

        slot.reset();
        assert!(slot.signal(Response::Overflow).is_ok());
    }
}
