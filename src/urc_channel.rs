use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Subscriber};

use crate::urc::AtUrc;

pub type UrcSubscription<'sub, Urc, const CAPACITY: usize, const SUBSCRIBERS: usize> =
    Subscriber<'sub, CriticalSectionRawMutex, Urc, CAPACITY, SUBSCRIBERS, 1>;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscribeError {
    MaximumSubscribersReached,
}

/// Fan-out of parsed unsolicited notifications to up to `SUBSCRIBERS`
/// interested parties. A slow subscriber loses the oldest notifications,
/// it cannot stall the channel.
pub struct UrcChannel<Urc: AtUrc, const CAPACITY: usize, const SUBSCRIBERS: usize>(
    pub(crate) PubSubChannel<CriticalSectionRawMutex, Urc, CAPACITY, SUBSCRIBERS, 1>,
);

impl<Urc: AtUrc, const CAPACITY: usize, const SUBSCRIBERS: usize>
    UrcChannel<Urc, CAPACITY, SUBSCRIBERS>
{
    pub const fn new() -> Self {
        Self(PubSubChannel::new())
    }

    pub fn subscribe(
        &self,
    ) -> Result<UrcSubscription<'_, Urc, CAPACITY, SUBSCRIBERS>, SubscribeError> {
        self.0
            .subscriber()
            .map_err(|_| SubscribeError::MaximumSubscribersReached)
    }

    pub fn free_capacity(&self) -> usize {
        self.0.free_capacity()
    }

    pub(crate) fn publish(&self, urc: Urc) {
        self.0.immediate_publisher().publish_immediate(urc);
    }
}

impl<Urc: AtUrc, const CAPACITY: usize, const SUBSCRIBERS: usize> Default
    for UrcChannel<Urc, CAPACITY, SUBSCRIBERS>
{
    fn default() -> Self {
        Self::new()
    }
}
