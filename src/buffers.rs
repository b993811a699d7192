use embedded_io_async::Write;

use crate::client::{ActiveCommand, ChatClient};
use crate::config::Config;
use crate::digest::Digester;
use crate::ingress::Ingress;
use crate::response_slot::ResponseSlot;
use crate::urc::{AtUrc, UrcMatcher};
use crate::urc_channel::{SubscribeError, UrcChannel, UrcSubscription};

/// Statically allocatable state shared by the two halves of one channel.
///
/// ```ignore
/// static BUFFERS: ChatBuffers<Urc, 512, 8, 2> = ChatBuffers::new();
///
/// let (mut ingress, mut client) = BUFFERS.split(
///     tx,
///     DefaultDigester::<512>::new(),
///     PduMatcher::default(),
///     Config::new(),
/// );
/// ```
pub struct ChatBuffers<
    U: AtUrc,
    const INGRESS_BUF_SIZE: usize,
    const URC_CAPACITY: usize,
    const URC_SUBSCRIBERS: usize,
> {
    res_slot: ResponseSlot<INGRESS_BUF_SIZE>,
    urc_channel: UrcChannel<U, URC_CAPACITY, URC_SUBSCRIBERS>,
    active: ActiveCommand,
}

impl<
        U: AtUrc,
        const INGRESS_BUF_SIZE: usize,
        const URC_CAPACITY: usize,
        const URC_SUBSCRIBERS: usize,
    > ChatBuffers<U, INGRESS_BUF_SIZE, URC_CAPACITY, URC_SUBSCRIBERS>
{
    pub const fn new() -> Self {
        Self {
            res_slot: ResponseSlot::new(),
            urc_channel: UrcChannel::new(),
            active: ActiveCommand::new(),
        }
    }

    /// Builds the ingress/client pair for one physical channel.
    pub fn split<'a, W: Write, D: Digester<INGRESS_BUF_SIZE>, M: UrcMatcher>(
        &'a self,
        writer: W,
        digester: D,
        urc_matcher: M,
        config: Config,
    ) -> (
        Ingress<'a, D, M, U, INGRESS_BUF_SIZE, URC_CAPACITY, URC_SUBSCRIBERS>,
        ChatClient<'a, W, INGRESS_BUF_SIZE>,
    ) {
        (
            Ingress::new(
                digester,
                urc_matcher,
                &self.res_slot,
                &self.urc_channel,
                &self.active,
            ),
            ChatClient::new(writer, &self.res_slot, &self.active, config),
        )
    }

    /// Subscribe to unsolicited notifications on this channel.
    pub fn urc_subscription(
        &self,
    ) -> Result<UrcSubscription<'_, U, URC_CAPACITY, URC_SUBSCRIBERS>, SubscribeError> {
        self.urc_channel.subscribe()
    }
}

impl<
        U: AtUrc,
        const INGRESS_BUF_SIZE: usize,
        const URC_CAPACITY: usize,
        const URC_SUBSCRIBERS: usize,
    > Default for ChatBuffers<U, INGRESS_BUF_SIZE, URC_CAPACITY, URC_SUBSCRIBERS>
{
    fn default() -> Self {
        Self::new()
    }
}
