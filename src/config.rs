use embassy_time::Duration;

/// Configuration shared by the chat client and the ingress half.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    pub(crate) response_timeout: Duration,
    pub(crate) cmd_cooldown: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(5),
            cmd_cooldown: Duration::from_millis(20),
        }
    }
}

impl Config {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            response_timeout: Duration::from_secs(5),
            cmd_cooldown: Duration::from_millis(20),
        }
    }

    /// Deadline for the terminal response of a single command.
    ///
    /// Commands known to outlive this (dialing, network attach) should go
    /// through [`crate::Chat::chat_with_timeout`] instead.
    #[must_use]
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Quiet period between the completion of one command and the write of
    /// the next. Some modems drop input immediately after a terminal code.
    #[must_use]
    pub const fn cmd_cooldown(mut self, cooldown: Duration) -> Self {
        self.cmd_cooldown = cooldown;
        self
    }
}
