//! Push channel state, shared lock-free between the channel task and its handle

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a single push channel instance.
///
/// `Connecting -> Open -> Receiving`, with `Failed` reachable from any of
/// the first three and `Closed` reached only through an intentional close.
/// `Failed` and `Closed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    Connecting = 0,
    /// Connection established and subscribe frame sent
    Open = 1,
    /// At least one snapshot delivered
    Receiving = 2,
    Failed = 3,
    Closed = 4,
}

impl ChannelState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ChannelState::Connecting,
            1 => ChannelState::Open,
            2 => ChannelState::Receiving,
            3 => ChannelState::Failed,
            _ => ChannelState::Closed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelState::Failed | ChannelState::Closed)
    }

    /// Open or receiving
    pub fn is_live(&self) -> bool {
        matches!(self, ChannelState::Open | ChannelState::Receiving)
    }
}

/// Atomic wrapper around [`ChannelState`]
#[derive(Debug)]
pub struct AtomicChannelState {
    inner: AtomicU8,
}

impl AtomicChannelState {
    pub fn new(state: ChannelState) -> Self {
        Self {
            inner: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ChannelState {
        ChannelState::from_u8(self.inner.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ChannelState) {
        self.inner.store(state as u8, Ordering::Release);
    }
}
