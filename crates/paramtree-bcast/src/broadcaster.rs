//! The broadcast primitive consumed by the collective build.

use bytes::{Buf, BufMut};
use tracing::trace;

use crate::error::{BroadcastError, BroadcastResult};

/// Size of the length prefix sent ahead of a string payload.
pub const LENGTH_PREFIX: usize = 4;

/// A one-to-all broadcast among a fixed group of participants.
///
/// Every participant calls [`broadcast`](Self::broadcast) with the same
/// `root` and a buffer of the same length. On return, every buffer holds
/// the root's bytes.
pub trait Broadcaster {
    /// Broadcast `buf` from `root` to every participant. `me` is the
    /// caller's rank.
    fn broadcast(&mut self, buf: &mut [u8], me: usize, root: usize) -> BroadcastResult<()>;

    /// Broadcast a string: a little-endian `u32` length, then the bytes.
    ///
    /// The root's `text` is sent unchanged; every other participant's
    /// `text` is replaced by what the root sent.
    fn broadcast_string(&mut self, text: &mut String, me: usize, root: usize) -> BroadcastResult<()> {
        let mut header = [0u8; LENGTH_PREFIX];
        if me == root {
            let len = u32::try_from(text.len()).map_err(|_| BroadcastError::PayloadTooLarge { len: text.len() })?;
            (&mut header[..]).put_u32_le(len);
        }
        self.broadcast(&mut header, me, root)?;

        let len = (&header[..]).get_u32_le() as usize;
        trace!(rank = me, root, len, "broadcast length prefix");

        if me == root {
            let mut payload = text.as_bytes().to_vec();
            return self.broadcast(&mut payload, me, root);
        }

        let mut payload = vec![0u8; len];
        self.broadcast(&mut payload, me, root)?;
        *text = String::from_utf8(payload).map_err(|_| BroadcastError::InvalidUtf8)?;
        Ok(())
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for &mut B {
    fn broadcast(&mut self, buf: &mut [u8], me: usize, root: usize) -> BroadcastResult<()> {
        (**self).broadcast(buf, me, root)
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for Box<B> {
    fn broadcast(&mut self, buf: &mut [u8], me: usize, root: usize) -> BroadcastResult<()> {
        (**self).broadcast(buf, me, root)
    }
}

/// Broadcaster for a group of one. Every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloBroadcaster;

impl Broadcaster for SoloBroadcaster {
    fn broadcast(&mut self, _buf: &mut [u8], me: usize, root: usize) -> BroadcastResult<()> {
        if me == 0 && root == 0 {
            Ok(())
        } else {
            Err(BroadcastError::transport(format!(
                "single-participant group has no rank {}",
                me.max(root)
            )))
        }
    }
}
