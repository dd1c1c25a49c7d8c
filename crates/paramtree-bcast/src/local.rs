//! In-process broadcast group.
//!
//! [`LocalGroup::new`] returns one [`LocalBroadcaster`] per participant.
//! Each handle is moved to its own thread; the handles rendezvous on a
//! shared slot guarded by a `parking_lot` mutex and condition variable.
//!
//! Rounds are strictly ordered: the root of round `n + 1` waits until every
//! peer has copied round `n` out of the slot.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::broadcaster::Broadcaster;
use crate::error::{BroadcastError, BroadcastResult};

#[derive(Debug, Default)]
struct Round {
    published: u64,
    root: usize,
    payload: Option<Vec<u8>>,
    remaining: usize,
    aborted: bool,
}

#[derive(Debug)]
struct Shared {
    size: usize,
    round: Mutex<Round>,
    changed: Condvar,
}

/// Factory for an in-process broadcast group.
#[derive(Debug, Clone, Copy)]
pub struct LocalGroup;

impl LocalGroup {
    /// Create a group of `size` participants, ranked `0..size`.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(size: usize) -> Vec<LocalBroadcaster> {
        let shared = Arc::new(Shared {
            size,
            round: Mutex::new(Round::default()),
            changed: Condvar::new(),
        });
        (0..size)
            .map(|rank| LocalBroadcaster {
                rank,
                shared: Arc::clone(&shared),
                rounds: 0,
            })
            .collect()
    }
}

/// One participant's handle on a [`LocalGroup`].
#[derive(Debug)]
pub struct LocalBroadcaster {
    rank: usize,
    shared: Arc<Shared>,
    rounds: u64,
}

impl LocalBroadcaster {
    /// This participant's rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of participants in the group.
    pub fn size(&self) -> usize {
        self.shared.size
    }

    /// Abort the group: every pending and future broadcast on any handle
    /// fails with [`BroadcastError::Transport`].
    ///
    /// The collective build never calls this itself; a caller that sees one
    /// participant fail uses it to release the others.
    pub fn abort(&self) {
        let mut round = self.shared.round.lock();
        round.aborted = true;
        self.shared.changed.notify_all();
    }

    fn aborted() -> BroadcastError {
        BroadcastError::transport("broadcast group aborted")
    }

    fn publish(&mut self, buf: &[u8], root: usize, target: u64) -> BroadcastResult<()> {
        let mut round = self.shared.round.lock();
        while !round.aborted && round.payload.is_some() {
            self.shared.changed.wait(&mut round);
        }
        if round.aborted {
            return Err(Self::aborted());
        }

        round.published = target;
        round.root = root;
        round.remaining = self.shared.size - 1;
        round.payload = (round.remaining > 0).then(|| buf.to_vec());
        trace!(rank = self.rank, round = target, bytes = buf.len(), "published broadcast round");
        self.shared.changed.notify_all();
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], root: usize, target: u64) -> BroadcastResult<()> {
        let mut round = self.shared.round.lock();
        while !round.aborted && !(round.published == target && round.payload.is_some()) {
            self.shared.changed.wait(&mut round);
        }
        if round.aborted {
            return Err(Self::aborted());
        }

        let result = match &round.payload {
            Some(_) if round.root != root => Err(BroadcastError::transport(format!(
                "rank {} expected root {root}, round was sent by {}",
                self.rank, round.root
            ))),
            Some(payload) if payload.len() != buf.len() => Err(BroadcastError::LengthMismatch {
                expected: payload.len(),
                received: buf.len(),
            }),
            Some(payload) => {
                buf.copy_from_slice(payload);
                Ok(())
            }
            None => Err(Self::aborted()),
        };

        round.remaining -= 1;
        if round.remaining == 0 {
            round.payload = None;
            self.shared.changed.notify_all();
        }
        trace!(rank = self.rank, round = target, "received broadcast round");
        result
    }
}

impl Broadcaster for LocalBroadcaster {
    fn broadcast(&mut self, buf: &mut [u8], me: usize, root: usize) -> BroadcastResult<()> {
        if me != self.rank {
            return Err(BroadcastError::transport(format!(
                "handle for rank {} used as rank {me}",
                self.rank
            )));
        }
        if root >= self.shared.size {
            return Err(BroadcastError::transport(format!(
                "root {root} outside group of {}",
                self.shared.size
            )));
        }

        self.rounds += 1;
        if me == root {
            self.publish(buf, root, self.rounds)
        } else {
            self.receive(buf, root, self.rounds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_every_peer_receives_every_round() {
        let group = LocalGroup::new(4);
        let results: Vec<Vec<[u8; 2]>> = thread::scope(|s| {
            let handles: Vec<_> = group
                .into_iter()
                .map(|mut bcast| {
                    s.spawn(move || {
                        let me = bcast.rank();
                        (0..3u8)
                            .map(|n| {
                                let mut buf = if me == 0 { [n, n + 10] } else { [0, 0] };
                                bcast.broadcast(&mut buf, me, 0).unwrap();
                                buf
                            })
                            .collect()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for received in results {
            assert_eq!(received, vec![[0, 10], [1, 11], [2, 12]]);
        }
    }

    #[test]
    fn test_single_participant_never_blocks() {
        let mut group = LocalGroup::new(1);
        let mut buf = [1, 2, 3];
        group[0].broadcast(&mut buf, 0, 0).unwrap();
        group[0].broadcast(&mut buf, 0, 0).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_wrong_rank_and_root() {
        let mut group = LocalGroup::new(2);
        assert!(group[0].broadcast(&mut [0], 1, 0).is_err());
        assert!(group[0].broadcast(&mut [0], 0, 2).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let group = LocalGroup::new(2);
        let outcome = thread::scope(|s| {
            let mut it = group.into_iter();
            let mut root = it.next().unwrap();
            let mut peer = it.next().unwrap();
            s.spawn(move || root.broadcast(&mut [1, 2, 3], 0, 0).unwrap());
            s.spawn(move || peer.broadcast(&mut [0, 0], 1, 0)).join().unwrap()
        });
        assert!(matches!(
            outcome,
            Err(BroadcastError::LengthMismatch {
                expected: 3,
                received: 2
            })
        ));
    }

    #[test]
    fn test_abort_releases_waiting_peer() {
        let group = LocalGroup::new(2);
        let outcome = thread::scope(|s| {
            let mut it = group.into_iter();
            let root = it.next().unwrap();
            let mut peer = it.next().unwrap();
            let waiting = s.spawn(move || peer.broadcast(&mut [0], 1, 0));
            root.abort();
            waiting.join().unwrap()
        });
        assert!(matches!(outcome, Err(BroadcastError::Transport(_))));
    }
}
