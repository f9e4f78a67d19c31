// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The in-process fabric: a full channel mesh between ranks living on
//! threads of one OS process.
//!
//! Every ordered `(source, destination)` pair gets one unbounded channel
//! per lane (the six protocol tags plus internal lanes for the
//! collectives), so a probe is an `is_empty` check, per-pair FIFO order
//! is the channel's own guarantee, and distinct tags never interfere.
//! Sends are therefore complete the moment they are posted; all waiting
//! happens on the receive side, where the collectives poll with a short
//! sleep and honor the cancellation flag.

use crate::fabric::{Envelope, Fabric, FabricError, Tag};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Internal lane carrying broadcast rounds.
const BCAST_LANE: usize = Tag::COUNT;
/// Internal lane carrying all-gather contributions.
const GATHER_LANE: usize = Tag::COUNT + 1;
/// Internal lane carrying barrier arrivals.
const BARRIER_LANE: usize = Tag::COUNT + 2;
/// Total channel lanes per ordered rank pair.
const LANES: usize = Tag::COUNT + 3;

/// Sleep between polls while waiting inside a collective.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One rank's endpoint of an in-process channel mesh.
#[derive(Debug)]
pub struct LocalFabric {
    rank: usize,
    size: usize,
    /// `senders[lane][dest]`
    senders: Vec<Vec<Sender<Envelope>>>,
    /// `receivers[lane][source]`
    receivers: Vec<Vec<Receiver<Envelope>>>,
}

impl LocalFabric {
    /// Builds a fully connected mesh of `size` ranks and returns one
    /// endpoint per rank, in rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn mesh(size: usize) -> Vec<LocalFabric> {
        assert!(size > 0, "called `LocalFabric::mesh` with zero ranks");

        // channel_txs[source][lane][dest] / channel_rxs[dest][lane][source]
        let mut channel_txs: Vec<Vec<Vec<Option<Sender<Envelope>>>>> =
            vec![vec![vec![None; size]; LANES]; size];
        let mut channel_rxs: Vec<Vec<Vec<Option<Receiver<Envelope>>>>> =
            vec![vec![vec![None; size]; LANES]; size];

        for lane in 0..LANES {
            for source in 0..size {
                for dest in 0..size {
                    let (tx, rx) = unbounded();
                    channel_txs[source][lane][dest] = Some(tx);
                    channel_rxs[dest][lane][source] = Some(rx);
                }
            }
        }

        channel_txs
            .into_iter()
            .zip(channel_rxs)
            .enumerate()
            .map(|(rank, (txs, rxs))| LocalFabric {
                rank,
                size,
                senders: txs
                    .into_iter()
                    .map(|lane| lane.into_iter().map(Option::unwrap).collect())
                    .collect(),
                receivers: rxs
                    .into_iter()
                    .map(|lane| lane.into_iter().map(Option::unwrap).collect())
                    .collect(),
            })
            .collect()
    }

    fn send_lane(&self, lane: usize, dest: usize, envelope: Envelope) -> Result<(), FabricError> {
        self.senders[lane][dest]
            .send(envelope)
            .map_err(|_| FabricError::Disconnected { peer: dest })
    }

    fn try_recv_lane(
        &self,
        lane: usize,
        source: usize,
    ) -> Result<Option<Envelope>, FabricError> {
        match self.receivers[lane][source].try_recv() {
            Ok(envelope) => Ok(Some(envelope)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(FabricError::Disconnected { peer: source }),
        }
    }

    /// Polls a lane until a message arrives or `cancel` is raised.
    fn poll_lane(
        &self,
        lane: usize,
        source: usize,
        cancel: &AtomicBool,
    ) -> Result<Option<Envelope>, FabricError> {
        loop {
            if let Some(envelope) = self.try_recv_lane(lane, source)? {
                return Ok(Some(envelope));
            }
            if cancel.load(Ordering::Relaxed) {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Fabric for LocalFabric {
    #[inline]
    fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: usize, tag: Tag, envelope: Envelope) -> Result<(), FabricError> {
        self.send_lane(tag.lane(), dest, envelope)
    }

    fn try_probe(&self, tag: Tag) -> Option<usize> {
        let lane = tag.lane();
        (0..self.size).find(|&source| !self.receivers[lane][source].is_empty())
    }

    fn try_recv(&self, source: usize, tag: Tag) -> Result<Option<Envelope>, FabricError> {
        self.try_recv_lane(tag.lane(), source)
    }

    fn broadcast_int(
        &self,
        root: usize,
        value: i32,
        cancel: &AtomicBool,
    ) -> Result<Option<i32>, FabricError> {
        if self.rank == root {
            for dest in 0..self.size {
                self.send_lane(BCAST_LANE, dest, Envelope::Int(value))?;
            }
        }
        match self.poll_lane(BCAST_LANE, root, cancel)? {
            None => Ok(None),
            Some(Envelope::Int(v)) => Ok(Some(v)),
            Some(other) => unreachable!("broadcast lane carries ints, got {:?}", other),
        }
    }

    fn all_gather_word(
        &self,
        value: u16,
        cancel: &AtomicBool,
    ) -> Result<Option<Vec<u16>>, FabricError> {
        for dest in 0..self.size {
            self.send_lane(GATHER_LANE, dest, Envelope::Word(value))?;
        }
        let mut gathered = vec![0u16; self.size];
        for source in 0..self.size {
            match self.poll_lane(GATHER_LANE, source, cancel)? {
                None => return Ok(None),
                Some(Envelope::Word(word)) => gathered[source] = word,
                Some(other) => unreachable!("gather lane carries words, got {:?}", other),
            }
        }
        Ok(Some(gathered))
    }

    fn barrier(&self) -> Result<(), FabricError> {
        for dest in 0..self.size {
            self.send_lane(BARRIER_LANE, dest, Envelope::Word(0))?;
        }
        // Arrivals cannot be canceled; a dead peer surfaces as a
        // disconnection error rather than a hang.
        let never = AtomicBool::new(false);
        for source in 0..self.size {
            self.poll_lane(BARRIER_LANE, source, &never)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_shape() {
        let mesh = LocalFabric::mesh(3);
        assert_eq!(mesh.len(), 3);
        for (i, endpoint) in mesh.iter().enumerate() {
            assert_eq!(endpoint.rank(), i);
            assert_eq!(endpoint.size(), 3);
        }
    }

    #[test]
    fn test_send_probe_recv() {
        let mesh = LocalFabric::mesh(2);
        mesh[0]
            .send(1, Tag::Idle, Envelope::Int(1))
            .expect("send succeeds");

        assert_eq!(mesh[1].try_probe(Tag::Idle), Some(0));
        assert_eq!(mesh[1].try_probe(Tag::WorkRequest), None);

        let envelope = mesh[1].try_recv(0, Tag::Idle).unwrap().unwrap();
        assert_eq!(envelope.as_int(), Some(1));
        assert_eq!(mesh[1].try_probe(Tag::Idle), None);
    }

    #[test]
    fn test_tags_do_not_interfere() {
        let mesh = LocalFabric::mesh(2);
        mesh[0].send(1, Tag::WorkResponse, Envelope::Int(7)).unwrap();
        mesh[0]
            .send(1, Tag::WorkStealing, Envelope::Bytes(vec![1, 2, 3]))
            .unwrap();

        let stolen = mesh[1].try_recv(0, Tag::WorkStealing).unwrap().unwrap();
        assert_eq!(stolen.into_bytes(), Some(vec![1, 2, 3]));
        let response = mesh[1].try_recv(0, Tag::WorkResponse).unwrap().unwrap();
        assert_eq!(response.as_int(), Some(7));
    }

    #[test]
    fn test_per_pair_fifo_order() {
        let mesh = LocalFabric::mesh(2);
        for v in 0..5 {
            mesh[0].send(1, Tag::Idle, Envelope::Int(v)).unwrap();
        }
        for v in 0..5 {
            let envelope = mesh[1].try_recv(0, Tag::Idle).unwrap().unwrap();
            assert_eq!(envelope.as_int(), Some(v));
        }
    }

    #[test]
    fn test_broadcast_reaches_all_ranks() {
        let mesh = LocalFabric::mesh(3);
        let cancel = AtomicBool::new(false);
        let cancel = &cancel;

        std::thread::scope(|scope| {
            let handles: Vec<_> = mesh
                .iter()
                .map(|endpoint| {
                    scope.spawn(move || endpoint.broadcast_int(0, 42, cancel).unwrap().unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 42);
            }
        });
    }

    #[test]
    fn test_all_gather_collects_in_rank_order() {
        let mesh = LocalFabric::mesh(4);
        let cancel = AtomicBool::new(false);
        let cancel = &cancel;

        std::thread::scope(|scope| {
            let handles: Vec<_> = mesh
                .iter()
                .map(|endpoint| {
                    let value = (endpoint.rank() * 10) as u16;
                    scope.spawn(move || endpoint.all_gather_word(value, cancel).unwrap().unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), vec![0, 10, 20, 30]);
            }
        });
    }

    #[test]
    fn test_barrier_synchronizes_all_ranks() {
        let mesh = LocalFabric::mesh(3);
        std::thread::scope(|scope| {
            for endpoint in &mesh {
                scope.spawn(move || endpoint.barrier().unwrap());
            }
        });
    }

    #[test]
    fn test_collective_cancellation_returns_none() {
        // Rank 1 never enters the gather; rank 0 must come back with None
        // once the flag is raised.
        let mesh = LocalFabric::mesh(2);
        let cancel = AtomicBool::new(false);

        std::thread::scope(|scope| {
            let endpoint = &mesh[0];
            let cancel_ref = &cancel;
            let handle = scope.spawn(move || endpoint.all_gather_word(3, cancel_ref).unwrap());
            std::thread::sleep(Duration::from_millis(20));
            cancel.store(true, Ordering::Relaxed);
            assert_eq!(handle.join().unwrap(), None);
        });
    }
}
