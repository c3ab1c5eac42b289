/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

pub(crate) type ByteTap = Box<dyn FnMut(&[u8]) + Send>;

/// Identifies one registered tap so the owner that attached it can later
/// detach exactly that tap and no other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TapId(u64);

/// An ordered list of byte observers.
///
/// Taps are notified in registration order and are side-effect only; they
/// cannot alter or consume the observed bytes.
#[derive(Default)]
pub(crate) struct ByteTapList {
    next_id: u64,
    taps: Vec<(u64, ByteTap)>,
}

impl ByteTapList {
    pub(crate) fn add(&mut self, tap: ByteTap) -> TapId {
        let id = self.next_id;
        self.next_id += 1;
        self.taps.push((id, tap));
        TapId(id)
    }

    pub(crate) fn remove(&mut self, id: TapId) {
        self.taps.retain(|(tap_id, _)| *tap_id != id.0);
    }

    pub(crate) fn notify(&mut self, data: &[u8]) {
        for (_, tap) in self.taps.iter_mut() {
            tap(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn notify_and_remove() {
        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));

        let mut taps = ByteTapList::default();
        let a = seen_a.clone();
        let id_a = taps.add(Box::new(move |data| {
            a.fetch_add(data.len(), Ordering::Relaxed);
        }));
        let b = seen_b.clone();
        let _id_b = taps.add(Box::new(move |data| {
            b.fetch_add(data.len(), Ordering::Relaxed);
        }));

        taps.notify(b"1234");
        assert_eq!(seen_a.load(Ordering::Relaxed), 4);
        assert_eq!(seen_b.load(Ordering::Relaxed), 4);

        taps.remove(id_a);
        taps.notify(b"12");
        assert_eq!(seen_a.load(Ordering::Relaxed), 4);
        assert_eq!(seen_b.load(Ordering::Relaxed), 6);
    }
}
