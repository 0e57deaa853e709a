//! Single-producer/single-consumer queue of copied events.
//!
//! The audio thread pushes by value into a preallocated ring; a control
//! thread pops later. Nothing points back into audio-thread buffers, so the
//! reader may run after those buffers have been reused.

use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};

/// Producer side, owned by the audio thread.
pub struct OutboxSender<T> {
    producer: HeapProd<T>,
}

impl<T: Copy> OutboxSender<T> {
    /// Returns `false` if the ring is full. Never allocates.
    #[inline]
    pub fn push(&mut self, event: T) -> bool {
        self.producer.try_push(event).is_ok()
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.producer.vacant_len()
    }
}

/// Consumer side, owned by a control thread.
pub struct OutboxReceiver<T> {
    consumer: HeapCons<T>,
}

impl<T: Copy> OutboxReceiver<T> {
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.consumer.try_pop()
    }

    pub fn drain_all(&mut self) -> Vec<T> {
        let mut events = Vec::with_capacity(self.consumer.occupied_len());
        while let Some(event) = self.consumer.try_pop() {
            events.push(event);
        }
        events
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.consumer.is_empty()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.consumer.occupied_len()
    }
}

pub fn outbox<T: Copy>(capacity: usize) -> (OutboxSender<T>, OutboxReceiver<T>) {
    let (producer, consumer) = HeapRb::new(capacity).split();
    (OutboxSender { producer }, OutboxReceiver { consumer })
}
