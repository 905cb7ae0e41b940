use super::MidiEvent;
use crate::configuration::DEFAULT_EVENT_BUFFER_SLOTS;

/// A fixed-capacity ring of complete [`MidiEvent`]s, filled by one producer (the [`Decoder`][super::Decoder]) and
/// drained by one consumer (the [`Dispatcher`][super::Dispatcher]).
///
/// Only finished messages are ever [pushed](Self::push); the decoder assembles the message in flight in its own state.
/// Readable messages lie between the read cursor (inclusive) and the write cursor (exclusive), and the buffer is empty
/// exactly when the two are equal, so one slot always stays free.
///
/// The buffer never grows and never pushes back. When a push would make the write cursor catch up with the read
/// cursor, the oldest unread message is dropped, so at most `N - 1` messages are readable at once and they are always
/// the most recent ones.
///
/// Both cursors are plain indices mutated through `&mut self`; sharing a buffer between an interrupt and a task
/// requires a critical section around each access.
#[derive(Clone, Debug)]
pub struct EventBuffer<const N: usize = DEFAULT_EVENT_BUFFER_SLOTS> {
    slots: [MidiEvent; N],
    /// Index of the next slot to write; advanced only by [`push`](Self::push).
    write: usize,
    /// Index of the oldest readable message.
    read: usize,
}

impl<const N: usize> Default for EventBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventBuffer<N> {
    const AT_LEAST_TWO_SLOTS: () = assert!(
        N >= 2,
        "an event buffer needs a free slot plus one readable slot"
    );

    /// Constructs an empty [`EventBuffer`]. Fails to compile for `N < 2`.
    pub const fn new() -> Self {
        let () = Self::AT_LEAST_TWO_SLOTS;
        Self {
            slots: [MidiEvent::EMPTY; N],
            write: 0,
            read: 0,
        }
    }

    /// The number of messages that can wait to be read before the oldest is overwritten.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of complete messages waiting to be read.
    pub fn len(&self) -> usize {
        (self.write + N - self.read) % N
    }

    /// Returns `true` if no complete message is waiting.
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Appends a complete message, dropping the oldest unread message if the buffer was full.
    pub fn push(&mut self, event: MidiEvent) {
        #[cfg(feature = "defmt")]
        defmt::trace!("Buffering MIDI message {}", event);

        self.slots[self.write] = event;
        self.write = (self.write + 1) % N;
        if self.write == self.read {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "Event buffer full, overwriting unread message {}",
                self.slots[self.read]
            );
            self.read = (self.read + 1) % N;
        }
    }

    /// Removes and returns the oldest complete message, or `None` if there is none.
    pub fn pop(&mut self) -> Option<MidiEvent> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.read];
        self.read = (self.read + 1) % N;
        Some(event)
    }
}
