use super::{Decoder, Dispatcher, EventBuffer, EventListener, ListenerCapacityError, MidiEvent};
use crate::configuration::{DEFAULT_EVENT_BUFFER_SLOTS, DEFAULT_LISTENER_SLOTS};

/// Owns a [`Decoder`], the [`EventBuffer`] it fills and the [`Dispatcher`] that drains it.
///
/// [`process_byte`](Self::process_byte) is meant to be called for every received byte (from a UART interrupt, say)
/// and [`dispatch_events`](Self::dispatch_events) from a control-rate tick. Both take `&mut self`; when they run in
/// different contexts the handler has to live behind a mutex or critical section.
pub struct MidiHandler<
    'a,
    const N: usize = DEFAULT_EVENT_BUFFER_SLOTS,
    const L: usize = DEFAULT_LISTENER_SLOTS,
> {
    buffer: EventBuffer<N>,
    decoder: Decoder,
    dispatcher: Dispatcher<'a, L>,
}

impl<const N: usize, const L: usize> Default for MidiHandler<'_, N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize, const L: usize> MidiHandler<'a, N, L> {
    /// Constructs a [`MidiHandler`] with an empty buffer and no listeners.
    pub fn new() -> Self {
        Self::with_dispatcher(Dispatcher::new())
    }

    /// Constructs a [`MidiHandler`] around an already configured [`Dispatcher`].
    pub fn with_dispatcher(dispatcher: Dispatcher<'a, L>) -> Self {
        Self {
            buffer: EventBuffer::new(),
            decoder: Decoder::new(),
            dispatcher,
        }
    }

    /// See [`Dispatcher::register`].
    pub fn register(
        &mut self,
        listener: &'a mut dyn EventListener,
    ) -> Result<(), ListenerCapacityError> {
        self.dispatcher.register(listener)
    }

    /// Feeds one received byte to the decoder.
    pub fn process_byte(&mut self, byte: u8) {
        self.decoder.process_byte(byte, &mut self.buffer);
    }

    /// Feeds a run of received bytes to the decoder, in order.
    pub fn process_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.process_byte(byte);
        }
    }

    /// Publishes every complete message received so far.
    pub fn dispatch_events(&mut self) {
        self.dispatcher.dispatch_events(&mut self.buffer);
    }

    /// Takes the oldest complete message without publishing it, for callers that poll instead of listening.
    pub fn next_midi_message(&mut self) -> Option<MidiEvent> {
        self.buffer.pop()
    }

    /// See [`Dispatcher::set_semitones_to_pitch_bend`].
    pub fn set_semitones_to_pitch_bend(&mut self, semitones: u32) {
        self.dispatcher.set_semitones_to_pitch_bend(semitones);
    }

    /// See [`Dispatcher::semitones_to_pitch_bend`].
    pub fn semitones_to_pitch_bend(&self) -> u32 {
        self.dispatcher.semitones_to_pitch_bend()
    }

    /// Getter.
    pub fn buffer(&self) -> &EventBuffer<N> {
        &self.buffer
    }

    /// Getter.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}
