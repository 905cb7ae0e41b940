use super::{KeyEvent, MidiEvent, PitchEvent};

/// Receives the events published by a [`Dispatcher`][super::Dispatcher].
///
/// Every method has an empty default body, so a listener only implements the events it cares about. Calls are made
/// synchronously from [`dispatch_events`][super::Dispatcher::dispatch_events], in registration order, and must not
/// block.
pub trait EventListener {
    /// Called for every message, before it is classified.
    fn on_midi_event(&mut self, _event: &MidiEvent) {}

    /// Called after [`on_midi_event`](Self::on_midi_event) for Note On and Note Off messages.
    fn on_key_event(&mut self, _event: KeyEvent) {}

    /// Called after [`on_midi_event`](Self::on_midi_event) for Pitch Bend messages.
    fn on_pitch_event(&mut self, _event: PitchEvent) {}
}

/// Returned when registering a listener with a [`Dispatcher`][super::Dispatcher] that has no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("all {capacity} listener slots are taken")]
pub struct ListenerCapacityError {
    /// How many listeners the dispatcher holds.
    pub capacity: usize,
}
