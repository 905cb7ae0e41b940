use crate::midi::{EventListener, KeyEvent, PitchEvent};

mod activated_notes;
pub use activated_notes::*;

/// A straightforward representation of the note and pitch events a [`Dispatcher`][crate::midi::Dispatcher] has
/// published.
///
/// Register it as a listener and read it back between dispatches to decide what the oscillator should play. Some data
/// are represented in more convenient formats than those in which they were received:
/// - When a key is pressed, its note is added to a list; when released, it is dropped from the list. Release
///   velocities are not kept.
/// - Pitch bend is stored as the frequency ratio the dispatcher computed, not as the raw 14-bit value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MidiState {
    /// Holds a representation of notes which are currently activated.
    pub activated_notes: ActivatedNotes,
    /// The most recent pitch bend; no bend until one is received.
    pub pitch_bend: PitchEvent,
}

impl MidiState {
    /// Returns `frequency` bent by the most recent pitch bend.
    pub fn bend(&self, frequency: f32) -> f32 {
        self.pitch_bend.apply(frequency)
    }
}

impl EventListener for MidiState {
    fn on_key_event(&mut self, event: KeyEvent) {
        if event.is_pressed() {
            self.activated_notes.add(event);
        } else {
            self.activated_notes.remove(event.note());
        }
    }

    fn on_pitch_event(&mut self, event: PitchEvent) {
        self.pitch_bend = event;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiHandler;
    use approx::assert_abs_diff_eq;
    use wmidi::Note;

    #[test]
    fn tracks_notes_and_bend() {
        let mut state = MidiState::default();
        {
            let mut handler = MidiHandler::<16, 1>::new();
            handler.register(&mut state).ok();
            handler.set_semitones_to_pitch_bend(12);
            handler.process_bytes(&[0x90, 60, 100, 64, 90, 0x80, 60, 0, 0xE0, 127, 127]);
            handler.dispatch_events();
        }

        assert_eq!(Some(Note::E4), state.activated_notes.last());
        assert_eq!(1, state.activated_notes.iter().count());
        assert_abs_diff_eq!(880.0, state.bend(440.0), epsilon = 1e-2);
    }

    #[test]
    fn default_is_silent_and_unbent() {
        let state = MidiState::default();
        assert!(state.activated_notes.is_empty());
        assert_eq!(440.0, state.bend(440.0));
    }
}
