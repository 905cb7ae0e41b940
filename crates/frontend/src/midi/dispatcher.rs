use super::{
    EventBuffer, EventListener, KeyEvent, KeyState, ListenerCapacityError, MessageKind, MidiEvent,
    PITCH_BEND_MAX, PitchEvent,
};
use crate::configuration::{DEFAULT_LISTENER_SLOTS, DEFAULT_SEMITONES_TO_PITCH_BEND};
use num_traits::Float;
use tinyvec::{ArrayVec, array_vec};

/// Converts a 14-bit pitch-bend value into a frequency ratio.
///
/// The value is normalized to `-1.0..=1.0` (`0` is a full bend down, `16383` a full bend up) and scaled
/// exponentially, so a full bend moves the pitch by exactly `semitones` equal-tempered semitones. Because the
/// normalization divides by 16383, the centre value 8192 lands a hair above 0 and produces a ratio within a few
/// millionths of 1.0 per semitone of range.
pub fn pitch_bend_factor(value: u16, semitones: u32) -> f32 {
    let normalized = (f32::from(value) / f32::from(PITCH_BEND_MAX)) * 2.0 - 1.0;
    2.0_f32.powf(normalized * semitones as f32 / 12.0)
}

/// Drains an [`EventBuffer`] and publishes what it finds to a fixed set of [`EventListener`]s.
///
/// Listeners are borrowed for the lifetime of the dispatcher rather than registered in any global table, and are
/// always called in the order they were added.
pub struct Dispatcher<'a, const L: usize = DEFAULT_LISTENER_SLOTS> {
    listeners: ArrayVec<[Option<&'a mut dyn EventListener>; L]>,
    semitones_to_pitch_bend: u32,
}

impl<const L: usize> Default for Dispatcher<'_, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const L: usize> Dispatcher<'a, L> {
    /// Constructs a [`Dispatcher`] with no listeners and the default pitch-bend range.
    pub fn new() -> Self {
        Self {
            listeners: array_vec!(),
            semitones_to_pitch_bend: DEFAULT_SEMITONES_TO_PITCH_BEND,
        }
    }

    /// Adds a listener after those already registered. Meant to be called during setup, not from real-time code.
    pub fn register(
        &mut self,
        listener: &'a mut dyn EventListener,
    ) -> Result<(), ListenerCapacityError> {
        match self.listeners.try_push(Some(listener)) {
            None => Ok(()),
            Some(_) => Err(ListenerCapacityError { capacity: L }),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Sets how many semitones a full pitch bend moves the pitch, in either direction.
    pub fn set_semitones_to_pitch_bend(&mut self, semitones: u32) {
        self.semitones_to_pitch_bend = semitones;
    }

    /// Returns how many semitones a full pitch bend moves the pitch.
    pub fn semitones_to_pitch_bend(&self) -> u32 {
        self.semitones_to_pitch_bend
    }

    /// Publishes every complete message waiting in `buffer`, oldest first, returning once it is empty.
    pub fn dispatch_events<const N: usize>(&mut self, buffer: &mut EventBuffer<N>) {
        while let Some(event) = buffer.pop() {
            self.dispatch(&event);
        }
    }

    /// Publishes a single message: first as-is, then as a typed event if it is a note or a pitch bend.
    pub fn dispatch(&mut self, event: &MidiEvent) {
        self.publish(|listener| listener.on_midi_event(event));

        match event.kind() {
            MessageKind::PitchBend => {
                let value = event.pitch_bend_value().unwrap_or_default();
                let pitch_event =
                    PitchEvent::new(pitch_bend_factor(value, self.semitones_to_pitch_bend));
                #[cfg(feature = "defmt")]
                defmt::trace!("Pitch bend {} -> {}", value, pitch_event);
                self.publish(|listener| listener.on_pitch_event(pitch_event));
            }
            MessageKind::NoteOn => {
                let key_event =
                    KeyEvent::new(KeyState::Pressed, event.data_byte(1), event.data_byte(2));
                self.publish(|listener| listener.on_key_event(key_event));
            }
            MessageKind::NoteOff => {
                let key_event =
                    KeyEvent::new(KeyState::Released, event.data_byte(1), event.data_byte(2));
                self.publish(|listener| listener.on_key_event(key_event));
            }
            _ => {}
        }
    }

    fn publish(&mut self, mut deliver: impl FnMut(&mut (dyn EventListener + 'a))) {
        for listener in self.listeners.iter_mut().flatten() {
            deliver(&mut **listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::test_support::{Published, Recorder};
    use approx::assert_abs_diff_eq;
    use core::cell::Cell;

    #[test]
    fn pitch_bend_centre_is_no_bend() {
        for semitones in [1, 2, 12, 24] {
            assert_abs_diff_eq!(1.0, pitch_bend_factor(8192, semitones), epsilon = 1e-3);
        }
    }

    #[test]
    fn pitch_bend_extremes() {
        assert_abs_diff_eq!(
            1.122_462,
            pitch_bend_factor(PITCH_BEND_MAX, 2),
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(0.890_899, pitch_bend_factor(0, 2), epsilon = 1e-5);
        assert_abs_diff_eq!(2.0, pitch_bend_factor(PITCH_BEND_MAX, 12), epsilon = 1e-5);
        assert_abs_diff_eq!(0.5, pitch_bend_factor(0, 12), epsilon = 1e-5);
    }

    #[test]
    fn zero_range_never_bends() {
        assert_eq!(1.0, pitch_bend_factor(0, 0));
        assert_eq!(1.0, pitch_bend_factor(PITCH_BEND_MAX, 0));
    }

    #[test]
    fn default_range_is_one_semitone() {
        let dispatcher = Dispatcher::<1>::new();
        assert_eq!(1, dispatcher.semitones_to_pitch_bend());
    }

    #[test]
    fn set_range() {
        let mut dispatcher = Dispatcher::<1>::new();
        dispatcher.set_semitones_to_pitch_bend(7);
        assert_eq!(7, dispatcher.semitones_to_pitch_bend());
    }

    #[test]
    fn register_rejects_past_capacity() {
        let mut first = Recorder::default();
        let mut second = Recorder::default();
        let mut dispatcher = Dispatcher::<1>::new();

        assert_eq!(Ok(()), dispatcher.register(&mut first));
        assert_eq!(
            Err(ListenerCapacityError { capacity: 1 }),
            dispatcher.register(&mut second)
        );
        assert_eq!(1, dispatcher.listener_count());
    }

    #[test]
    fn classifies_and_publishes() {
        let mut recorder = Recorder::default();
        {
            let mut dispatcher = Dispatcher::<2>::new();
            dispatcher.register(&mut recorder).ok();
            dispatcher.set_semitones_to_pitch_bend(2);

            let mut buffer = EventBuffer::<8>::new();
            buffer.push(MidiEvent::from_bytes(&[0x90, 60, 100]));
            buffer.push(MidiEvent::from_bytes(&[0xB0, 1, 64]));
            buffer.push(MidiEvent::from_bytes(&[0xE0, 127, 127]));
            buffer.push(MidiEvent::from_bytes(&[0x80, 60, 10]));

            dispatcher.dispatch_events(&mut buffer);
            assert!(buffer.is_empty(), "Expected buffer to be drained");
        }

        let published = recorder.published();
        assert_eq!(7, published.len());
        assert_eq!(
            Published::Raw(MidiEvent::from_bytes(&[0x90, 60, 100])),
            published[0]
        );
        assert_eq!(
            Published::Key(KeyEvent::new(KeyState::Pressed, 60, 100)),
            published[1]
        );
        assert_eq!(
            Published::Raw(MidiEvent::from_bytes(&[0xB0, 1, 64])),
            published[2],
            "Control change should only be published raw"
        );
        assert_eq!(
            Published::Raw(MidiEvent::from_bytes(&[0xE0, 127, 127])),
            published[3]
        );
        match published[4] {
            Published::Pitch(event) => {
                assert_abs_diff_eq!(1.122_462, event.factor(), epsilon = 1e-5)
            }
            other => panic!("Expected pitch event but got {other:?}"),
        }
        assert_eq!(
            Published::Raw(MidiEvent::from_bytes(&[0x80, 60, 10])),
            published[5]
        );
        assert_eq!(
            Published::Key(KeyEvent::new(KeyState::Released, 60, 10)),
            published[6]
        );
    }

    #[test]
    fn listeners_called_in_registration_order() {
        struct OrderProbe<'c> {
            clock: &'c Cell<u8>,
            heard_at: Option<u8>,
        }

        impl EventListener for OrderProbe<'_> {
            fn on_midi_event(&mut self, _event: &MidiEvent) {
                self.heard_at = Some(self.clock.get());
                self.clock.set(self.clock.get() + 1);
            }
        }

        let clock = Cell::new(0);
        let mut first = OrderProbe {
            clock: &clock,
            heard_at: None,
        };
        let mut second = OrderProbe {
            clock: &clock,
            heard_at: None,
        };
        {
            let mut dispatcher = Dispatcher::<2>::new();
            dispatcher.register(&mut first).ok();
            dispatcher.register(&mut second).ok();
            dispatcher.dispatch(&MidiEvent::from_bytes(&[0x90, 60, 100]));
        }
        assert_eq!(Some(0), first.heard_at, "Expected left but got right");
        assert_eq!(Some(1), second.heard_at, "Expected left but got right");
    }
}
