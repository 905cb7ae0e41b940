//! A listener which remembers everything it hears, for asserting on dispatch output.

use super::{EventListener, KeyEvent, MidiEvent, PitchEvent};
use tinyvec::ArrayVec;

const RECORDER_CAPACITY: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Published {
    Raw(MidiEvent),
    Key(KeyEvent),
    Pitch(PitchEvent),
}

impl Default for Published {
    fn default() -> Self {
        Self::Raw(MidiEvent::EMPTY)
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    published: ArrayVec<[Published; RECORDER_CAPACITY]>,
}

impl Recorder {
    pub fn published(&self) -> &[Published] {
        &self.published
    }

    pub fn key_events(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.published.iter().filter_map(|published| match published {
            Published::Key(event) => Some(*event),
            _ => None,
        })
    }

    pub fn pitch_events(&self) -> impl Iterator<Item = PitchEvent> + '_ {
        self.published.iter().filter_map(|published| match published {
            Published::Pitch(event) => Some(*event),
            _ => None,
        })
    }

    fn record(&mut self, published: Published) {
        if self.published.try_push(published).is_some() {
            panic!("Recorder holds at most {RECORDER_CAPACITY} events");
        }
    }
}

impl EventListener for Recorder {
    fn on_midi_event(&mut self, event: &MidiEvent) {
        self.record(Published::Raw(*event));
    }

    fn on_key_event(&mut self, event: KeyEvent) {
        self.record(Published::Key(event));
    }

    fn on_pitch_event(&mut self, event: PitchEvent) {
        self.record(Published::Pitch(event));
    }
}
