//! Provides a struct [`ActivatedNotes`] for tracking which keys are held down. Here "activated notes" means the notes
//! whose Note On has been received without a matching Note Off, regardless of whether or not they are actually
//! voiced.

use crate::midi::KeyEvent;
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Per the General MIDI Level 2 specification, compliant devices "must be capable of supplying polyphony of
/// 32 or more allocated notes simultaneously." Thus, this will be the default size of an ActivatedNotes instance.
const GM2_SIMUL_NOTE_NUM: usize = 32;

/// A struct for tracking held keys and the velocity each was struck with, in the order they were pressed.
///
/// Internally, this struct stores [`U7`] pairs because [`tinyvec`] requires that items implement [`Default`], which
/// [`Note`] does not. Public interfaces deal with [`Note`] instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivatedNotes<const N: usize = GM2_SIMUL_NOTE_NUM> {
    /// `(note, velocity)` of each held key, oldest first
    data: ArrayVec<[(U7, U7); N]>,
}

impl<const N: usize> Default for ActivatedNotes<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for ActivatedNotes<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ActivatedNotes {{ data: [");
        for (i, &(note, velocity)) in self.data.iter().enumerate() {
            if i != 0 {
                defmt::write!(fmt, ",");
            }
            defmt::write!(
                fmt,
                " {} @ {}",
                Note::from(note).to_str(),
                u8::from(velocity)
            );
        }
        defmt::write!(fmt, " ] }}");
    }
}

impl<const N: usize> ActivatedNotes<N> {
    /// Construct a new, empty `ActivatedNotes`.
    pub fn new() -> Self {
        Self { data: array_vec!() }
    }

    /// Records a pressed key. A key that is already held keeps its place but takes the new velocity; a key pressed
    /// while the list is full is ignored.
    pub fn add(&mut self, event: KeyEvent) {
        let note = U7::from_u8_lossy(u8::from(event.note()));
        if let Some(held) = self.data.iter_mut().find(|(n, _)| *n == note) {
            held.1 = event.velocity();
        } else if self.data.len() != self.data.capacity() {
            self.data.push((note, event.velocity()));
        }
    }

    /// Forgets a released key.
    pub fn remove(&mut self, note: Note) {
        let note = U7::from_u8_lossy(u8::from(note));
        self.data.retain(|&(n, _)| n != note);
    }

    /// Determine if any [`Note`]s are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The most recently pressed [`Note`] still held, i.e. the one a last-note-priority monophonic voice plays.
    pub fn last(&self) -> Option<Note> {
        self.data.last().map(|&(note, _)| Note::from(note))
    }

    /// The velocity a held [`Note`] was struck with, or `None` if it is not held.
    pub fn velocity(&self, note: Note) -> Option<U7> {
        let note = U7::from_u8_lossy(u8::from(note));
        self.data
            .iter()
            .find(|(n, _)| *n == note)
            .map(|&(_, velocity)| velocity)
    }

    /// Returns an [`Iterator`] over the held [`Note`]s, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.data.iter().map(|&(note, _)| Note::from(note))
    }
}
