//! This module contains both user-configurable settings (implemented as enums) and the constants the surrounding
//! audio system is expected to agree on.

mod oscillator_mode;
pub use oscillator_mode::*;

use num_traits::{FromPrimitive, ToPrimitive};

/// Sample rate assumed by [`Oscillator::default()`][crate::oscillator::Oscillator], in hertz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 48_000.0;

/// Number of slots in the default [`EventBuffer`][crate::midi::EventBuffer]. One slot always stays free to tell a full
/// ring from an empty one, so this many minus one complete messages can wait to be dispatched.
pub const DEFAULT_EVENT_BUFFER_SLOTS: usize = 32;

/// Number of listeners a default [`Dispatcher`][crate::midi::Dispatcher] can hold.
pub const DEFAULT_LISTENER_SLOTS: usize = 4;

/// Pitch-bend range used until [`set_semitones_to_pitch_bend`][crate::midi::Dispatcher::set_semitones_to_pitch_bend]
/// says otherwise. A full bend in either direction moves the pitch by this many semitones.
pub const DEFAULT_SEMITONES_TO_PITCH_BEND: u32 = 1;

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let next = self.to_u8().and_then(|index| index.checked_add(1));
        next.and_then(<Self as FromPrimitive>::from_u8)
            .or_else(|| <Self as FromPrimitive>::from_u8(0))
            .unwrap_or(self)
    }
}
