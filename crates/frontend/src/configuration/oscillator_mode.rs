use num_derive::{FromPrimitive, ToPrimitive};

/// Selects the waveform an [`Oscillator`][crate::oscillator::Oscillator] produces.
///
/// Every shape other than [`OscillatorMode::Sine`] has at least one discontinuity per period (in the waveform or, for
/// the triangle, in its slope) and is band-limited with PolyBLEP correction.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscillatorMode {
    /// A pure sine; needs no correction.
    #[default]
    Sine,
    /// A rising ramp from -1 to 1 which drops back to -1 once per period.
    Sawtooth,
    /// Spends the first half of each period at 1 and the second at -1.
    Square,
    /// The band-limited square run through a leaky double integrator. Peak amplitude depends on frequency.
    Triangle,
}
impl super::CycleConfig for OscillatorMode {}
