//! Provides a band-limited [`Oscillator`] producing one sample per call.
//!
//! Naively generated sawtooth and square waves jump instantaneously once or twice per period, and those jumps alias
//! badly at audio rates. PolyBLEP ("polynomial band-limited step") replaces the two samples around each jump with a
//! short polynomial blend, which removes most of the aliasing for the cost of a few multiplies. The triangle is
//! derived from the corrected square by leaky integration, so it inherits the correction.

use crate::configuration::{DEFAULT_SAMPLE_RATE_HZ, OscillatorMode};
use core::f32::consts::{PI, TAU};
use measurements::Frequency;
use num_traits::Float;

/// The PolyBLEP residual for a step at normalized phase 0 (equivalently 1).
///
/// `t` is the normalized phase in `0.0..=1.0` and `dt` the normalized phase increment. The result is non-zero only
/// within `dt` of the step on either side: it falls from -1 to 0 over `0.0..dt` and rises from 0 to 1 over
/// `1.0 - dt..=1.0`. A `dt` of zero yields zero everywhere rather than dividing by zero.
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// A single band-limited oscillator.
///
/// Meant to be driven once per audio frame through [`next_sample`](Self::next_sample), with
/// [`set_frequency`](Self::set_frequency) called at control rate (on note or pitch-bend changes). Every method takes
/// `&mut self`, so changing the frequency from a control path while the audio path renders needs the usual
/// single-writer arrangement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oscillator {
    mode: OscillatorMode,
    sample_rate: f32,
    frequency: f32,
    /// Radians, kept within `-2π..=2π`.
    phase: f32,
    /// Radians per sample; negative when running backwards.
    phase_increment: f32,
    /// One-pole coefficients for the triangle integrator: `a0 = 1 - b1`.
    a0: f32,
    b1: f32,
    /// Triangle integrator registers; `stage_b` is the output.
    stage_a: f32,
    stage_b: f32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(Frequency::from_hertz(DEFAULT_SAMPLE_RATE_HZ))
    }
}

impl Oscillator {
    /// Constructs a silent sine [`Oscillator`] for the given sample rate. Until a frequency is set it outputs zeros.
    pub fn new(sample_rate: Frequency) -> Self {
        Self {
            mode: OscillatorMode::default(),
            sample_rate: sample_rate.as_hertz() as f32,
            frequency: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            a0: 1.0,
            b1: 0.0,
            stage_a: 0.0,
            stage_b: 0.0,
        }
    }

    /// Sets the frequency in hertz.
    ///
    /// Any value is accepted: zero stops the phase, negative values run the waveform backwards, and values past
    /// Nyquist alias despite the correction. Recomputes the triangle integrator coefficients, so this belongs at
    /// control rate rather than in the per-sample loop.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase_increment = frequency * TAU / self.sample_rate;
        // cutoff at half the oscillator frequency; abs since frequency may be negative
        self.b1 = (-TAU * (frequency.abs() / self.sample_rate / 2.0)).exp();
        self.a0 = 1.0 - self.b1;
    }

    /// Getter.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Radians the phase advances per sample.
    pub fn phase_increment(&self) -> f32 {
        self.phase_increment
    }

    /// Getter.
    pub fn sample_rate(&self) -> Frequency {
        Frequency::from_hertz(f64::from(self.sample_rate))
    }

    /// Selects the waveform. Takes effect on the next sample without resetting the phase.
    pub fn set_oscillator_mode(&mut self, mode: OscillatorMode) {
        self.mode = mode;
    }

    /// Getter.
    pub fn oscillator_mode(&self) -> OscillatorMode {
        self.mode
    }

    /// Restarts the waveform at phase zero and empties the triangle integrator. Frequency and mode are kept.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.stage_a = 0.0;
        self.stage_b = 0.0;
    }

    /// Renders one sample and advances the phase.
    ///
    /// Output stays within roughly `-1.0..=1.0`. The triangle's peak amplitude varies with frequency because its
    /// integrator is not gain-compensated.
    pub fn next_sample(&mut self) -> f32 {
        let output = match self.mode {
            OscillatorMode::Sine => self.phase.sin(),
            OscillatorMode::Sawtooth => {
                let (t, dt) = self.normalized_phase();
                (2.0 * self.phase / TAU) - 1.0 - poly_blep(t, dt)
            }
            OscillatorMode::Square => self.square(),
            OscillatorMode::Triangle => {
                let square = self.square();
                // the second stage deliberately reads the freshly updated first stage
                self.stage_a = square * self.a0 + self.stage_b * self.b1;
                self.stage_b = self.stage_b * self.a0 + self.stage_a * self.b1;
                self.stage_b
            }
        };

        self.phase += self.phase_increment;
        if self.phase > TAU {
            self.phase -= TAU;
        } else if self.phase < -TAU {
            self.phase += TAU;
        }

        output
    }

    /// Phase and phase increment as fractions of a period. Absolute values keep a negative frequency inside the
    /// `0.0..=1.0` domain of [`poly_blep`].
    fn normalized_phase(&self) -> (f32, f32) {
        (self.phase.abs() / TAU, self.phase_increment.abs() / TAU)
    }

    /// The band-limited square: high for the first half period, with a correction at the rising edge (phase 0) and
    /// another at the falling edge half a period later.
    fn square(&self) -> f32 {
        let (t, dt) = self.normalized_phase();
        let naive = if self.phase < PI { 1.0 } else { -1.0 };
        naive + poly_blep(t, dt) - poly_blep((t + 0.5) % 1.0, dt)
    }
}
