//! This crate contains the architecture-agnostic, real-time front end of a digital instrument: a decoder which
//! rebuilds [MIDI](https://midi.org/midi-1-0) messages from a raw serial byte stream (including
//! [running status](https://en.wikipedia.org/wiki/MIDI#Running_status) compression) and dispatches them as musical
//! events, and a band-limited [`Oscillator`][oscillator::Oscillator] which uses
//! [PolyBLEP](https://www.martin-finke.de/articles/audio-plugins-018-polyblep-oscillator/) correction to synthesize
//! sawtooth, square and triangle waves without aliasing.
//!
//! Nothing here allocates, blocks or suspends, so every operation is suitable for interrupt or audio-callback
//! context. Byte reception and audio output are left to the surrounding firmware.

#![deny(missing_docs)]
#![no_std]

pub mod configuration;

/// Decoding a MIDI byte stream into buffered messages and publishing them to listeners.
pub mod midi;

/// Data structures for tracking MIDI events the instrument has received.
pub mod midi_state;

pub mod oscillator;
