//! Bytes arrive one at a time from a serial transport and are handed to a [`Decoder`], which rebuilds complete
//! messages (applying running status) into an [`EventBuffer`]. A [`Dispatcher`] later drains the buffer, classifies
//! each message and publishes typed events to its [`EventListener`]s. [`MidiHandler`] bundles the three.
//!
//! Decoding and dispatch are separate so that byte reception (often an interrupt) never has to wait on listeners;
//! the dispatcher is expected to run from a periodic control-rate tick.

mod buffer;
pub use buffer::*;

mod decoder;
pub use decoder::*;

mod dispatcher;
pub use dispatcher::*;

mod event;
pub use event::*;

mod handler;
pub use handler::*;

mod listener;
pub use listener::*;

#[cfg(test)]
mod test_support;
