use super::{EventBuffer, MessageKind, MidiEvent, STATUS_BIT};

/// Rebuilds MIDI messages from a byte stream, one byte at a time.
///
/// Each message is assembled inside the decoder and pushed to an [`EventBuffer`] only once its last expected data byte
/// arrives, so a consumer never sees a partial message, and other writers to the buffer cannot disturb one.
///
/// Running status is honored: after a complete message, further data bytes without a new status byte start another
/// message of the same status. A stream of `[0x90, 60, 100, 64, 90]` therefore yields two Note On messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoder {
    /// The last status byte received. Every status byte replaces it, system messages included.
    running_status: Option<u8>,
    /// Data bytes expected after `running_status`.
    expected_len: u8,
    /// Data bytes received for `message`.
    data_index: u8,
    /// The message being assembled.
    message: MidiEvent,
}

impl Decoder {
    /// Constructs a [`Decoder`] which has not yet seen a status byte.
    pub const fn new() -> Self {
        Self {
            running_status: None,
            expected_len: 0,
            data_index: 0,
            message: MidiEvent::EMPTY,
        }
    }

    /// Returns the status byte applied to data bytes that arrive without one.
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// Consumes one byte of the stream, pushing a message to `buffer` when it completes one.
    ///
    /// Never blocks and never fails. Unrecognized status bytes are taken to carry no data bytes. Data bytes that arrive
    /// before any status byte are discarded, as there is no running status to apply to them.
    pub fn process_byte<const N: usize>(&mut self, byte: u8, buffer: &mut EventBuffer<N>) {
        if byte & STATUS_BIT != 0 {
            let kind = MessageKind::from_status(byte);
            if let MessageKind::Unknown(_status) = kind {
                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "Unrecognized status byte {=u8:#x}, assuming no data bytes",
                    _status
                );
            }

            self.running_status = Some(byte);
            self.expected_len = kind.data_len();
            self.data_index = 0;
            // any half-built message is abandoned here
            self.message.start(byte);
        } else {
            let Some(status) = self.running_status else {
                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "Dropping data byte {=u8:#x} received before any status byte",
                    byte
                );
                return;
            };

            self.data_index += 1;
            if self.data_index > self.expected_len {
                // running status: the previous message is complete, so this byte opens a new one
                self.message.start(status);
                self.data_index = 1;
            }
            self.message.set_byte(usize::from(self.data_index), byte);
        }

        if self.data_index >= self.expected_len {
            buffer.push(self.message);
        }
    }
}
