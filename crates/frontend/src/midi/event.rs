//! Message storage and classification, plus the typed events published for notes and pitch bends.

use wmidi::{FromBytesError, MidiMessage, Note, U7};

/// Set on every status byte and clear on every data byte.
pub const STATUS_BIT: u8 = 0x80;

/// The longest message the decoder reconstructs: a status byte followed by two data bytes.
pub const MAX_MESSAGE_LEN: usize = 3;

/// Largest value a 14-bit pitch-bend message can carry.
pub const PITCH_BEND_MAX: u16 = 0x3FFF;

/// The kind of message a status byte introduces.
///
/// Channel-voice kinds are identified by the high nibble alone (the low nibble is the channel); system kinds by the
/// whole byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// `0x8n`
    NoteOff,
    /// `0x9n`
    NoteOn,
    /// `0xAn`, polyphonic key pressure.
    PolyAftertouch,
    /// `0xBn`
    ControlChange,
    /// `0xCn`
    ProgramChange,
    /// `0xDn`, channel pressure.
    ChannelAftertouch,
    /// `0xEn`
    PitchBend,
    /// `0xF0`. Its payload is not parsed.
    SystemExclusive,
    /// `0xF1`, MIDI Time Code quarter frame.
    TimeCode,
    /// `0xF2`
    SongPosition,
    /// `0xF3`
    SongSelect,
    /// `0xF6`
    TuneRequest,
    /// `0xF7`
    EndOfExclusive,
    /// `0xF8`
    TimingClock,
    /// `0xFA`
    Start,
    /// `0xFB`
    Continue,
    /// `0xFC`
    Stop,
    /// `0xFE`
    ActiveSensing,
    /// `0xFF`
    Reset,
    /// Any status byte not listed above (the undefined `0xF4`, `0xF5`, `0xF9` and `0xFD`), or a data byte.
    Unknown(u8),
}

impl MessageKind {
    /// Classifies a status byte.
    pub const fn from_status(status: u8) -> Self {
        match status >> 4 {
            0x8 => Self::NoteOff,
            0x9 => Self::NoteOn,
            0xA => Self::PolyAftertouch,
            0xB => Self::ControlChange,
            0xC => Self::ProgramChange,
            0xD => Self::ChannelAftertouch,
            0xE => Self::PitchBend,
            0xF => match status {
                0xF0 => Self::SystemExclusive,
                0xF1 => Self::TimeCode,
                0xF2 => Self::SongPosition,
                0xF3 => Self::SongSelect,
                0xF6 => Self::TuneRequest,
                0xF7 => Self::EndOfExclusive,
                0xF8 => Self::TimingClock,
                0xFA => Self::Start,
                0xFB => Self::Continue,
                0xFC => Self::Stop,
                0xFE => Self::ActiveSensing,
                0xFF => Self::Reset,
                _ => Self::Unknown(status),
            },
            _ => Self::Unknown(status),
        }
    }

    /// Number of data bytes that follow a status byte of this kind.
    ///
    /// Unrecognized kinds (and system exclusive, whose payload is unsupported) count as zero, so any data bytes after
    /// them are treated as running-status continuations.
    pub const fn data_len(self) -> u8 {
        match self {
            Self::NoteOff
            | Self::NoteOn
            | Self::PolyAftertouch
            | Self::PitchBend
            | Self::SongPosition => 2,
            Self::ControlChange
            | Self::ProgramChange
            | Self::ChannelAftertouch
            | Self::TimeCode
            | Self::SongSelect => 1,
            Self::SystemExclusive
            | Self::TuneRequest
            | Self::EndOfExclusive
            | Self::TimingClock
            | Self::Start
            | Self::Continue
            | Self::Stop
            | Self::ActiveSensing
            | Self::Reset
            | Self::Unknown(_) => 0,
        }
    }
}

/// One MIDI message as it arrived on the wire: a status byte and up to two data bytes.
///
/// Slots of an [`EventBuffer`][super::EventBuffer] hold these and are overwritten in place as new messages arrive,
/// hence the fixed size and `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MidiEvent {
    data: [u8; MAX_MESSAGE_LEN],
    /// Number of valid bytes in `data`, status included.
    len: u8,
}

impl Default for MidiEvent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl MidiEvent {
    /// A message with no bytes at all.
    pub const EMPTY: Self = Self {
        data: [0; MAX_MESSAGE_LEN],
        len: 0,
    };

    /// Builds a message from raw bytes, keeping at most [`MAX_MESSAGE_LEN`] of them.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut event = Self::EMPTY;
        for (slot, &byte) in event.data.iter_mut().zip(bytes) {
            *slot = byte;
            event.len += 1;
        }
        event
    }

    /// Clears the message and writes `status` at position 0.
    pub(crate) fn start(&mut self, status: u8) {
        self.data = [status, 0, 0];
        self.len = 1;
    }

    /// Writes a data byte at `index` (1 or 2). Indices past the end of the message are ignored.
    pub(crate) fn set_byte(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = byte;
            self.len = self.len.max(index as u8 + 1);
        }
    }

    /// The status byte; `0` for an [empty](Self::EMPTY) message.
    pub fn status(&self) -> u8 {
        self.data[0]
    }

    /// Classifies the message by its status byte.
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_status(self.status())
    }

    /// The bytes received for this message, status first.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    /// Returns data byte `n` (1-based, matching its position on the wire), or `0` if it was never received.
    pub fn data_byte(&self, n: usize) -> u8 {
        self.bytes().get(n).copied().unwrap_or_default()
    }

    /// Returns `true` for a Note On message, whatever its velocity.
    pub fn is_note_on(&self) -> bool {
        self.kind() == MessageKind::NoteOn
    }

    /// Returns `true` for a Note Off message.
    pub fn is_note_off(&self) -> bool {
        self.kind() == MessageKind::NoteOff
    }

    /// Returns `true` for a Pitch Bend message.
    pub fn is_pitch_bend(&self) -> bool {
        self.kind() == MessageKind::PitchBend
    }

    /// The 14-bit bend value (`0..=16383`, centre `8192`) of a Pitch Bend message, LSB first on the wire.
    pub fn pitch_bend_value(&self) -> Option<u16> {
        if !self.is_pitch_bend() {
            return None;
        }
        let lsb = u16::from(self.data_byte(1) & 0x7F);
        let msb = u16::from(self.data_byte(2) & 0x7F);
        Some((msb << 7) | lsb)
    }

    /// Parses the message into a [`MidiMessage`] for listeners that prefer typed access.
    pub fn to_midi_message(&self) -> Result<MidiMessage<'_>, FromBytesError> {
        MidiMessage::from_bytes(self.bytes())
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    /// Produced by Note On.
    Pressed,
    /// Produced by Note Off.
    Released,
}

/// A key was pressed or released.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    state: KeyState,
    note: Note,
    velocity: U7,
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "KeyEvent {{ state: {}, note: {} ({}), velocity: {} }}",
            self.state,
            self.note.to_str(),
            u8::from(self.note),
            u8::from(self.velocity)
        );
    }
}

impl KeyEvent {
    /// Constructs a [`KeyEvent`] from the data bytes of a note message. Bytes above 127 are truncated to 7 bits.
    pub fn new(state: KeyState, note: u8, velocity: u8) -> Self {
        Self {
            state,
            note: Note::from(U7::from_u8_lossy(note)),
            velocity: U7::from_u8_lossy(velocity),
        }
    }

    /// Getter.
    pub fn state(&self) -> KeyState {
        self.state
    }

    /// Getter.
    pub fn note(&self) -> Note {
        self.note
    }

    /// Getter.
    pub fn velocity(&self) -> U7 {
        self.velocity
    }

    /// Convenience function to test whether the key went down.
    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }
}

/// The pitch wheel moved.
///
/// Carries a multiplicative frequency ratio rather than the raw wheel position, so control code can apply it without
/// knowing the configured bend range: `bent_hz = hz * event.factor()`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PitchEvent {
    factor: f32,
}

impl Default for PitchEvent {
    /// No bend.
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl PitchEvent {
    /// Constructs a [`PitchEvent`] from a frequency ratio.
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }

    /// The frequency ratio; 1.0 means no bend, 2.0 an octave up, 0.5 an octave down.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Returns `frequency` bent by this event.
    pub fn apply(&self, frequency: f32) -> f32 {
        frequency * self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::Channel;

    #[test]
    fn channel_voice_kinds_ignore_channel() {
        assert_eq!(MessageKind::NoteOn, MessageKind::from_status(0x90));
        assert_eq!(MessageKind::NoteOn, MessageKind::from_status(0x9F));
        assert_eq!(MessageKind::NoteOff, MessageKind::from_status(0x83));
        assert_eq!(MessageKind::PitchBend, MessageKind::from_status(0xE7));
        assert_eq!(MessageKind::ProgramChange, MessageKind::from_status(0xC0));
    }

    #[test]
    fn data_lengths() {
        let cases = [
            (0x80, 2),
            (0x90, 2),
            (0xA0, 2),
            (0xB0, 1),
            (0xC0, 1),
            (0xD0, 1),
            (0xE0, 2),
            (0xF1, 1),
            (0xF2, 2),
            (0xF3, 1),
            (0xF6, 0),
            (0xF7, 0),
            (0xF8, 0),
            (0xFA, 0),
            (0xFB, 0),
            (0xFC, 0),
            (0xFE, 0),
        ];
        for (status, expected) in cases {
            assert_eq!(
                expected,
                MessageKind::from_status(status).data_len(),
                "Wrong data length for status {status:#x}; expected left but got right"
            );
        }
    }

    #[test]
    fn reset_has_no_data_bytes() {
        assert_eq!(MessageKind::Reset, MessageKind::from_status(0xFF));
        assert_eq!(0, MessageKind::Reset.data_len());
    }

    #[test]
    fn undefined_statuses_are_unknown() {
        for status in [0xF4, 0xF5, 0xF9, 0xFD] {
            let kind = MessageKind::from_status(status);
            assert_eq!(MessageKind::Unknown(status), kind);
            assert_eq!(0, kind.data_len());
        }
    }

    #[test]
    fn predicates() {
        let note_on = MidiEvent::from_bytes(&[0x91, 60, 100]);
        assert!(note_on.is_note_on());
        assert!(!note_on.is_note_off());
        assert!(!note_on.is_pitch_bend());

        let note_off = MidiEvent::from_bytes(&[0x81, 60, 0]);
        assert!(note_off.is_note_off());

        let bend = MidiEvent::from_bytes(&[0xE0, 0, 64]);
        assert!(bend.is_pitch_bend());
    }

    #[test]
    fn pitch_bend_value_is_lsb_first() {
        assert_eq!(
            Some(8192),
            MidiEvent::from_bytes(&[0xE0, 0, 64]).pitch_bend_value()
        );
        assert_eq!(
            Some(PITCH_BEND_MAX),
            MidiEvent::from_bytes(&[0xE0, 127, 127]).pitch_bend_value()
        );
        assert_eq!(
            Some(1),
            MidiEvent::from_bytes(&[0xE0, 1, 0]).pitch_bend_value()
        );
        assert_eq!(
            None,
            MidiEvent::from_bytes(&[0x90, 1, 0]).pitch_bend_value()
        );
    }

    #[test]
    fn from_bytes_truncates() {
        let event = MidiEvent::from_bytes(&[0x90, 60, 100, 64]);
        assert_eq!(&[0x90, 60, 100], event.bytes());
    }

    #[test]
    fn set_byte_past_end_is_ignored() {
        let mut event = MidiEvent::EMPTY;
        event.start(0xC0);
        event.set_byte(MAX_MESSAGE_LEN, 5);
        assert_eq!(&[0xC0], event.bytes());
    }

    #[test]
    fn missing_data_bytes_read_as_zero() {
        let event = MidiEvent::from_bytes(&[0xC0]);
        assert_eq!(0, event.data_byte(1));
        assert_eq!(0, event.data_byte(2));
    }

    #[test]
    fn converts_to_midi_message() {
        let event = MidiEvent::from_bytes(&[0x90, 60, 100]);
        assert_eq!(
            Some(MidiMessage::NoteOn(
                Channel::Ch1,
                Note::C4,
                U7::from_u8_lossy(100)
            )),
            event.to_midi_message().ok(),
            "Expected left but got right"
        );
    }

    #[test]
    fn key_event_fields() {
        let event = KeyEvent::new(KeyState::Released, 64, 90);
        assert_eq!(KeyState::Released, event.state());
        assert_eq!(Note::E4, event.note());
        assert_eq!(U7::from_u8_lossy(90), event.velocity());
        assert!(!event.is_pressed());
    }

    #[test]
    fn pitch_event_applies_factor() {
        assert_eq!(440.0, PitchEvent::default().apply(440.0));
        assert_eq!(880.0, PitchEvent::new(2.0).apply(440.0));
    }
}
