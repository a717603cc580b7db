mod error;
pub use error::Error;

mod io;
pub use io::{Input, Output};

pub mod msg;
pub use msg::Msg;

pub mod port;

/// Command part of a status byte.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

pub mod tag {
    use super::Tag;

    pub const BUTTON_DISENGAGED: Tag = Tag::from(0x80);
    pub const BUTTON_ENGAGED: Tag = Tag::from(0x90);
    pub const CONTROL_CHANGE: Tag = Tag::from(0xb0);
}

/// Channel part of a status byte, in the range `0..=15`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }

    /// Converts a channel number as users know it, in the range `1..=16`.
    pub const fn from_number(number: u8) -> Self {
        Self(number.wrapping_sub(1) & 0x0f)
    }

    pub const fn number(self) -> u8 {
        self.0 + 1
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

/// Builds a 3 bytes message for the device.
///
/// `command` is XORed with the channel instead of the conventional OR.
/// Both agree as long as the low nibble of `command` is clear, which holds
/// for every [`Tag`], but raw commands with a channel already baked in
/// are toggled back, which devices configured for this wire contract
/// rely on.
pub fn build_message(command: u8, chan: Channel, data: [u8; 2]) -> Msg {
    Msg::from([command ^ u8::from(chan), data[0], data[1]])
}
