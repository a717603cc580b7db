use super::{Channel, Error, Tag};
use crate::bytes;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> bytes::Displayable {
        bytes::Displayable::from(self.0.as_ref())
    }
}

/// Splits a 3 bytes channel voice message.
///
/// Returns the command, the channel and the two data bytes.
pub fn decode(buf: &[u8]) -> Result<(Tag, Channel, [u8; 2]), Error> {
    match *buf {
        [status, data0, data1] => Ok((Tag::from(status), Channel::from(status), [data0, data1])),
        _ => Err(Error::InvalidMsg(bytes::Displayable::from(buf).to_owned())),
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
