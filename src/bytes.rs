use std::{borrow::Cow, fmt};

/// Hex rendering of a raw MIDI buffer for logs and errors.
///
/// The alternate form (`{:#}`) splits the status byte of a
/// channel voice message into its command and channel nibbles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self(Cow::Borrowed(buf))
    }
}

impl<'a> Displayable<'a> {
    pub fn to_owned(&self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.clone().into_owned()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, rest) = match self.0.split_first() {
            Some(split) => split,
            None => return f.write_str("(empty)"),
        };

        if f.alternate() {
            write!(f, "cmd {:02x} chan {:x}", first & 0xf0, first & 0x0f)?;
            if !rest.is_empty() {
                f.write_str(" data")?;
            }
            for val in rest {
                write!(f, " {val:02x}")?;
            }

            return Ok(());
        }

        write!(f, "(hex): {first:02x}")?;
        for val in rest {
            write!(f, ", {val:02x}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Displayable;

    #[test]
    fn hex_list() {
        let buf = [0xb0u8, 5, 100];
        assert_eq!(
            Displayable::from(buf.as_slice()).to_string(),
            "(hex): b0, 05, 64"
        );
    }

    #[test]
    fn status_split() {
        let buf = [0x9au8, 0x10, 0x7f];
        assert_eq!(
            format!("{:#}", Displayable::from(buf.as_slice())),
            "cmd 90 chan a data 10 7f"
        );
    }

    #[test]
    fn empty() {
        let buf: [u8; 0] = [];
        assert_eq!(Displayable::from(buf.as_slice()).to_string(), "(empty)");
    }
}
