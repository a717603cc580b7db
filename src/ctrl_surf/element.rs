use std::fmt;

use super::Descriptor;
use crate::midi::{tag, Tag};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Element {
    Button(u8),
    Knob(u8),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Button(id) => write!(f, "button {id}"),
            Element::Knob(id) => write!(f, "knob {id}"),
        }
    }
}

/// A device message resolved against the [`Descriptor`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    KnobTurned { id: u8, value: u8 },
    ButtonPressed(u8),
    ButtonReleased(u8),
}

impl Event {
    /// Resolves a message to the element it targets.
    ///
    /// When an id is declared both as a knob and a button,
    /// a control change goes to the knob and notes go to the button.
    ///
    /// Returns `None` for messages the controller doesn't know about.
    pub fn resolve(desc: &Descriptor, command: Tag, data: [u8; 2]) -> Option<Self> {
        let [id, value] = data;

        match command {
            tag::CONTROL_CHANGE if desc.is_knob(id) => Some(Event::KnobTurned { id, value }),
            tag::BUTTON_ENGAGED if desc.is_button(id) => Some(Event::ButtonPressed(id)),
            tag::BUTTON_DISENGAGED if desc.is_button(id) => Some(Event::ButtonReleased(id)),
            _ => None,
        }
    }
}
