use serde::{Deserialize, Serialize};

use super::{check_not_empty, check_range, find_duplicate, Error, YamlModel};

const MIDI_VALUE_MAX: u8 = 127;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerElement {
    pub id: u8,
    pub name: String,
}

impl ControllerElement {
    pub fn new(id: u8, name: impl ToString) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Schema of a MIDI control surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    pub name: String,
    pub button_value_off: u8,
    pub button_value_on: u8,
    pub knob_value_min: u8,
    pub knob_value_max: u8,
    /// MIDI channel number, 1 to 16.
    pub default_channel: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_midi_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_midi_out: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ControllerElement>,
    #[serde(default)]
    pub knobs: Vec<ControllerElement>,
}

impl Controller {
    fn validate_elements(kind: &'static str, elements: &[ControllerElement]) -> Result<(), Error> {
        for elem in elements {
            check_range("id", elem.id, 0, MIDI_VALUE_MAX)?;
            check_not_empty("name", &elem.name)?;
        }

        if let Some(id) = find_duplicate(elements.iter().map(|elem| elem.id)) {
            return Err(Error::DuplicateId { kind, id });
        }

        if let Some(name) = find_duplicate(elements.iter().map(|elem| elem.name.as_str())) {
            return Err(Error::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }

        Ok(())
    }
}

impl YamlModel for Controller {
    fn validate(&self) -> Result<(), Error> {
        check_not_empty("name", &self.name)?;

        check_range("button_value_off", self.button_value_off, 0, MIDI_VALUE_MAX)?;
        check_range("button_value_on", self.button_value_on, 0, MIDI_VALUE_MAX)?;
        check_range("knob_value_min", self.knob_value_min, 0, MIDI_VALUE_MAX)?;
        check_range("knob_value_max", self.knob_value_max, 0, MIDI_VALUE_MAX)?;
        check_range("default_channel", self.default_channel, 1, 16)?;

        if self.button_value_off == self.button_value_on {
            return Err(Error::ButtonValuesEqual);
        }

        if self.knob_value_min >= self.knob_value_max {
            return Err(Error::KnobRange);
        }

        Self::validate_elements("buttons", &self.buttons)?;
        Self::validate_elements("knobs", &self.knobs)?;

        Ok(())
    }
}
