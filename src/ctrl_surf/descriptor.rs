use std::{collections::BTreeSet, sync::Arc};

use crate::{config, midi};

/// Static description of a control surface for a session.
#[derive(Clone, Debug)]
pub struct Descriptor {
    pub name: Arc<str>,
    pub button_ids: BTreeSet<u8>,
    pub knob_ids: BTreeSet<u8>,
    pub button_value_off: u8,
    pub button_value_on: u8,
    pub knob_value_min: u8,
    pub knob_value_max: u8,
    pub default_channel: midi::Channel,
}

impl Descriptor {
    pub fn is_button(&self, id: u8) -> bool {
        self.button_ids.contains(&id)
    }

    pub fn is_knob(&self, id: u8) -> bool {
        self.knob_ids.contains(&id)
    }

    /// Returns the previous value to report for a knob move.
    ///
    /// A device repeating its boundary value has no discoverable direction,
    /// so the previous value is moved one step inside the range. Elsewhere,
    /// a repeat is reported as is.
    pub fn knob_prev_value(&self, prev: u8, value: u8) -> u8 {
        if value != prev {
            return prev;
        }

        if value == self.knob_value_min {
            self.knob_value_min + 1
        } else if value == self.knob_value_max {
            self.knob_value_max - 1
        } else {
            prev
        }
    }

    /// Values sent while sweeping a knob ring: min to max and back.
    pub fn knob_sweep(&self, steps: u8) -> impl Iterator<Item = u8> {
        let min = self.knob_value_min as u32;
        let span = self.knob_value_max.saturating_sub(self.knob_value_min) as u32;
        let steps = steps.max(1) as u32;

        let at = move |step: u32| (min + span * step / steps) as u8;

        (0..=steps).chain((0..steps).rev()).map(at)
    }
}

impl From<&config::Controller> for Descriptor {
    fn from(controller: &config::Controller) -> Self {
        Self {
            name: controller.name.as_str().into(),
            button_ids: controller.buttons.iter().map(|elem| elem.id).collect(),
            knob_ids: controller.knobs.iter().map(|elem| elem.id).collect(),
            button_value_off: controller.button_value_off,
            button_value_on: controller.button_value_on,
            knob_value_min: controller.knob_value_min,
            knob_value_max: controller.knob_value_max,
            default_channel: midi::Channel::from_number(controller.default_channel),
        }
    }
}
