use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use super::Error;
use crate::{
    config::{Binds, Controller},
    ctrl_surf::Element,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnobActions {
    pub increase: Option<Arc<str>>,
    pub decrease: Option<Arc<str>>,
}

/// A controller with host commands bound to its elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundController {
    pub knob_value_min: u8,
    pub knob_value_max: u8,
    buttons: BTreeMap<u8, Arc<str>>,
    knobs: BTreeMap<u8, KnobActions>,
}

impl BoundController {
    /// Resolves `binds` against `controller` and the `commands` the host offers.
    ///
    /// Commands the host doesn't know are left unbound with a warning.
    pub fn create(
        binds: &Binds,
        controller: &Controller,
        commands: &[Arc<str>],
    ) -> Result<Self, Error> {
        if binds.controller_name != controller.name {
            return Err(Error::ControllerMismatch {
                binds_for: binds.controller_name.as_str().into(),
                controller: controller.name.as_str().into(),
            });
        }

        let find = |action_id: &str| -> Option<Arc<str>> {
            let cmd = commands.iter().find(|cmd| cmd.as_ref() == action_id).cloned();
            if cmd.is_none() {
                log::warn!("Bound command '{action_id}' cannot be found");
            }

            cmd
        };

        let buttons: BTreeMap<u8, Arc<str>> = binds
            .button_binds
            .iter()
            .filter_map(|bind| find(&bind.action_id).map(|cmd| (bind.button_id, cmd)))
            .collect();

        let knobs: BTreeMap<u8, KnobActions> = binds
            .knob_binds
            .iter()
            .map(|bind| {
                let actions = KnobActions {
                    increase: bind.action_id_increase.as_deref().and_then(find),
                    decrease: bind.action_id_decrease.as_deref().and_then(find),
                };

                (bind.knob_id, actions)
            })
            .collect();

        let button_ids: BTreeSet<u8> = controller.buttons.iter().map(|button| button.id).collect();
        if let Some(&id) = buttons.keys().find(|id| !button_ids.contains(id)) {
            return Err(Error::UnknownElement(Element::Button(id)));
        }

        let knob_ids: BTreeSet<u8> = controller.knobs.iter().map(|knob| knob.id).collect();
        if let Some(&id) = knobs.keys().find(|id| !knob_ids.contains(id)) {
            return Err(Error::UnknownElement(Element::Knob(id)));
        }

        Ok(Self {
            knob_value_min: controller.knob_value_min,
            knob_value_max: controller.knob_value_max,
            buttons,
            knobs,
        })
    }

    pub fn button_action(&self, id: u8) -> Option<&Arc<str>> {
        self.buttons.get(&id)
    }

    pub fn knob_increase_action(&self, id: u8) -> Option<&Arc<str>> {
        self.knobs.get(&id)?.increase.as_ref()
    }

    pub fn knob_decrease_action(&self, id: u8) -> Option<&Arc<str>> {
        self.knobs.get(&id)?.decrease.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ButtonBind, ControllerElement, KnobBind};

    fn controller() -> Controller {
        Controller {
            name: "Pad".to_string(),
            button_value_off: 0,
            button_value_on: 127,
            knob_value_min: 10,
            knob_value_max: 100,
            default_channel: 1,
            preferred_midi_in: None,
            preferred_midi_out: None,
            buttons: vec![ControllerElement::new(0, "Play"), ControllerElement::new(1, "Stop")],
            knobs: vec![ControllerElement::new(5, "Volume")],
        }
    }

    fn binds() -> Binds {
        Binds {
            name: "Transport".to_string(),
            app_name: "Player".to_string(),
            controller_name: "Pad".to_string(),
            description: None,
            button_binds: vec![
                ButtonBind {
                    button_id: 0,
                    action_id: "play".to_string(),
                },
                ButtonBind {
                    button_id: 1,
                    action_id: "missing".to_string(),
                },
            ],
            knob_binds: vec![KnobBind {
                knob_id: 5,
                action_id_increase: Some("volume_up".to_string()),
                action_id_decrease: Some("gone".to_string()),
            }],
        }
    }

    fn commands() -> Vec<Arc<str>> {
        vec!["play".into(), "volume_up".into(), "volume_down".into()]
    }

    #[test]
    fn create() {
        let bound = BoundController::create(&binds(), &controller(), &commands()).unwrap();

        assert_eq!(bound.knob_value_min, 10);
        assert_eq!(bound.knob_value_max, 100);
        assert_eq!(bound.button_action(0).map(AsRef::as_ref), Some("play"));
        assert_eq!(bound.button_action(1), None);
        assert_eq!(bound.knob_increase_action(5).map(AsRef::as_ref), Some("volume_up"));
        assert_eq!(bound.knob_decrease_action(5), None);
        assert_eq!(bound.knob_increase_action(6), None);
    }

    #[test]
    fn controller_mismatch() {
        let binds = Binds {
            controller_name: "Mixer".to_string(),
            ..binds()
        };

        assert!(matches!(
            BoundController::create(&binds, &controller(), &commands()),
            Err(Error::ControllerMismatch { .. })
        ));
    }

    #[test]
    fn element_not_on_controller() {
        let mut binds = binds();
        binds.button_binds.push(ButtonBind {
            button_id: 7,
            action_id: "play".to_string(),
        });
        assert!(matches!(
            BoundController::create(&binds, &controller(), &commands()),
            Err(Error::UnknownElement(Element::Button(7)))
        ));

        let mut binds = self::binds();
        binds.knob_binds.push(KnobBind {
            knob_id: 9,
            action_id_increase: None,
            action_id_decrease: None,
        });
        assert!(matches!(
            BoundController::create(&binds, &controller(), &commands()),
            Err(Error::UnknownElement(Element::Knob(9)))
        ));
    }

    #[test]
    fn unknown_command_on_missing_element_is_ignored() {
        let mut binds = binds();
        binds.button_binds.push(ButtonBind {
            button_id: 7,
            action_id: "missing".to_string(),
        });

        assert!(BoundController::create(&binds, &controller(), &commands()).is_ok());
    }
}
