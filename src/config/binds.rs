use serde::{Deserialize, Serialize};

use super::{check_not_empty, check_range, find_duplicate, Error, YamlModel};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBind {
    pub button_id: u8,
    pub action_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnobBind {
    pub knob_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id_increase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id_decrease: Option<String>,
}

/// Maps controller elements to application actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binds {
    pub name: String,
    pub app_name: String,
    pub controller_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub button_binds: Vec<ButtonBind>,
    #[serde(default)]
    pub knob_binds: Vec<KnobBind>,
}

impl YamlModel for Binds {
    fn validate(&self) -> Result<(), Error> {
        check_not_empty("name", &self.name)?;
        check_not_empty("app_name", &self.app_name)?;
        check_not_empty("controller_name", &self.controller_name)?;

        for bind in &self.button_binds {
            check_range("button_id", bind.button_id, 0, 127)?;
            check_not_empty("action_id", &bind.action_id)?;
        }
        for bind in &self.knob_binds {
            check_range("knob_id", bind.knob_id, 0, 127)?;
        }

        if let Some(id) = find_duplicate(self.button_binds.iter().map(|bind| bind.button_id)) {
            return Err(Error::DuplicateId {
                kind: "button_binds",
                id,
            });
        }

        if let Some(id) = find_duplicate(self.knob_binds.iter().map(|bind| bind.knob_id)) {
            return Err(Error::DuplicateId {
                kind: "knob_binds",
                id,
            });
        }

        Ok(())
    }
}
