use std::sync::Arc;

use super::{BoundController, Error, HostApp};
use crate::ctrl_surf::ActionDispatch;

/// Runs the host commands bound to the controller elements.
pub struct ActionsHandler {
    bound: BoundController,
    host: Arc<dyn HostApp>,
}

impl ActionsHandler {
    pub fn new(bound: BoundController, host: Arc<dyn HostApp>) -> Self {
        Self { bound, host }
    }
}

impl ActionDispatch for ActionsHandler {
    fn execute_button(&self, id: u8) -> Result<(), Error> {
        match self.bound.button_action(id) {
            Some(cmd) => self.host.execute_command(cmd),
            None => {
                log::debug!("No command bound to button {id}");
                Ok(())
            }
        }
    }

    /// Runs the increase or decrease command once per step of the move.
    fn execute_knob(&self, id: u8, old_value: u8, new_value: u8) -> Result<(), Error> {
        let diff = i16::from(new_value) - i16::from(old_value);
        let cmd = if diff >= 0 {
            self.bound.knob_increase_action(id)
        } else {
            self.bound.knob_decrease_action(id)
        };

        let Some(cmd) = cmd else {
            log::debug!("No command bound to knob {id} for diff {diff}");
            return Ok(());
        };

        for _ in 0..diff.unsigned_abs() {
            self.host.execute_command(cmd)?;
        }

        Ok(())
    }

    fn is_button_toggled(&self, id: u8) -> Result<Option<bool>, Error> {
        match self.bound.button_action(id) {
            Some(cmd) => self.host.is_toggled(cmd),
            None => Ok(None),
        }
    }
}
