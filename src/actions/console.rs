use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use super::{Error, HostApp};
use crate::config::Binds;

/// A host which logs the commands it is asked to run.
///
/// Every command is toggleable and flips each time it's executed,
/// which gives the controller LEDs something to follow.
#[derive(Debug, Default)]
pub struct ConsoleApp {
    toggles: Mutex<BTreeMap<Arc<str>, bool>>,
}

impl ConsoleApp {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            toggles: Mutex::new(commands.into_iter().map(|cmd| (cmd.into(), false)).collect()),
        }
    }

    /// Offers every command referenced by `binds`.
    pub fn from_binds(binds: &Binds) -> Self {
        let buttons = binds.button_binds.iter().map(|bind| bind.action_id.as_str());
        let knobs = binds.knob_binds.iter().flat_map(|bind| {
            [&bind.action_id_increase, &bind.action_id_decrease]
                .into_iter()
                .flatten()
                .map(String::as_str)
        });

        Self::new(buttons.chain(knobs))
    }

    fn toggles(&self) -> std::sync::MutexGuard<'_, BTreeMap<Arc<str>, bool>> {
        self.toggles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostApp for ConsoleApp {
    fn commands(&self) -> Vec<Arc<str>> {
        self.toggles().keys().cloned().collect()
    }

    fn execute_command(&self, id: &str) -> Result<(), Error> {
        let mut toggles = self.toggles();
        let toggled = toggles
            .get_mut(id)
            .ok_or_else(|| Error::UnknownCommand(id.into()))?;

        *toggled = !*toggled;
        log::info!("Executed {id} => {}", if *toggled { "on" } else { "off" });

        Ok(())
    }

    fn is_toggled(&self, id: &str) -> Result<Option<bool>, Error> {
        self.toggles()
            .get(id)
            .map(|toggled| Some(*toggled))
            .ok_or_else(|| Error::UnknownCommand(id.into()))
    }
}
