//! Selection of a controller, its binds and MIDI ports, and the
//! synchronizer running on top of them.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    actions::{self, ActionsHandler, BoundController, HostApp},
    config::{self, AppState, Binds, Config, Controller, YamlModel},
    ctrl_surf::{self, Descriptor, MidirTransport, Synchronizer, Timing, Transport},
    midi,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Controller,
    Binds,
    MidiIn,
    MidiOut,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Selection::Controller => "controller",
            Selection::Binds => "binds",
            Selection::MidiIn => "MIDI input port",
            Selection::MidiOut => "MIDI output port",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No {} was selected", .0)]
    NothingSelected(Selection),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Actions(#[from] actions::Error),

    #[error(transparent)]
    Midi(#[from] midi::Error),

    #[error(transparent)]
    ControlSurface(#[from] ctrl_surf::Error),
}

/// A model file and the name found in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedItem {
    pub name: String,
    pub path: PathBuf,
}

pub struct Session {
    config: Config,
    client_name: Arc<str>,
    timing: Timing,
    selected_controller: Option<SelectedItem>,
    selected_binds: Option<SelectedItem>,
    recent_binds_for_controller: BTreeMap<PathBuf, Option<PathBuf>>,
    selected_midi_in: Option<Arc<str>>,
    selected_midi_out: Option<Arc<str>>,
    synchronizer: Option<Synchronizer>,
}

impl Session {
    pub fn new(config: Config, client_name: &str) -> Self {
        Self {
            config,
            client_name: client_name.into(),
            timing: Timing::default(),
            selected_controller: None,
            selected_binds: None,
            recent_binds_for_controller: BTreeMap::new(),
            selected_midi_in: None,
            selected_midi_out: None,
            synchronizer: None,
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.synchronizer.is_some()
    }

    /// The running synchronizer, e.g. to pause it or flash an element.
    pub fn synchronizer(&self) -> Option<&Synchronizer> {
        self.synchronizer.as_ref()
    }

    pub fn available_controllers(&self) -> Vec<SelectedItem> {
        Controller::load_all_from(self.config.controller_dirs())
            .into_iter()
            .map(|(controller, path)| SelectedItem {
                name: controller.name,
                path,
            })
            .collect()
    }

    /// Binds meant for the selected controller.
    pub fn available_binds(&self) -> Vec<SelectedItem> {
        let Some(controller) = self.selected_controller.as_ref() else {
            return Vec::new();
        };

        Binds::load_all_from(self.config.binds_dirs())
            .into_iter()
            .filter(|(binds, _)| binds.controller_name == controller.name)
            .map(|(binds, path)| SelectedItem {
                name: binds.name,
                path,
            })
            .collect()
    }

    /// Lists the names of the MIDI input and output ports.
    pub fn available_midi_ports(&self) -> Result<(Vec<Arc<str>>, Vec<Arc<str>>), Error> {
        Ok(MidirTransport::list_ports(&self.client_name)?)
    }

    pub fn selected_controller(&self) -> Option<&SelectedItem> {
        self.selected_controller.as_ref()
    }

    pub fn selected_binds(&self) -> Option<&SelectedItem> {
        self.selected_binds.as_ref()
    }

    pub fn selected_midi_in(&self) -> Option<&str> {
        self.selected_midi_in.as_deref()
    }

    pub fn selected_midi_out(&self) -> Option<&str> {
        self.selected_midi_out.as_deref()
    }

    /// Binds most recently selected along with the controller at `controller_path`.
    pub fn recent_binds(&self, controller_path: &Path) -> Option<&Path> {
        self.recent_binds_for_controller
            .get(controller_path)?
            .as_deref()
    }

    /// Doesn't affect a running synchronizer until the next [`Self::start_handling`].
    pub fn select_controller(&mut self, path: Option<&Path>) -> Result<(), Error> {
        self.selected_controller = match path {
            Some(path) => Some(SelectedItem {
                name: Controller::load_from(path)?.name,
                path: path.to_owned(),
            }),
            None => None,
        };

        Ok(())
    }

    /// Also remembers the binds as the most recent ones for the selected controller.
    pub fn select_binds(&mut self, path: Option<&Path>) -> Result<(), Error> {
        self.selected_binds = match path {
            Some(path) => Some(SelectedItem {
                name: Binds::load_from(path)?.name,
                path: path.to_owned(),
            }),
            None => None,
        };

        if let Some(controller) = self.selected_controller.as_ref() {
            self.recent_binds_for_controller.insert(
                controller.path.clone(),
                self.selected_binds.as_ref().map(|binds| binds.path.clone()),
            );
        }

        Ok(())
    }

    pub fn select_midi_in(&mut self, port: Option<&str>) {
        self.selected_midi_in = port.map(Arc::from);
    }

    pub fn select_midi_out(&mut self, port: Option<&str>) {
        self.selected_midi_out = port.map(Arc::from);
    }

    /// Starts handling the selected controller on the selected MIDI ports.
    ///
    /// Any running synchronizer is stopped first and is not restored on failure.
    pub fn start_handling(&mut self, host: Arc<dyn HostApp>) -> Result<(), Error> {
        self.stop_handling();

        let (desc, handler) = self.prepare(host)?;
        let transport = MidirTransport::open(
            &self.client_name,
            self.expect_port(Selection::MidiIn)?,
            self.expect_port(Selection::MidiOut)?,
        )?;

        self.run(desc, handler, Arc::new(transport))
    }

    /// Same as [`Self::start_handling`] but on the provided `transport`.
    pub fn start_handling_on(
        &mut self,
        host: Arc<dyn HostApp>,
        transport: Arc<dyn Transport>,
    ) -> Result<(), Error> {
        self.stop_handling();

        let (desc, handler) = self.prepare(host)?;
        self.run(desc, handler, transport)
    }

    pub fn stop_handling(&mut self) {
        if let Some(mut synchronizer) = self.synchronizer.take() {
            synchronizer.stop();
            log::info!("Stopped handling {}", synchronizer.descriptor().name);
        }
    }

    fn expect_port(&self, selection: Selection) -> Result<Arc<str>, Error> {
        let port = match selection {
            Selection::MidiIn => self.selected_midi_in.clone(),
            Selection::MidiOut => self.selected_midi_out.clone(),
            _ => None,
        };

        port.ok_or(Error::NothingSelected(selection))
    }

    fn prepare(&self, host: Arc<dyn HostApp>) -> Result<(Descriptor, ActionsHandler), Error> {
        let controller_path = &self
            .selected_controller
            .as_ref()
            .ok_or(Error::NothingSelected(Selection::Controller))?
            .path;
        let binds_path = &self
            .selected_binds
            .as_ref()
            .ok_or(Error::NothingSelected(Selection::Binds))?
            .path;
        self.expect_port(Selection::MidiIn)?;
        self.expect_port(Selection::MidiOut)?;

        let binds = Binds::load_from(binds_path)?;
        let controller = Controller::load_from(controller_path)?;

        let bound = BoundController::create(&binds, &controller, &host.commands())?;

        Ok((Descriptor::from(&controller), ActionsHandler::new(bound, host)))
    }

    fn run(
        &mut self,
        desc: Descriptor,
        handler: ActionsHandler,
        transport: Arc<dyn Transport>,
    ) -> Result<(), Error> {
        let synchronizer =
            Synchronizer::start(desc, Arc::new(handler), transport, self.timing.clone())?;
        self.synchronizer = Some(synchronizer);

        Ok(())
    }

    pub fn save_state(&self) -> Result<(), Error> {
        let state = AppState {
            selected_controller_path: self
                .selected_controller
                .as_ref()
                .map(|item| item.path.clone()),
            selected_binds_path: self.selected_binds.as_ref().map(|item| item.path.clone()),
            selected_midi_in: self.selected_midi_in.as_deref().map(ToString::to_string),
            selected_midi_out: self.selected_midi_out.as_deref().map(ToString::to_string),
            recent_binds_for_controller: self.recent_binds_for_controller.clone(),
        };

        Ok(self.config.save_to(&state, &self.config.app_state_file)?)
    }

    /// Restores the selection saved by [`Self::save_state`].
    ///
    /// The state is ignored if it refers to files outside of the config directories.
    pub fn load_state(&mut self) -> Result<(), Error> {
        if !self.config.app_state_file.exists() {
            return Ok(());
        }

        let state = AppState::load_from(&self.config.app_state_file)?;

        let Some(controller_path) = state.selected_controller_path.as_deref() else {
            return Ok(());
        };

        if !config::is_within(self.config.controller_dirs(), controller_path) {
            log::warn!(
                "Ignoring app state: {} is not a known controller location",
                controller_path.display(),
            );
            return Ok(());
        }

        let binds_paths = state
            .selected_binds_path
            .iter()
            .chain(state.recent_binds_for_controller.values().flatten());
        for path in binds_paths {
            if !config::is_within(self.config.binds_dirs(), path) {
                log::warn!(
                    "Ignoring app state: {} is not a known binds location",
                    path.display(),
                );
                return Ok(());
            }
        }

        self.select_controller(Some(controller_path))?;
        self.select_binds(state.selected_binds_path.as_deref())?;
        self.select_midi_in(state.selected_midi_in.as_deref());
        self.select_midi_out(state.selected_midi_out.as_deref());
        self.recent_binds_for_controller = state.recent_binds_for_controller;

        Ok(())
    }
}
