use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

use super::YamlModel;

/// What was selected last time the app ran.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub selected_controller_path: Option<PathBuf>,
    pub selected_binds_path: Option<PathBuf>,
    pub selected_midi_in: Option<String>,
    pub selected_midi_out: Option<String>,
    /// Binds last used with each controller file.
    pub recent_binds_for_controller: BTreeMap<PathBuf, Option<PathBuf>>,
}

impl YamlModel for AppState {}
