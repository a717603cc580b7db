//! Discovery of the system's MIDI ports.

use std::{collections::BTreeMap, sync::Arc};

use super::Error;

/// Ports found in one direction, by name.
///
/// Ports which belong to this client are left out.
pub struct PortMap<IO: midir::MidiIO>(BTreeMap<Arc<str>, IO::Port>);

impl<IO: midir::MidiIO> PortMap<IO> {
    pub fn scan(io: &IO, client_name: &str) -> Result<Self, Error> {
        let mut map = BTreeMap::new();

        for port in io.ports() {
            let name = io.port_name(&port)?;
            if name.starts_with(client_name) {
                log::trace!("Skipping own port {name}");
                continue;
            }

            map.insert(name.into(), port);
        }

        Ok(Self(map))
    }

    pub fn names(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.0.keys().cloned()
    }

    pub fn get(&self, name: &str) -> Result<&IO::Port, Error> {
        self.0
            .get(name)
            .ok_or_else(|| Error::PortNotFound(name.into()))
    }
}

pub fn input_names(client_name: &str) -> Result<Vec<Arc<str>>, Error> {
    let io = midir::MidiInput::new(&format!("{client_name} scan In"))?;
    Ok(PortMap::scan(&io, client_name)?.names().collect())
}

pub fn output_names(client_name: &str) -> Result<Vec<Arc<str>>, Error> {
    let io = midir::MidiOutput::new(&format!("{client_name} scan Out"))?;
    Ok(PortMap::scan(&io, client_name)?.names().collect())
}
