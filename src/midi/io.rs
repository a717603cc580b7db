//! Connections to a single MIDI port per direction.

use std::{mem, sync::Arc};

use super::{port::PortMap, Error, Msg};

enum Link<IO, C> {
    Idle(IO),
    Open { port: Arc<str>, conn: C },
    /// Transient, while moving between the other two.
    Gone,
}

impl<IO, C> Default for Link<IO, C> {
    fn default() -> Self {
        Self::Gone
    }
}

pub struct Input {
    client_name: Arc<str>,
    link: Link<midir::MidiInput, midir::MidiInputConnection<()>>,
}

impl Input {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self {
            client_name: client_name.into(),
            link: Link::Idle(midir::MidiInput::new(client_name)?),
        })
    }

    /// Listens to `port_name`, handing each message to `callback`.
    ///
    /// Any previous port is closed first.
    pub fn open<C>(&mut self, port_name: Arc<str>, mut callback: C) -> Result<(), Error>
    where
        C: FnMut(u64, &[u8]) + Send + 'static,
    {
        self.close();

        let io = match mem::take(&mut self.link) {
            Link::Idle(io) => io,
            _ => midir::MidiInput::new(&self.client_name)?,
        };
        let ports = PortMap::scan(&io, &self.client_name)?;
        let port = ports.get(&port_name)?;

        match io.connect(port, &self.client_name, move |ts, buf, _| callback(ts, buf), ()) {
            Ok(conn) => {
                log::info!("Listening to {port_name}");
                self.link = Link::Open {
                    port: port_name,
                    conn,
                };

                Ok(())
            }
            Err(err) => {
                log::error!("Couldn't listen to {port_name}: {err}");
                self.link = Link::Idle(err.into_inner());

                Err(Error::Connect(port_name))
            }
        }
    }

    pub fn close(&mut self) {
        self.link = match mem::take(&mut self.link) {
            Link::Open { port, conn } => {
                let (io, ()) = conn.close();
                log::debug!("Stopped listening to {port}");

                Link::Idle(io)
            }
            other => other,
        };
    }
}

pub struct Output {
    client_name: Arc<str>,
    link: Link<midir::MidiOutput, midir::MidiOutputConnection>,
}

impl Output {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self {
            client_name: client_name.into(),
            link: Link::Idle(midir::MidiOutput::new(client_name)?),
        })
    }

    /// Any previous port is closed first.
    pub fn open(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        self.close();

        let io = match mem::take(&mut self.link) {
            Link::Idle(io) => io,
            _ => midir::MidiOutput::new(&self.client_name)?,
        };
        let ports = PortMap::scan(&io, &self.client_name)?;
        let port = ports.get(&port_name)?;

        match io.connect(port, &self.client_name) {
            Ok(conn) => {
                log::info!("Sending to {port_name}");
                self.link = Link::Open {
                    port: port_name,
                    conn,
                };

                Ok(())
            }
            Err(err) => {
                log::error!("Couldn't send to {port_name}: {err}");
                self.link = Link::Idle(err.into_inner());

                Err(Error::Connect(port_name))
            }
        }
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        match &mut self.link {
            Link::Open { conn, .. } => Ok(conn.send(msg)?),
            _ => Err(Error::NotConnected),
        }
    }

    pub fn close(&mut self) {
        self.link = match mem::take(&mut self.link) {
            Link::Open { port, conn } => {
                log::debug!("Stopped sending to {port}");
                Link::Idle(conn.close())
            }
            other => other,
        };
    }
}
