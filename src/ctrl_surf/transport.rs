use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::midi;

/// Callback receiving the timestamp and the bytes of an incoming message.
pub type InboundCallback = Box<dyn FnMut(u64, &[u8]) + Send + 'static>;

/// Duplex message channel with the device.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, msg: &midi::Msg) -> Result<(), midi::Error>;

    /// Installs the callback for incoming messages, replacing any previous one.
    fn set_callback(&self, callback: InboundCallback) -> Result<(), midi::Error>;

    /// Removes the callback for incoming messages.
    ///
    /// Once this returns, the callback is no longer running nor called.
    fn cancel_callback(&self);
}

/// [`Transport`] over a pair of midir ports.
pub struct MidirTransport {
    input: Mutex<midi::Input>,
    output: Mutex<midi::Output>,
    in_port: Arc<str>,
}

impl MidirTransport {
    /// Connects the output port and checks the input port exists.
    ///
    /// The input port is connected when the callback is installed.
    pub fn open(
        client_name: &str,
        in_port: Arc<str>,
        out_port: Arc<str>,
    ) -> Result<Self, midi::Error> {
        if !midi::port::input_names(client_name)?.contains(&in_port) {
            return Err(midi::Error::PortNotFound(in_port));
        }

        let mut output = midi::Output::try_new(client_name)?;
        output.open(out_port)?;

        Ok(Self {
            input: Mutex::new(midi::Input::try_new(client_name)?),
            output: Mutex::new(output),
            in_port,
        })
    }

    /// Lists the names of available input and output ports.
    pub fn list_ports(client_name: &str) -> Result<(Vec<Arc<str>>, Vec<Arc<str>>), midi::Error> {
        Ok((
            midi::port::input_names(client_name)?,
            midi::port::output_names(client_name)?,
        ))
    }

    fn input(&self) -> MutexGuard<'_, midi::Input> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn output(&self) -> MutexGuard<'_, midi::Output> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MidirTransport {
    fn send(&self, msg: &midi::Msg) -> Result<(), midi::Error> {
        self.output().send(msg)
    }

    fn set_callback(&self, callback: InboundCallback) -> Result<(), midi::Error> {
        self.input().open(self.in_port.clone(), callback)
    }

    fn cancel_callback(&self) {
        self.input().close();
    }
}

impl Drop for MidirTransport {
    fn drop(&mut self) {
        self.input().close();
        self.output().close();
    }
}
