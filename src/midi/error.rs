use std::sync::Arc;

use crate::bytes;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't create MIDI client")]
    Init(#[from] midir::InitError),

    #[error("Couldn't read a MIDI port name")]
    PortInfo(#[from] midir::PortInfoError),

    #[error("No MIDI port named {}", .0)]
    PortNotFound(Arc<str>),

    #[error("Couldn't connect to MIDI port {}", .0)]
    Connect(Arc<str>),

    #[error("MIDI port not connected")]
    NotConnected,

    #[error("Not a channel voice msg: {}", .0)]
    InvalidMsg(bytes::Displayable<'static>),

    #[error("Couldn't send MIDI msg")]
    Send(#[from] midir::SendError),
}
