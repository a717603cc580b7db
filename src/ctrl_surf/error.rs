use crate::midi;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Control surface transport: {}", .0)]
    Transport(#[from] midi::Error),

    #[error("Couldn't spawn the button synchronization thread")]
    Spawn(#[source] std::io::Error),
}
