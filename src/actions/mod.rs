//! Binds controller elements to host application commands.

use std::sync::Arc;

mod bound;
pub use bound::{BoundController, KnobActions};

mod console;
pub use console::ConsoleApp;

mod handler;
pub use handler::ActionsHandler;

use crate::ctrl_surf::Element;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Binds are meant for controller {binds_for}, not {controller}")]
    ControllerMismatch {
        binds_for: Arc<str>,
        controller: Arc<str>,
    },

    #[error("Bound {} is not on the controller", .0)]
    UnknownElement(Element),

    #[error("Unknown command {}", .0)]
    UnknownCommand(Arc<str>),

    #[error("Command {id} failed: {reason}")]
    CommandFailed { id: Arc<str>, reason: Arc<str> },
}

/// The application whose commands are driven by the controller.
pub trait HostApp: Send + Sync + 'static {
    fn commands(&self) -> Vec<Arc<str>>;

    fn execute_command(&self, id: &str) -> Result<(), Error>;

    /// Returns `None` if the command has no toggle state.
    fn is_toggled(&self, id: &str) -> Result<Option<bool>, Error>;
}
