use crate::actions;

/// Host side of the control surface.
///
/// Implementations are called from the MIDI input thread and from
/// the button synchronization thread, so they must marshal to whatever
/// thread the host needs on their own.
pub trait ActionDispatch: Send + Sync + 'static {
    fn execute_button(&self, id: u8) -> Result<(), actions::Error>;

    /// The implementation decides how to interpret the magnitude of the move.
    fn execute_knob(&self, id: u8, old_value: u8, new_value: u8) -> Result<(), actions::Error>;

    /// Returns `None` if the toggle state of the button's action is unknown.
    fn is_button_toggled(&self, id: u8) -> Result<Option<bool>, actions::Error>;
}
