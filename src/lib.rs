pub mod actions;
pub mod bytes;
pub mod config;

pub mod ctrl_surf;
pub use ctrl_surf::Synchronizer;

pub mod midi;

pub mod session;
pub use session::Session;
