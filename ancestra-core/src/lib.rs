pub mod errors;
pub mod models;
pub mod panel;
pub mod utils;

pub use errors::PanelError;
pub use panel::ReferencePanel;
