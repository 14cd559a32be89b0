// Configuration layer
pub mod logging;
pub mod settings;

pub use settings::Settings;
