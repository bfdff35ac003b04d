pub mod client;
pub mod config;
pub mod input;
pub mod interpolation;
pub mod state;

pub use client::NetworkClient;
pub use config::ClientConfig;
pub use input::InputState;
pub use interpolation::Interpolator;
pub use state::{ClientEntityView, ClientStateStore};
