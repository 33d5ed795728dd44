pub mod checker;
pub mod config;
pub mod error;
pub mod event;
pub mod notifier;
pub mod ryanair;
pub mod seats;
pub mod transport;
