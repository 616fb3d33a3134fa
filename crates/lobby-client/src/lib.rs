pub mod client;
pub mod controller;
pub mod settings;
pub mod state;
