pub mod game;
pub mod path;
pub mod protocol;
pub mod transport;
pub mod ws;
