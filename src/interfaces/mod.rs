pub mod log;
pub mod transport;
