pub mod dispatch;
pub mod transport;
