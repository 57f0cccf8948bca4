pub mod notify;
pub mod tickets;
