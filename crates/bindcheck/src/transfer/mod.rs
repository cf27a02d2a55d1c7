pub mod comm;
pub mod connection;
pub mod local;
pub mod messages;
pub mod rendezvous;
pub mod tcp;
