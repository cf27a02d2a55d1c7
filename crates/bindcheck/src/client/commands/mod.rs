pub mod cluster;
pub mod execute;
pub mod init;
pub mod summary;
