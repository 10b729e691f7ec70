pub mod collect;
pub mod init;
pub mod items;
pub mod sources;
pub mod status;
