pub mod init;
pub mod list;
pub mod run;
pub mod summary;
pub mod validate;
