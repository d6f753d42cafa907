pub mod generate;
pub mod history;
pub mod init;
pub mod serve;
