pub mod day;
pub mod dispatch;
pub mod entry;
pub mod group;
pub mod init;
pub mod schema;
pub mod week;

mod shared;
