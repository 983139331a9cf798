mod create_user;
mod init;
mod logs;

pub use create_user::cmd_create_user;
pub use init::cmd_init;
pub use logs::{cmd_logs, cmd_prune_logs};
