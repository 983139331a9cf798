pub mod account;
pub mod comment;
pub mod follow;
pub mod like;
pub mod logs;
pub mod post;
pub mod user;
