pub mod member;
pub mod menu;
pub mod role;
pub mod user;
