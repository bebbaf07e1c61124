mod member_repo;
mod menu_repo;
mod role_repo;
mod user_repo;

pub use member_repo::MemberRepo;
pub use menu_repo::MenuRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
