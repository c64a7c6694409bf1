pub mod comment;
pub mod restaurant;
pub mod user;
pub mod visit;
pub mod vote;

pub use comment::Entity as Comment;
pub use restaurant::Entity as Restaurant;
pub use user::Entity as User;
pub use visit::Entity as Visit;
pub use vote::Entity as Vote;
