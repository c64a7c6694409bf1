mod comment;
pub mod payload;
mod restaurant;
mod user;
mod visit;
mod vote;

pub use comment::{Comment, CommentInput};
pub use restaurant::{OrderField, Restaurant, RestaurantInput, RestaurantQuery, SortOrder};
pub use user::{User, UserInput};
pub use visit::{Visit, VisitInput};
pub use vote::{Ballot, VoteDirection, VoteTally};
