mod sign_in;
mod voting;

pub use sign_in::{AuthorizationRequest, GoogleSignIn};
pub use voting::Voting;
