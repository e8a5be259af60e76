pub mod feed;
pub mod posting;
pub mod user;

pub use feed::Feed;
pub use posting::Posting;
pub use user::User;
