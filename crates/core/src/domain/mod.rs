pub mod item;
pub mod ratings;
pub mod user;

pub use item::{Item, ItemRef};
pub use ratings::RatingTable;
pub use user::UserProfile;
