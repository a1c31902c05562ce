pub mod review;
pub mod review_image;
pub mod spot;
pub mod spot_image;
pub mod user;

pub use review::Review;
pub use review_image::ReviewImage;
pub use spot::Spot;
pub use spot_image::SpotImage;
pub use user::User;
