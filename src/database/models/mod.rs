pub mod image;
pub mod invite_code;
pub mod plant;
pub mod plant_user;

pub use image::*;
pub use invite_code::*;
pub use plant::*;
pub use plant_user::*;
