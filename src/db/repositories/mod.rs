pub mod artist;
pub mod media;
pub mod user;
pub mod work;
