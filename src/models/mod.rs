pub mod artist;
pub mod media;
pub mod work;
