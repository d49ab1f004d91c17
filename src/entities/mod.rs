pub mod prelude;

pub mod artists;
pub mod media;
pub mod users;
pub mod works;
