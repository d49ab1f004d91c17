pub use super::artists::Entity as Artists;
pub use super::media::Entity as Media;
pub use super::users::Entity as Users;
pub use super::works::Entity as Works;
