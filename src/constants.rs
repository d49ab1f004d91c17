pub mod pagination {

    pub const PER_PAGE: u64 = 30;
}

pub mod session {

    pub const USER_KEY: &str = "user";

    pub const FLASH_KEY: &str = "flash";
}

pub mod media {

    pub const IMAGES_COLLECTION: &str = "images";
}

pub mod limits {

    pub const MAX_STRING_LENGTH: u64 = 255;

    pub const MIN_YEAR: i64 = 1;

    pub const MAX_YEAR: i64 = 9999;
}
