// Generated from Pet Store 1.0.0

pub const LIST_PETS: (&str, &str) = ("GET", "/pets");
pub const CREATE_PET: (&str, &str) = ("POST", "/pets");
pub const SHOW_PET_BY_ID: (&str, &str) = ("GET", "/pets/:petId");
