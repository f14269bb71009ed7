pub mod cookie_utils;
pub mod crypto;
pub mod logging;
pub mod redirect_validator;
pub mod responses;
