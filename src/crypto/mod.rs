pub mod password;
pub mod signing;

pub use password::{hash_password, verify_password};
pub use signing::signed_download_url;
