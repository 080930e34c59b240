pub mod password;
pub mod revocation;
pub mod token;
