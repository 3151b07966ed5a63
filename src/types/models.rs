pub mod credentials;
pub mod installed_mod;
pub mod portal;
