pub mod auth;
pub mod backrooms;
