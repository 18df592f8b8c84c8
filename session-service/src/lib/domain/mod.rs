pub mod access;
pub mod course;
pub mod identity;
