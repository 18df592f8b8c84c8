pub mod events;
pub mod memory;
pub mod repositories;
pub mod sessions;
