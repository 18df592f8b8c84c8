//! Process-local adapters for development (`storage.backend = "memory"`) and tests.

pub mod courses;
pub mod credentials;
pub mod outbox;
pub mod sessions;

pub use courses::InMemoryCourseRepository;
pub use credentials::InMemoryCredentialRepository;
pub use outbox::InMemoryOutbox;
pub use sessions::InMemorySessionStore;
