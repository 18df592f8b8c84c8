pub mod course;
pub mod credential;

pub use course::PostgresCourseRepository;
pub use credential::PostgresCredentialRepository;
