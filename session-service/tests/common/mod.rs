use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenLifetimes;
use serde_json::json;
use serde_json::Value;
use session_service::domain::access::relationships::StoreRelationships;
use session_service::domain::access::resolver::AccessResolver;
use session_service::domain::course::service::CourseService;
use session_service::domain::identity::models::DisplayName;
use session_service::domain::identity::models::EmailAddress;
use session_service::domain::identity::models::Password;
use session_service::domain::identity::models::RegisterCommand;
use session_service::domain::identity::service::SessionService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::memory::InMemoryCourseRepository;
use session_service::outbound::memory::InMemoryCredentialRepository;
use session_service::outbound::memory::InMemoryOutbox;
use session_service::outbound::memory::InMemorySessionStore;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const DEFAULT_PASSWORD: &str = "correct-horse-battery";
pub const ADMIN_EMAIL: &str = "admin@school.test";

/// Test application that spawns a real server on in-memory adapters
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub outbox: InMemoryOutbox,
}

/// Access and refresh tokens plus the id of the logged-in account
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Cheap Argon2 parameters keep the suite fast
        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("Invalid hasher params");
        let authenticator = Authenticator::new(TEST_SECRET, TokenLifetimes::default())
            .expect("Failed to create authenticator")
            .with_password_hasher(hasher);

        let credentials = Arc::new(InMemoryCredentialRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let outbox = InMemoryOutbox::new();

        let session_service = SessionService::new(
            Arc::clone(&credentials),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(outbox.clone()),
            authenticator,
        );
        session_service
            .ensure_admin(RegisterCommand {
                email: EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                password: Password::new(DEFAULT_PASSWORD.to_string()).unwrap(),
                display_name: DisplayName::new("Admin".to_string()).unwrap(),
                role: None,
            })
            .await
            .expect("Failed to provision admin");
        let session_service = Arc::new(session_service);
        let access_resolver = Arc::new(AccessResolver::new(Arc::new(StoreRelationships::new(
            Arc::clone(&credentials),
            Arc::clone(&courses),
        ))));
        let course_service = Arc::new(CourseService::new(courses));

        let router = create_router(session_service, access_resolver, course_service);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            outbox,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an account and return its id.
    pub async fn register(&self, email: &str, role: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": DEFAULT_PASSWORD,
                "display_name": email.split('@').next().unwrap_or("user"),
                "role": role,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "register {} failed", email);

        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Log in with `password` and return the raw response.
    pub async fn login_response(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with the default password; panics unless it succeeds.
    pub async fn login(&self, email: &str) -> Session {
        self.login_with(email, DEFAULT_PASSWORD).await
    }

    pub async fn login_with(&self, email: &str, password: &str) -> Session {
        let response = self.login_response(email, password).await;
        assert_eq!(response.status(), 200, "login {} failed", email);

        let body: Value = response.json().await.unwrap();
        Session {
            user_id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            access_token: body["data"]["tokens"]["access_token"]
                .as_str()
                .unwrap()
                .to_string(),
            refresh_token: body["data"]["tokens"]["refresh_token"]
                .as_str()
                .unwrap()
                .to_string(),
        }
    }

    /// Register and log in.
    pub async fn sign_up(&self, email: &str, role: &str) -> Session {
        self.register(email, role).await;
        self.login(email).await
    }

    /// Create a course as `teacher` and return its id.
    pub async fn create_course(&self, teacher: &Session, title: &str) -> String {
        let response = self
            .post_authenticated("/api/courses", &teacher.access_token)
            .json(&json!({ "title": title, "description": "Intro" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201);

        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Enroll `student` in `course_id`.
    pub async fn enroll(&self, student: &Session, course_id: &str) {
        let response = self
            .post_authenticated("/api/enrollments", &student.access_token)
            .json(&json!({ "course_id": course_id }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201);
    }

    /// Reset token most recently delivered to `email`.
    pub async fn reset_token_for(&self, email: &str) -> Option<String> {
        self.outbox
            .latest_for(email)
            .await
            .map(|message| message.reset_token)
    }
}
