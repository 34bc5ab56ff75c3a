#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use backrooms_catalog::config::Config;
use backrooms_catalog::db::{BackroomsStorage, Database, SessionsStorage, UsersStorage};
use backrooms_catalog::{AppState, app_router};
use serde_json::{Value, json};
use std::{
    fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub db: Database,
    db_path: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body was not json")
    }

    /// `name=value` part of the session cookie, ready for a `Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("backrooms_session="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub async fn spawn_app(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "backrooms-catalog-test-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let mut cfg = Config {
        database_url: format!("sqlite:{}", db_path.display()),
        bcrypt_cost: 4,
        insecure_cookie: true,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        ..Config::default()
    };
    tweak(&mut cfg);

    let db = Database::connect(&cfg.database_url, Duration::from_secs(5))
        .await
        .expect("failed to open test database");
    let state = AppState::build(&cfg, db.clone())
        .await
        .expect("failed to build app state");

    TestApp {
        app: app_router(state.clone()),
        state,
        db,
        db_path,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let resp = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/register",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Register `username` and return its session cookie.
    pub async fn logged_in(&self, username: &str) -> String {
        let resp = self.register(username, "correct-horse").await;
        assert_eq!(resp.status, StatusCode::OK);
        let resp = self.login(username, "correct-horse").await;
        assert_eq!(resp.status, StatusCode::OK);
        resp.session_cookie().expect("login did not set a session cookie")
    }

    pub fn backrooms(&self) -> BackroomsStorage {
        BackroomsStorage::new(self.db.clone())
    }

    pub fn users(&self) -> UsersStorage {
        UsersStorage::new(self.db.clone())
    }

    pub fn sessions(&self) -> SessionsStorage {
        SessionsStorage::new(self.db.clone())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

pub fn backroom_body() -> Value {
    json!({
        "level": "Level 0",
        "entities": "none observed",
        "danger_level": 1,
        "entry_method": "noclip",
        "investigation_status": "ongoing",
        "description": "Endless mono-yellow rooms with humming lights."
    })
}
