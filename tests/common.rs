use user_directory::{
    api::router::create_router,
    domain::models::user::User,
    infra::{
        factory::run_sqlite_migrations,
        repositories::{sqlite_manager_repo::SqliteManagerRepo, sqlite_user_repo::SqliteUserRepo},
    },
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool)
            .await
            .expect("Failed to migrate test db");

        let state = Arc::new(AppState::new(
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteManagerRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_manager(&self, active: bool) -> String {
        let manager_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO managers (manager_id, full_name, email, is_active, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&manager_id)
            .bind("Test Manager")
            .bind(format!("{}@example.com", &manager_id[..8]))
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .expect("Failed to seed manager");
        manager_id
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        ).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    /// Creates a user through the API and returns its id.
    pub async fn create_user(&self, full_name: &str, mob_num: &str, pan_num: &str, manager_id: Option<&str>) -> String {
        let mut payload = json!({
            "full_name": full_name,
            "mob_num": mob_num,
            "pan_num": pan_num,
        });
        if let Some(manager_id) = manager_id {
            payload["manager_id"] = json!(manager_id);
        }

        let (status, body) = self.post("/create_user", payload).await;
        assert_eq!(status, StatusCode::OK, "create_user failed: {}", body);
        body["user_id"].as_str().expect("No user_id in body").to_string()
    }

    /// Reads a row directly, active or not.
    pub async fn user_row(&self, user_id: &str) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .unwrap()
    }

    pub async fn user_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
