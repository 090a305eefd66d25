//! In-process stub of the note backend's testing API
//!
//! Serves just enough of the real backend's surface for the fixture layer
//! to be tested hermetically: the destructive reset endpoint and user
//! creation. The note app itself is never reimplemented here.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use notewright_common::{Note, TestUser};

#[derive(Debug, Default)]
pub struct StubState {
    pub users: Vec<TestUser>,
    pub notes: Vec<Note>,
    pub resets: usize,
    /// When set, user creation answers 500.
    pub fail_user_creation: bool,
}

type Shared = Arc<Mutex<StubState>>;

pub struct StubBackend {
    pub base_url: String,
    pub state: Shared,
}

impl StubBackend {
    pub async fn start() -> Self {
        Self::start_with(StubState::default()).await
    }

    pub async fn start_with(initial: StubState) -> Self {
        let state: Shared = Arc::new(Mutex::new(initial));

        let app = Router::new()
            .route("/api/testing/reset", post(reset))
            .route("/api/users", post(create_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn snapshot(&self) -> StubState {
        let state = self.state.lock().expect("stub state lock");
        StubState {
            users: state.users.clone(),
            notes: state.notes.clone(),
            resets: state.resets,
            fail_user_creation: state.fail_user_creation,
        }
    }
}

async fn reset(State(state): State<Shared>) -> StatusCode {
    let mut state = state.lock().expect("stub state lock");
    state.users.clear();
    state.notes.clear();
    state.resets += 1;
    StatusCode::NO_CONTENT
}

async fn create_user(State(state): State<Shared>, Json(user): Json<TestUser>) -> StatusCode {
    let mut state = state.lock().expect("stub state lock");
    if state.fail_user_creation {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.users.push(user);
    StatusCode::CREATED
}
