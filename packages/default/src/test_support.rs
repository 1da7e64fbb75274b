//! Helpers shared by the unit tests.

use axum::Router;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::auth::{Claims, Identity};

pub const TEST_SECRET: &[u8] = b"env-service-test-secret";

pub fn far_future() -> usize {
    (Utc::now().timestamp() + 3600) as usize
}

pub fn mint_claims(claims: &Claims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

pub fn mint_token_with_exp(user_id: Uuid, username: &str, exp: usize) -> String {
    mint_claims(&Claims {
        sub: user_id.to_string(),
        preferred_username: Some(username.to_string()),
        exp,
    })
}

pub fn mint_token(user_id: Uuid, username: &str) -> String {
    mint_token_with_exp(user_id, username, far_future())
}

/// An identity whose raw token is just its user name, which is what the
/// fake upstream services key on.
pub fn identity(username: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        username: Some(username.to_string()),
        token: username.to_string(),
    }
}

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
