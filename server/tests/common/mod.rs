use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tower::ServiceExt;

use volunteer_server::routes::api_routes;
use volunteer_server::state::AppState;
use volunteer_server::utils::clock::FixedClock;

pub fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap()
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Fresh in-memory app whose clock is frozen at `now`.
    pub fn at(now: NaiveDateTime) -> Self {
        let state = AppState::in_memory(Arc::new(FixedClock(now)));
        Self {
            router: api_routes(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// POST and return `data.id` of the created record.
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, json) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn volunteer(
        &self,
        first: &str,
        last: &str,
        birth_date: Option<&str>,
        gender: Option<&str>,
    ) -> String {
        self.create(
            "/api/users",
            serde_json::json!({
                "first_name": first,
                "last_name": last,
                "email_address": format!(
                    "{}.{}@example.org",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
                "password": "correct horse battery staple",
                "birth_date": birth_date,
                "gender": gender,
            }),
        )
        .await
    }
}
