/*
 * Responsibility
 * - template 名 + model を返す (HTML 化は front 側の renderer が担当)
 * - handler/error から同じ形で返せるように IntoResponse を実装
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone)]
pub struct View {
    status: StatusCode,
    name: &'static str,
    model: Map<String, Value>,
}

impl View {
    pub fn new(name: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            name,
            model: Map::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        // Model values are plain data; a failed conversion renders as null.
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.model.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "view": self.name, "model": self.model })),
        )
            .into_response()
    }
}
