/*
 * Responsibility
 * - middleware の公開インターフェース
 * - interceptor (user agent / maintenance) と横断的な HTTP layer
 */
pub mod http;
pub mod maintenance;
pub mod security_headers;
pub mod user_agent;
