/*
 * Responsibility
 * - 外部との I/O (Core API, cache) と login workflow をまとめる
 */
pub mod cache;
pub mod core_api;
pub mod guest;
pub mod login;
pub mod random;
