/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - login workflow, guest store, empty mail 設定
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - request 単位の値 (user agent, state) はここに置かない
 */
use std::sync::Arc;

use crate::config::EmptyMailConfig;
use crate::services::guest::GuestStore;
use crate::services::login::LoginService;

#[derive(Clone)]
pub struct AppState {
    pub login: Arc<LoginService>,
    pub guests: Arc<dyn GuestStore>,
    pub empty_mail: Arc<EmptyMailConfig>,
    pub maintenance_mode: bool,
    pub secure_cookies: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("login", &self.login)
            .field("empty_mail", &self.empty_mail)
            .field("maintenance_mode", &self.maintenance_mode)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        login: Arc<LoginService>,
        guests: Arc<dyn GuestStore>,
        empty_mail: EmptyMailConfig,
    ) -> Self {
        Self {
            login,
            guests,
            empty_mail: Arc::new(empty_mail),
            maintenance_mode: false,
            secure_cookies: true,
        }
    }

    pub fn with_maintenance_mode(mut self, on: bool) -> Self {
        self.maintenance_mode = on;
        self
    }

    pub fn with_secure_cookies(mut self, on: bool) -> Self {
        self.secure_cookies = on;
        self
    }
}
