/*
 * Responsibility
 * - Handler から見える「リクエスト単位のコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - user agent は Core API (COR-901) にそのまま転送する
 */

/// Per-request values captured by the user-agent interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCtx {
    pub user_agent: String,
}

impl RequestCtx {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}
