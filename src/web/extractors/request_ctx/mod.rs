/*!
 * Request context extractor
 *
 * Public API:
 * - RequestCtx
 * - RequestCtxExtractor
 */

mod core;
mod types;

pub use core::RequestCtxExtractor;
pub use types::RequestCtx;
