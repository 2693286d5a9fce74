#![allow(dead_code)]

pub mod backend;
pub mod logs;
pub mod renderer;

pub use backend::RecordingBackend;
pub use logs::LogCapture;
pub use renderer::{CountingRenderer, RenderFailed};

use http::header::USER_AGENT;
use http::{HeaderMap, HeaderValue};
use rendercache::{RenderContext, RequestInfo};

pub fn context() -> RenderContext {
    RenderContext::default()
}

pub fn context_for(hostname: &str, user_agent: &str) -> RenderContext {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent).unwrap());
    RequestInfo::new()
        .with_hostname(hostname)
        .with_headers(headers)
        .into()
}
