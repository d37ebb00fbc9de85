pub mod gemini;
pub mod http_pool;
