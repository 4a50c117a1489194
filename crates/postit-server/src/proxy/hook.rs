use axum::response::Response;

/// Last look at an upstream response before it is relayed to the caller.
pub trait ResponseHook: Send + Sync + 'static {
    fn on_response(&self, response: Response) -> Response;
}

/// Relays every response untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ResponseHook for PassThrough {
    fn on_response(&self, response: Response) -> Response {
        response
    }
}
