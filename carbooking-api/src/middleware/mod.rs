/// Middleware modules for the API server
///
/// JWT authentication lives in `app::build_router`; this module holds the
/// tower layers applied to every response.

pub mod security;
