/// HTTP middleware for the API server
///
/// Authentication lives in `todoapp_shared::auth::middleware`; this module
/// holds the response hardening applied to every route.

pub mod security;
