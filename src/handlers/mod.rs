pub mod health_handlers;
pub mod viewer_handlers;
