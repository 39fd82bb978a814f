pub mod http_email_service;
pub mod log_email_service;
pub mod smtp_email_service;
