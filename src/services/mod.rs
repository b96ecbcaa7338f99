pub mod ai_service;
pub mod analytics_service;
pub mod ar_service;
pub mod booking_service;
pub mod emt_service;
pub mod gemini;
pub mod maps_service;
pub mod multilingual_service;
pub mod notification_service;
pub mod payment;
pub mod sustainability_service;
pub mod trip_service;
pub mod user_service;
pub mod voice_service;
