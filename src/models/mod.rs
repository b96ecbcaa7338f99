pub mod analytics;
pub mod booking;
pub mod itinerary;
pub mod payment;
pub mod user;
