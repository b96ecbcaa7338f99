use std::sync::Arc;

use mongodb::{Client, Database};

use crate::config::AppConfig;
use crate::services::{
    ai_service::ItineraryAi, analytics_service::AnalyticsService, ar_service::ArService,
    booking_service::BookingService, emt_service::EmtClient, gemini::GeminiClient,
    maps_service::MapsClient, multilingual_service::MultilingualService,
    notification_service::NotificationService, payment::PaymentService,
    sustainability_service::SustainabilityService, trip_service::TripService,
    user_service::UserService, voice_service::VoiceAssistant,
};

/// Everything a request handler can reach, built once at startup and shared
/// across workers through `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub ai: GeminiClient,
    pub itineraries: ItineraryAi,
    pub users: UserService,
    pub trips: TripService,
    pub sustainability: SustainabilityService,
    pub analytics: AnalyticsService,
    pub emt: EmtClient,
    pub bookings: BookingService,
    pub payments: PaymentService,
    pub maps: MapsClient,
    pub multilingual: MultilingualService,
    pub voice: VoiceAssistant,
    pub ar: ArService,
    pub notifications: NotificationService,
}

impl AppState {
    pub fn new(config: AppConfig, client: Arc<Client>) -> Self {
        let db = client.database(&config.database);
        let ai = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
        let trips = TripService::new(&db);
        let notifications = NotificationService;

        Self {
            itineraries: ItineraryAi::new(ai.clone(), trips.clone()),
            users: UserService::new(&db, &config),
            sustainability: SustainabilityService::new(ai.clone()),
            analytics: AnalyticsService::new(&db, ai.clone(), trips.clone()),
            emt: EmtClient::new(config.emt_base_url.clone(), config.emt_api_key.clone()),
            bookings: BookingService::new(
                &db,
                trips.clone(),
                notifications.clone(),
                config.emt_api_url.clone(),
                config.emt_api_key.clone(),
            ),
            payments: PaymentService::new(&db, &config),
            maps: MapsClient::new(
                config.google_maps_api_key.clone(),
                config.openweather_api_key.clone(),
            ),
            multilingual: MultilingualService::new(ai.clone()),
            voice: VoiceAssistant::new(ai.clone()),
            ar: ArService::new(ai.clone()),
            notifications,
            trips,
            ai,
            db,
            config,
        }
    }
}
