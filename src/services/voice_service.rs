use std::sync::OnceLock;

use chrono::Utc;
use log::{info, warn};
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::gemini::GeminiClient;

/// Speech-to-text is not wired up; audio-only requests are read as this.
pub const MOCK_TRANSCRIPT: &str = "plan a trip to goa for 3 days";

const TTS_URL: &str = "https://api.example.com/tts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceAction {
    GenerateItinerary,
    ModifyItinerary,
    CheckWeather,
    SearchPlaces,
    BookActivity,
    GetDirections,
    TranslateText,
    EmergencyAssistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceCommand {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    #[serde(skip)]
    pub action: VoiceAction,
    pub description: &'static str,
}

/// Matched in declaration order, so earlier commands win on overlapping
/// keywords ("plan trip" beats "find").
pub const COMMANDS: [VoiceCommand; 8] = [
    VoiceCommand {
        name: "plan_trip",
        keywords: &["plan trip", "create itinerary", "plan vacation", "trip planning", "plan a trip"],
        action: VoiceAction::GenerateItinerary,
        description: "Start planning a new trip",
    },
    VoiceCommand {
        name: "modify_itinerary",
        keywords: &["modify", "change", "update", "edit itinerary"],
        action: VoiceAction::ModifyItinerary,
        description: "Modify existing itinerary",
    },
    VoiceCommand {
        name: "weather_check",
        keywords: &["weather", "forecast", "temperature", "rain"],
        action: VoiceAction::CheckWeather,
        description: "Check weather for destination",
    },
    VoiceCommand {
        name: "find_places",
        keywords: &["find", "search", "nearby", "places", "restaurants"],
        action: VoiceAction::SearchPlaces,
        description: "Search for places and attractions",
    },
    VoiceCommand {
        name: "book_activity",
        keywords: &["book", "reserve", "buy tickets", "booking"],
        action: VoiceAction::BookActivity,
        description: "Book activities and experiences",
    },
    VoiceCommand {
        name: "navigation",
        keywords: &["navigate", "directions", "how to reach", "route"],
        action: VoiceAction::GetDirections,
        description: "Get navigation directions",
    },
    VoiceCommand {
        name: "translate",
        keywords: &["translate", "what does this mean", "language"],
        action: VoiceAction::TranslateText,
        description: "Translate text or phrases",
    },
    VoiceCommand {
        name: "emergency",
        keywords: &["help", "emergency", "sos", "assistance"],
        action: VoiceAction::EmergencyAssistance,
        description: "Get emergency assistance",
    },
];

const ERROR_PROMPTS: [&str; 3] = [
    "I'm sorry, I didn't quite catch that. Could you please repeat?",
    "I'm having trouble understanding. Can you try again?",
    "Let me help you with something else. What would you like to do?",
];

pub fn match_command(transcript: &str) -> Option<&'static VoiceCommand> {
    let transcript = transcript.to_lowercase();
    COMMANDS
        .iter()
        .find(|command| command.keywords.iter().any(|k| transcript.contains(k)))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceRequest {
    pub transcript: Option<String>,
    pub audio_data: Option<String>,
}

/// Spoken reply produced by a command handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub message: String,
    pub next_step: &'static str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Reply {
    fn new(message: impl Into<String>, next_step: &'static str) -> Self {
        Self {
            message: message.into(),
            next_step,
            data: Value::Null,
        }
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Speech {
    pub audio_url: String,
    pub duration: f64,
    pub format: &'static str,
}

pub fn text_to_speech(text: &str) -> Speech {
    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    Speech {
        audio_url: format!("{}?text={}", TTS_URL, encoded),
        duration: text.chars().count() as f64 * 0.1,
        format: "mp3",
    }
}

fn trip_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bto\s+([a-z][a-z ]*?)(?:\s+for\b|\s+in\b|$)").expect("valid trip regex"))
}

fn days_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(?:-\s*)?days?").expect("valid days regex"))
}

/// Destination and day count read straight from the transcript, used when
/// the model cannot extract them.
pub fn extract_trip_locally(transcript: &str) -> Option<Value> {
    let destination = trip_pattern()
        .captures(transcript.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty())?;

    let duration = days_pattern()
        .captures(transcript)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    Some(json!({
        "destination": destination,
        "duration": duration,
        "budget": null,
        "interests": [],
        "travelStyle": null,
        "groupSize": null,
        "startDate": null,
        "specialRequirements": [],
    }))
}

fn field(data: &Value, key: &str, default: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

#[derive(Clone)]
pub struct VoiceAssistant {
    ai: GeminiClient,
}

impl VoiceAssistant {
    pub fn new(ai: GeminiClient) -> Self {
        Self { ai }
    }

    pub async fn process(&self, request: VoiceRequest, user_id: &str) -> Value {
        let transcript = match (request.transcript, request.audio_data) {
            (Some(transcript), _) if !transcript.trim().is_empty() => transcript,
            _ => MOCK_TRANSCRIPT.to_string(),
        };

        let Some(command) = match_command(&transcript) else {
            let prompt = ERROR_PROMPTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(ERROR_PROMPTS[0]);
            return json!({
                "success": false,
                "message": prompt,
                "transcript": transcript,
                "voiceResponse": self.respond(&Reply::new(prompt, "retry")),
            });
        };

        info!("Voice command {} for user {}", command.name, user_id);
        let reply = self.execute(command.action, &transcript).await;

        json!({
            "success": true,
            "command": command.action,
            "result": reply,
            "transcript": transcript,
            "voiceResponse": self.respond(&reply),
        })
    }

    fn respond(&self, reply: &Reply) -> Value {
        json!({
            "text": reply.message,
            "audio": text_to_speech(&reply.message),
            "nextStep": reply.next_step,
            "data": reply.data,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }

    async fn extract(&self, context: &str, instruction: &str, transcript: &str, shape: &str) -> Option<Value> {
        let prompt = format!(
            "{instruction}\n\nTranscript: \"{transcript}\"\n\nReturn in JSON format:\n{shape}"
        );
        match self.ai.generate_object(&prompt).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}: {}", context, e);
                None
            }
        }
    }

    async fn execute(&self, action: VoiceAction, transcript: &str) -> Reply {
        match action {
            VoiceAction::GenerateItinerary => self.plan_trip(transcript).await,
            VoiceAction::ModifyItinerary => {
                match self
                    .extract(
                        "voice modification",
                        "Extract modification request from this voice command:",
                        transcript,
                        r#"{"modificationType": "add/remove/change/reorder", "target": "what to modify", "details": "specific modification details", "day": "which day to modify"}"#,
                    )
                    .await
                {
                    Some(modification) => Reply::new(
                        format!(
                            "I understand you want to {} {}. Let me help you with that.",
                            field(&modification, "modificationType", "change"),
                            field(&modification, "target", "your itinerary"),
                        ),
                        "apply_modification",
                    )
                    .with_data(json!({ "modification": modification })),
                    None => Reply::new(
                        "I heard you want to modify your itinerary. What specific changes would you like to make?",
                        "get_modification_details",
                    ),
                }
            }
            VoiceAction::CheckWeather => {
                match self
                    .extract(
                        "voice weather",
                        "Extract location and date from this weather request:",
                        transcript,
                        r#"{"location": "extracted location", "date": "extracted date or 'today'", "timeframe": "today/tomorrow/this week/specific date"}"#,
                    )
                    .await
                {
                    Some(request) => {
                        let location = field(&request, "location", "your destination");
                        let weather = json!({
                            "location": location,
                            "temperature": "28°C",
                            "condition": "Sunny",
                            "humidity": "65%",
                            "windSpeed": "12 km/h",
                            "forecast": "Clear skies with light breeze",
                        });
                        Reply::new(
                            format!(
                                "The weather in {} is 28°C and Sunny. Clear skies with light breeze",
                                location
                            ),
                            "weather_details",
                        )
                        .with_data(json!({ "weatherData": weather }))
                    }
                    None => Reply::new(
                        "I can help you check the weather. Which location would you like to know about?",
                        "get_location",
                    ),
                }
            }
            VoiceAction::SearchPlaces => {
                match self
                    .extract(
                        "voice place search",
                        "Extract search parameters from this place search request:",
                        transcript,
                        r#"{"query": "what to search for", "location": "where to search", "type": "restaurant/attraction/hotel/activity", "filters": []}"#,
                    )
                    .await
                {
                    Some(search) => {
                        let results = json!([
                            { "name": "Popular Restaurant", "type": "restaurant", "rating": "4.5", "distance": "0.5 km", "description": "Great local cuisine" },
                            { "name": "Historic Landmark", "type": "attraction", "rating": "4.8", "distance": "1.2 km", "description": "Must-visit historical site" }
                        ]);
                        Reply::new(
                            format!(
                                "I found 2 places matching \"{}\". Here are the top results.",
                                field(&search, "query", "your search")
                            ),
                            "show_results",
                        )
                        .with_data(json!({ "searchResults": results }))
                    }
                    None => Reply::new("I can help you find places. What are you looking for?", "get_search_query"),
                }
            }
            VoiceAction::BookActivity => {
                match self
                    .extract(
                        "voice booking",
                        "Extract booking information from this voice command:",
                        transcript,
                        r#"{"item": "hotel/activity/restaurant/transport", "name": "specific name", "date": "booking date", "time": "booking time", "quantity": "number of people"}"#,
                    )
                    .await
                {
                    Some(booking) => Reply::new(
                        format!(
                            "I'll help you book {}. Let me check availability and pricing for you.",
                            field(&booking, "item", "that")
                        ),
                        "confirm_booking",
                    )
                    .with_data(json!({ "bookingInfo": booking })),
                    None => Reply::new("I can help you make bookings. What would you like to book?", "get_booking_details"),
                }
            }
            VoiceAction::GetDirections => {
                match self
                    .extract(
                        "voice navigation",
                        "Extract navigation information from this voice command:",
                        transcript,
                        r#"{"origin": "starting location", "destination": "destination location", "mode": "driving/walking/public transport", "preferences": []}"#,
                    )
                    .await
                {
                    Some(nav) => {
                        let origin = field(&nav, "origin", "your location");
                        let destination = field(&nav, "destination", "your destination");
                        let navigation = json!({
                            "origin": origin,
                            "destination": destination,
                            "distance": "5.2 km",
                            "duration": "15 minutes",
                            "mode": nav.get("mode"),
                            "steps": [
                                "Head north on Main Street",
                                "Turn right at the traffic light",
                                "Continue for 2 km",
                                "Arrive at destination"
                            ],
                        });
                        Reply::new(
                            format!(
                                "I'll guide you from {} to {}. The journey will take about 15 minutes.",
                                origin, destination
                            ),
                            "start_navigation",
                        )
                        .with_data(json!({ "navigationData": navigation }))
                    }
                    None => Reply::new("I can help you with directions. Where would you like to go?", "get_destination"),
                }
            }
            VoiceAction::TranslateText => {
                match self
                    .extract(
                        "voice translation",
                        "Extract translation request from this voice command:",
                        transcript,
                        r#"{"text": "text to translate", "targetLanguage": "target language", "context": "translation context"}"#,
                    )
                    .await
                {
                    Some(request) => {
                        let original = field(&request, "text", "");
                        let language = field(&request, "targetLanguage", "Hindi");
                        let translation = json!({
                            "original": original,
                            "translated": "Translated text in target language",
                            "language": language,
                            "pronunciation": "Pronunciation guide",
                        });
                        Reply::new(
                            format!(
                                "\"{}\" translates to \"Translated text in target language\" in {}.",
                                original, language
                            ),
                            "show_translation",
                        )
                        .with_data(json!({ "translation": translation }))
                    }
                    None => Reply::new("I can help you translate. What would you like to translate?", "get_translation_text"),
                }
            }
            VoiceAction::EmergencyAssistance => {
                let contacts = json!({ "police": "100", "medical": "108", "fire": "101", "general": "112" });
                match self
                    .extract(
                        "voice emergency",
                        "Extract emergency information from this voice command:",
                        transcript,
                        r#"{"emergencyType": "medical/police/fire/other", "location": "current location", "description": "description of emergency", "urgency": "high/medium/low"}"#,
                    )
                    .await
                {
                    Some(emergency) => Reply::new(
                        format!(
                            "I understand you need {} assistance. I'm connecting you to the appropriate emergency services.",
                            field(&emergency, "emergencyType", "emergency")
                        ),
                        "connect_emergency",
                    )
                    .with_data(json!({ "emergencyInfo": emergency, "contacts": contacts })),
                    None => Reply::new(
                        "I understand you need emergency assistance. I'm here to help. What type of emergency are you experiencing?",
                        "get_emergency_details",
                    )
                    .with_data(json!({ "contacts": contacts })),
                }
            }
        }
    }

    async fn plan_trip(&self, transcript: &str) -> Reply {
        let extracted = match self
            .extract(
                "voice trip planning",
                "Extract trip planning information from this voice command. If any information is not mentioned, use null or empty array.",
                transcript,
                r#"{"destination": "extracted destination", "duration": "duration in days", "budget": "budget if mentioned", "interests": [], "travelStyle": "travel style", "groupSize": "group size", "startDate": "start date", "specialRequirements": []}"#,
            )
            .await
        {
            Some(data) => Some(data),
            None => extract_trip_locally(transcript),
        };

        match extracted {
            Some(data) => Reply::new(
                format!(
                    "Great! I'll help you plan a {}-day trip to {}. Let me create a personalized itinerary for you.",
                    field(&data, "duration", "few"),
                    field(&data, "destination", "your destination"),
                ),
                "confirm_details",
            )
            .with_data(json!({ "extractedData": data })),
            None => Reply::new(
                "I heard you want to plan a trip. Could you tell me your destination and how many days you want to travel?",
                "get_more_info",
            ),
        }
    }
}

pub fn available_commands() -> &'static [VoiceCommand] {
    &COMMANDS
}

pub fn status() -> Value {
    json!({
        "active": true,
        "language": "en",
        "supportedCommands": COMMANDS.len(),
        "lastActivity": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_match_in_declaration_order() {
        assert_eq!(match_command("Plan a trip to Goa").map(|c| c.name), Some("plan_trip"));
        assert_eq!(match_command("what's the WEATHER like").map(|c| c.name), Some("weather_check"));
        // "change" belongs to modify_itinerary, which is declared before book_activity.
        assert_eq!(match_command("change my booking").map(|c| c.name), Some("modify_itinerary"));
        assert_eq!(match_command("directions to the fort").map(|c| c.name), Some("navigation"));
        assert_eq!(match_command("sing me a song"), None);
    }

    #[test]
    fn test_local_trip_extraction() {
        let data = extract_trip_locally(MOCK_TRANSCRIPT).unwrap();
        assert_eq!(data["destination"], "goa");
        assert_eq!(data["duration"], 3);

        let data = extract_trip_locally("take me to Jaipur").unwrap();
        assert_eq!(data["destination"], "Jaipur");
        assert!(data["duration"].is_null());

        assert!(extract_trip_locally("plan something fun").is_none());
    }

    #[test]
    fn test_text_to_speech_descriptor() {
        let speech = text_to_speech("Hello there");
        assert_eq!(speech.audio_url, "https://api.example.com/tts?text=Hello+there");
        assert!((speech.duration - 1.1).abs() < 1e-9);
        assert_eq!(speech.format, "mp3");
    }

    #[actix_rt::test]
    async fn test_process_without_ai() {
        let assistant = VoiceAssistant::new(GeminiClient::new(None, "gemini-pro"));

        let response = assistant.process(VoiceRequest::default(), "demo-user").await;
        assert_eq!(response["success"], true);
        assert_eq!(response["command"], "generateItinerary");
        assert_eq!(response["transcript"], MOCK_TRANSCRIPT);
        assert_eq!(response["result"]["nextStep"], "confirm_details");
        assert_eq!(response["result"]["data"]["extractedData"]["destination"], "goa");

        let unknown = VoiceRequest {
            transcript: Some("sing me a song".to_string()),
            audio_data: None,
        };
        let response = assistant.process(unknown, "demo-user").await;
        assert_eq!(response["success"], false);
        let message = response["message"].as_str().unwrap();
        assert!(ERROR_PROMPTS.iter().any(|prompt| *prompt == message));
    }

    #[test]
    fn test_status_counts_commands() {
        assert_eq!(status()["supportedCommands"], 8);
        assert_eq!(available_commands().len(), 8);
    }
}
