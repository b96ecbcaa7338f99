use log::warn;
use serde::Serialize;
use serde_json::{json, Value};

use crate::services::gemini::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native: &'static str,
    pub region: &'static str,
}

const fn language(code: &'static str, name: &'static str, native: &'static str, region: &'static str) -> Language {
    Language {
        code,
        name,
        native,
        region,
    }
}

pub const LANGUAGES: [Language; 13] = [
    language("hi", "Hindi", "हिन्दी", "North India"),
    language("bn", "Bengali", "বাংলা", "West Bengal"),
    language("te", "Telugu", "తెలుగు", "Telangana, Andhra Pradesh"),
    language("mr", "Marathi", "मराठी", "Maharashtra"),
    language("ta", "Tamil", "தமிழ்", "Tamil Nadu"),
    language("gu", "Gujarati", "ગુજરાતી", "Gujarat"),
    language("kn", "Kannada", "ಕನ್ನಡ", "Karnataka"),
    language("ml", "Malayalam", "മലയാളം", "Kerala"),
    language("pa", "Punjabi", "ਪੰਜਾਬੀ", "Punjab"),
    language("or", "Odia", "ଓଡ଼ିଆ", "Odisha"),
    language("as", "Assamese", "অসমীয়া", "Assam"),
    language("ne", "Nepali", "नेपाली", "Sikkim"),
    language("en", "English", "English", "All India"),
];

pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

pub struct RegionalContext {
    pub region: &'static str,
    pub languages: &'static [&'static str],
    pub culture: &'static str,
    pub greetings: &'static [&'static str],
}

pub const REGIONS: [RegionalContext; 4] = [
    RegionalContext {
        region: "North India",
        languages: &["hi", "pa", "en"],
        culture: "Rich Mughal heritage, Bollywood, diverse cuisine",
        greetings: &["Namaste", "Sat Sri Akal", "Hello"],
    },
    RegionalContext {
        region: "South India",
        languages: &["te", "ta", "kn", "ml", "en"],
        culture: "Temple architecture, classical music, spicy cuisine",
        greetings: &["Namaskaram", "Vanakkam", "Hello"],
    },
    RegionalContext {
        region: "East India",
        languages: &["bn", "or", "as", "en"],
        culture: "Literature, festivals, fish curry",
        greetings: &["Namaskar", "Namaskar", "Hello"],
    },
    RegionalContext {
        region: "West India",
        languages: &["mr", "gu", "en"],
        culture: "Maritime heritage, business culture, diverse food",
        greetings: &["Namaskar", "Jai Shri Krishna", "Hello"],
    },
];

const CITY_REGIONS: [(&str, &str); 20] = [
    ("Mumbai", "West India"),
    ("Delhi", "North India"),
    ("Bangalore", "South India"),
    ("Chennai", "South India"),
    ("Kolkata", "East India"),
    ("Hyderabad", "South India"),
    ("Pune", "West India"),
    ("Ahmedabad", "West India"),
    ("Jaipur", "North India"),
    ("Goa", "West India"),
    ("Kochi", "South India"),
    ("Mysore", "South India"),
    ("Udaipur", "North India"),
    ("Jodhpur", "North India"),
    ("Varanasi", "North India"),
    ("Agra", "North India"),
    ("Amritsar", "North India"),
    ("Chandigarh", "North India"),
    ("Bhubaneswar", "East India"),
    ("Guwahati", "East India"),
];

const DEFAULT_REGION: &str = "North India";
const DEFAULT_GREETINGS: [&str; 2] = ["Hello", "Namaste"];

/// Exact city name match; anything else is treated as North India.
pub fn region_for(destination: &str) -> &'static str {
    CITY_REGIONS
        .iter()
        .find(|(city, _)| *city == destination)
        .map(|(_, region)| *region)
        .unwrap_or(DEFAULT_REGION)
}

pub fn regional_context(region: &str) -> Option<&'static RegionalContext> {
    REGIONS.iter().find(|context| context.region == region)
}

pub fn greetings(region: &str) -> Vec<&'static str> {
    regional_context(region)
        .map(|context| context.greetings.to_vec())
        .unwrap_or_else(|| DEFAULT_GREETINGS.to_vec())
}

pub fn cultural_context(destination: &str) -> Value {
    let region = region_for(destination);
    match regional_context(region) {
        Some(context) => json!({
            "region": region,
            "languages": context.languages,
            "culture": context.culture,
            "greetings": context.greetings,
        }),
        None => json!({
            "region": region,
            "languages": ["en"],
            "culture": "Rich cultural heritage",
            "greetings": DEFAULT_GREETINGS,
        }),
    }
}

/// Languages spoken in the destination's region, English included.
pub fn supported_languages(destination: &str) -> Vec<Language> {
    let Some(context) = regional_context(region_for(destination)) else {
        return find_language("en").into_iter().copied().collect();
    };

    context
        .languages
        .iter()
        .filter_map(|code| find_language(code))
        .copied()
        .collect()
}

/// Rupee amount with Indian digit grouping (`₹12,34,567.5`).
pub fn format_inr(amount: f64) -> String {
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let fraction = match cents {
        0 => String::new(),
        c if c % 10 == 0 => format!(".{}", c / 10),
        c => format!(".{:02}", c),
    };
    let sign = if amount < 0.0 && (whole > 0 || cents > 0) { "-" } else { "" };

    format!("{}₹{}{}", sign, grouped, fraction)
}

pub fn fallback_phrases(language: &str) -> Value {
    match language {
        "te" => json!({
            "greetings": ["నమస్కారం (Namaskaram)", "మీరు ఎలా ఉన్నారు? (How are you?)"],
            "directions": ["దయచేసి మార్గం చూపించండి (Please show the way)", "ఇక్కడ ఎలా చేరుకోవాలి? (How to reach here?)"],
            "food": ["నాకు ఆకలి వేస్తోంది (I am hungry)", "ఇది ఏమిటి? (What is this?)"],
            "emergency": ["సహాయం! (Help!)", "పోలీస్! (Police!)"],
        }),
        "ta" => json!({
            "greetings": ["வணக்கம் (Vanakkam)", "நீங்கள் எப்படி இருக்கிறீர்கள்? (How are you?)"],
            "directions": ["தயவுசெய்து வழி காட்டுங்கள் (Please show the way)", "இங்கே எப்படி வருவது? (How to reach here?)"],
            "food": ["எனக்கு பசிக்கிறது (I am hungry)", "இது என்ன? (What is this?)"],
            "emergency": ["உதவி! (Help!)", "காவல்துறை! (Police!)"],
        }),
        "bn" => json!({
            "greetings": ["নমস্কার (Namaskar)", "আপনি কেমন আছেন? (How are you?)"],
            "directions": ["দয়া করে পথ দেখান (Please show the way)", "এখানে কীভাবে আসব? (How to reach here?)"],
            "food": ["আমার ক্ষুধা পেয়েছে (I am hungry)", "এটা কী? (What is this?)"],
            "emergency": ["সাহায্য! (Help!)", "পুলিশ! (Police!)"],
        }),
        _ => json!({
            "greetings": ["नमस्ते (Namaste)", "आप कैसे हैं? (How are you?)"],
            "directions": ["कृपया मार्ग बताएं (Please show the way)", "यहाँ कैसे पहुँचें? (How to reach here?)"],
            "food": ["मुझे भूख लगी है (I am hungry)", "यह क्या है? (What is this?)"],
            "emergency": ["मदद! (Help!)", "पुलिस! (Police!)"],
        }),
    }
}

pub fn fallback_cultural_tips() -> Value {
    json!({
        "etiquette": [
            "Remove shoes before entering homes and temples",
            "Use right hand for eating and greeting",
            "Dress modestly, especially at religious sites"
        ],
        "communication": [
            "Learn basic greetings in local language",
            "Be patient and respectful in conversations",
            "Avoid pointing with index finger"
        ],
        "dining": [
            "Try local cuisine and street food",
            "Ask about ingredients if you have allergies",
            "Don't waste food - it's considered disrespectful"
        ],
        "photography": [
            "Ask permission before photographing people",
            "Respect \"no photography\" signs at religious sites",
            "Be mindful of cultural sensitivities"
        ]
    })
}

/// Normalises a model reply to a known language code.
pub fn parse_language_code(reply: &str) -> &'static str {
    let code = reply.trim().trim_matches(|c| c == '\'' || c == '"' || c == '`').to_lowercase();
    find_language(&code).map_or("en", |lang| lang.code)
}

#[derive(Clone)]
pub struct MultilingualService {
    ai: GeminiClient,
}

impl MultilingualService {
    pub fn new(ai: GeminiClient) -> Self {
        Self { ai }
    }

    /// Translated content, or the input unchanged when translation fails.
    pub async fn translate(&self, content: &Value, target: &str, source: Option<&str>) -> Value {
        let prompt = format!(
            r#"Translate the following travel content from {} to {}:

Content: {}

Requirements:
1. Maintain cultural context and local terminology
2. Use appropriate regional expressions
3. Keep travel-specific terms clear and understandable
4. Preserve formatting and structure
5. Include cultural nuances where relevant

Return the translated content in the same JSON structure."#,
            source.unwrap_or("en"),
            target,
            content,
        );

        self.ai
            .object_or("translation", &prompt, || content.clone())
            .await
    }

    pub async fn travel_phrases(&self, destination: &str, language: &str) -> Value {
        let prompt = format!(
            r#"Generate essential travel phrases in {language} for visiting {destination}:

Include:
1. Basic greetings and politeness
2. Directions and transportation
3. Food and dining
4. Shopping and bargaining
5. Emergency situations
6. Cultural etiquette

Format as JSON with categories and phrases."#
        );

        self.ai
            .object_or("travel phrases", &prompt, || fallback_phrases(language))
            .await
    }

    pub async fn detect_language(&self, text: &str) -> &'static str {
        let prompt = format!(
            r#"Detect the language of this text and return the language code:

Text: "{text}"

Return only the language code (e.g., 'hi', 'en', 'te', 'ta', 'bn')."#
        );

        match self.ai.generate(&prompt).await {
            Ok(reply) => parse_language_code(&reply),
            Err(e) => {
                warn!("Language detection failed: {}", e);
                "en"
            }
        }
    }

    pub async fn cultural_tips(&self, destination: &str, language: &str) -> Value {
        let prompt = format!(
            r#"Provide cultural tips for {language} speakers visiting {destination}:

Include:
1. Cultural etiquette and customs
2. Dress code recommendations
3. Religious and social norms
4. Communication styles
5. Food and dining customs
6. Photography and social media etiquette
7. Gift-giving traditions
8. Business etiquette (if applicable)

Format as JSON with categories and tips."#
        );

        self.ai
            .object_or("cultural tips", &prompt, fallback_cultural_tips)
            .await
    }

    /// Localized itinerary, or the input unchanged when localization fails.
    pub async fn localize_itinerary(&self, itinerary: &Value, language: &str) -> Value {
        let prompt = format!(
            r#"Localize this travel itinerary for {language} speakers:

Itinerary: {itinerary}

Requirements:
1. Translate all text content to {language}
2. Adapt cultural references for local context
3. Include local customs and etiquette
4. Suggest region-specific alternatives
5. Add local language phrases for each activity
6. Maintain the JSON structure

Return the localized itinerary."#
        );

        self.ai
            .object_or("itinerary localization", &prompt, || itinerary.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr_groups_indian_style() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1000.0), "₹1,000");
        assert_eq!(format_inr(123456.0), "₹1,23,456");
        assert_eq!(format_inr(12345678.0), "₹1,23,45,678");
        assert_eq!(format_inr(1500.5), "₹1,500.5");
        assert_eq!(format_inr(-2500.25), "-₹2,500.25");
    }

    #[test]
    fn test_region_lookup_defaults_to_north() {
        assert_eq!(region_for("Mumbai"), "West India");
        assert_eq!(region_for("Guwahati"), "East India");
        assert_eq!(region_for("Shimla"), "North India");
        assert_eq!(greetings("South India"), vec!["Namaskaram", "Vanakkam", "Hello"]);
        assert_eq!(greetings("Atlantis"), vec!["Hello", "Namaste"]);
    }

    #[test]
    fn test_supported_languages_for_region() {
        let codes: Vec<&str> = supported_languages("Chennai").iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["te", "ta", "kn", "ml", "en"]);

        let context = cultural_context("Kolkata");
        assert_eq!(context["region"], "East India");
        assert_eq!(context["languages"], json!(["bn", "or", "as", "en"]));
    }

    #[test]
    fn test_language_code_parsing() {
        assert_eq!(parse_language_code(" HI \n"), "hi");
        assert_eq!(parse_language_code("'ta'"), "ta");
        assert_eq!(parse_language_code("klingon"), "en");
    }

    #[test]
    fn test_fallback_phrases_default_to_hindi() {
        assert_eq!(fallback_phrases("fr"), fallback_phrases("hi"));
        assert_ne!(fallback_phrases("ta"), fallback_phrases("hi"));
    }

    #[actix_rt::test]
    async fn test_translation_returns_input_without_ai() {
        let service = MultilingualService::new(GeminiClient::new(None, "gemini-pro"));
        let content = json!({ "title": "Day in Jaipur" });

        assert_eq!(service.translate(&content, "hi", None).await, content);
        assert_eq!(service.detect_language("namaste").await, "en");
    }
}
