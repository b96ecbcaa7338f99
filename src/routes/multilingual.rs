use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::routes::{required, success};
use crate::services::multilingual_service::{
    cultural_context, find_language, supported_languages, LANGUAGES,
};
use crate::state::AppState;

const DEFAULT_LANGUAGE: &str = "hi";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateInput {
    #[serde(default)]
    pub content: Value,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DestinationLanguageInput {
    pub destination: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetectInput {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocalizeInput {
    #[serde(default)]
    pub itinerary: Value,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguagesQuery {
    pub destination: Option<String>,
}

pub async fn translate(
    state: web::Data<AppState>,
    input: web::Json<TranslateInput>,
) -> ApiResult<HttpResponse> {
    if input.content.is_null() {
        return Err(ApiError::BadRequest("Content is required".to_string()));
    }
    let target = required(input.target_language.as_deref(), "Target language is required")?;

    let translated = state
        .multilingual
        .translate(&input.content, target, input.source_language.as_deref())
        .await;
    Ok(success(
        "translatedContent",
        translated,
        "Content translated successfully!",
    ))
}

pub async fn phrases(
    state: web::Data<AppState>,
    input: web::Json<DestinationLanguageInput>,
) -> ApiResult<HttpResponse> {
    let destination = required(input.destination.as_deref(), "Destination is required")?;
    let language = input.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
    let phrases = state.multilingual.travel_phrases(destination, language).await;
    Ok(success("phrases", phrases, "Travel phrases generated successfully!"))
}

pub async fn detect(state: web::Data<AppState>, input: web::Json<DetectInput>) -> ApiResult<HttpResponse> {
    let text = required(input.text.as_deref(), "Text is required")?;
    let code = state.multilingual.detect_language(text).await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "language": code,
        "details": find_language(code),
        "message": "Language detected successfully",
    })))
}

pub async fn cultural_tips(
    state: web::Data<AppState>,
    input: web::Json<DestinationLanguageInput>,
) -> ApiResult<HttpResponse> {
    let destination = required(input.destination.as_deref(), "Destination is required")?;
    let language = input.language.as_deref().unwrap_or("en");
    let tips = state.multilingual.cultural_tips(destination, language).await;
    Ok(success("tips", tips, "Cultural tips generated successfully"))
}

pub async fn localize_itinerary(
    state: web::Data<AppState>,
    input: web::Json<LocalizeInput>,
) -> ApiResult<HttpResponse> {
    if input.itinerary.is_null() {
        return Err(ApiError::BadRequest("Itinerary is required".to_string()));
    }
    let language = required(input.language.as_deref(), "Language is required")?;
    let localized = state
        .multilingual
        .localize_itinerary(&input.itinerary, language)
        .await;
    Ok(success("itinerary", localized, "Itinerary localized successfully"))
}

/// All supported languages, or the ones relevant to `?destination=`.
pub async fn languages(query: web::Query<LanguagesQuery>) -> HttpResponse {
    let languages = match query.destination.as_deref() {
        Some(destination) if !destination.trim().is_empty() => supported_languages(destination),
        _ => LANGUAGES.to_vec(),
    };
    success("languages", languages, "Supported languages retrieved successfully")
}

pub async fn context(path: web::Path<String>) -> HttpResponse {
    success(
        "context",
        cultural_context(&path),
        "Cultural context retrieved successfully",
    )
}
