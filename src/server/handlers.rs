//! Route handlers.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
    Json,
};

use crate::audio::{AudioBlob, AudioFormat};
use crate::pipeline::ResponsePayload;

use super::error::ApiError;
use super::state::AppState;

/// Multipart field carrying the recording.
pub const AUDIO_FIELD: &str = "audio";

/// Minimal recorder page: capture from the microphone, upload, play back.
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /voice-agent`
pub async fn voice_agent(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResponsePayload>, ApiError> {
    let blob = match multipart {
        Ok(multipart) => read_audio_part(multipart).await?,
        Err(rejection) => {
            log::debug!("voice-agent: not a multipart body: {rejection}");
            None
        }
    };
    let blob = blob.ok_or_else(ApiError::no_audio)?;

    log::info!("voice-agent: received {} bytes of {}", blob.len(), blob.format);

    // Own task: a client that hangs up must not cancel a run midway.
    let pipeline = state.pipeline.clone();
    let outcome = tokio::spawn(async move { pipeline.run(blob).await })
        .await
        .map_err(|e| {
            log::error!("voice-agent: pipeline task failed: {e}");
            ApiError::internal(format!("pipeline task failed: {e}"))
        })?;

    match outcome {
        Ok(payload) => Ok(Json(payload)),
        Err(err) => {
            log::error!("voice-agent: {} stage failed: {err}", err.stage());
            Err(err.into())
        }
    }
}

/// First file part named [`AUDIO_FIELD`]; other fields are skipped.
async fn read_audio_part(mut multipart: Multipart) -> Result<Option<AudioBlob>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(AUDIO_FIELD) || field.file_name().is_none() {
            continue;
        }

        let format = AudioFormat::detect(field.file_name(), field.content_type());
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
        return Ok(Some(AudioBlob::new(bytes.to_vec(), format)));
    }
    Ok(None)
}
