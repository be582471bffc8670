//! Image generation, speech synthesis and transcription.
//!
//! * `POST /api/media/image`: generate an image and store it as PNG.
//! * `POST /api/media/speech`: synthesize mp3 audio.
//! * `POST /api/media/transcribe`: multipart upload (`file`, optional
//!   `language`) to text.
//! * `GET /api/media/files/{name}`: a stored media file.
//!
//! Generated files are not resources until they are saved through
//! `POST /api/resources`.

mod files;
mod image;
mod speech;
mod transcribe;

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::requests::MediaFile;
use std::path::Path;

const API_PATH: &str = "/api/media";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/image", post().to(image::process))
        .route("/speech", post().to(speech::process))
        .route("/transcribe", post().to(transcribe::process))
        .route("/files/{name}", get().to(files::process))
}

fn media_file(path: &Path) -> MediaFile {
    MediaFile {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_path: path.to_string_lossy().into_owned(),
    }
}
