//! HTTP API. One scope per area, each with a `configure_routes()` and one
//! handler module per endpoint.

pub mod content;
pub mod course;
pub mod error;
pub mod media;
pub mod resources;
pub mod state;
pub mod stats;


use crate::services::error::AppError;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{web, HttpResponse};

/// Register every API scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(course::configure_routes())
        .service(content::configure_routes())
        .service(resources::configure_routes())
        .service(stats::configure_routes())
        .service(media::configure_routes());
}

/// Run blocking storage, file or PDF work off the async workers.
pub(crate) async fn blocking<T, E, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    web::block(f).await?.map_err(Into::into)
}

/// A PDF download. The file name is sent both as an ASCII fallback and
/// UTF-8 encoded, since course titles are usually not ASCII.
pub(crate) fn pdf_attachment(file_name: &str, bytes: Vec<u8>) -> HttpResponse {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(ascii),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: file_name.as_bytes().to_vec(),
            }),
        ],
    };
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition)
        .body(bytes)
}
