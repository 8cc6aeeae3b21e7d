pub mod analytics;
pub mod bundles;
pub mod health;
pub mod stores;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
