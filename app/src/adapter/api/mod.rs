mod dashboard;

use actix_web::{HttpResponse, ResponseError, http::header, web};
use anyhow::Context;
use derive_more::derive::{Display, Error};

use crate::dashboard::DashboardClient;

type ApiResponse = Result<HttpResponse, ApiError>;

pub fn routes(client: DashboardClient) -> actix_web::Scope {
    web::scope("/api").service(dashboard::routes(client))
}

#[derive(Debug, Error, Display)]
enum ApiError {
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),

    #[display("No floorplan loaded yet")]
    NoFloorplan,

    #[display("Error accessing the dashboard engine")]
    EngineError(anyhow::Error),

    #[display("Internal error")]
    InternalError(anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        tracing::warn!("ApiError: {:?}", self);

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoFloorplan => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn csv_response<S: serde::Serialize>(rows: impl IntoIterator<Item = S>) -> ApiResponse {
    let mut writer = csv::Writer::from_writer(vec![]);

    for row in rows {
        writer
            .serialize(row)
            .context("Error serializing row to CSV")
            .map_err(ApiError::InternalError)?;
    }

    let csv = writer
        .into_inner()
        .context("Error creating CSV")
        .map_err(ApiError::InternalError)?;

    Ok(HttpResponse::Ok()
        .append_header(header::ContentType(mime::TEXT_CSV))
        .body(csv))
}
