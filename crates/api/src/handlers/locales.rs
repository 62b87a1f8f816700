//! Locale registry endpoint.

use axum::Json;
use sharayeh_core::locale::{Locale, LocaleInfo};

use crate::response::DataResponse;

/// GET /api/v1/locales
pub async fn list_locales() -> Json<DataResponse<&'static [LocaleInfo]>> {
    Json(DataResponse {
        data: Locale::all(),
    })
}
