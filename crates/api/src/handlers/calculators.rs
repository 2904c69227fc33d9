//! Public marketing calculators.

use axum::extract::Path;
use axum::Json;
use serde::Serialize;
use vurp_core::calculators::{calculate, CalculatorInput, MetricKind, MetricResult, ALL_METRICS};

use crate::error::AppResult;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct CalculatorList {
    pub kinds: Vec<&'static str>,
}

/// GET /api/v1/calculators
pub async fn list_calculators() -> Json<DataResponse<CalculatorList>> {
    Json(DataResponse {
        data: CalculatorList {
            kinds: ALL_METRICS.iter().map(|k| k.as_str()).collect(),
        },
    })
}

/// POST /api/v1/calculators/{kind}
///
/// Unknown kinds, missing inputs, negative inputs, and zero denominators
/// are all 400.
pub async fn run_calculator(
    Path(kind): Path<String>,
    Json(input): Json<CalculatorInput>,
) -> AppResult<Json<DataResponse<MetricResult>>> {
    let kind = MetricKind::parse(&kind)?;
    let result = calculate(kind, &input)?;
    Ok(Json(DataResponse { data: result }))
}
