use std::sync::Arc;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::Form;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::LatticeResult;
use crate::models::lattice::{generate_lattice, LatticeParameters};
use crate::server::page;
use crate::server::AppState;
use crate::visualisations::{render_lattice, LatticeGraph};

/// The form takes its horizon in weeks; the lattice works in years.
pub const WEEKS_PER_YEAR: f64 = 52.0;

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LatticeForm {
    pub stock_price: f64,
    /// Time to expiry in weeks.
    pub time: f64,
    pub volatility: f64,
    pub steps: usize,
}

impl Default for LatticeForm {
    fn default() -> Self {
        Self { stock_price: 18.0, time: 52.0, volatility: 0.2, steps: 4 }
    }
}

impl LatticeForm {
    pub fn to_params(&self) -> LatticeResult<LatticeParameters> {
        LatticeParameters::new(
            self.stock_price,
            self.time / WEEKS_PER_YEAR,
            self.volatility,
            self.steps,
        )
    }
}

/// GET / -- empty parameter form
pub async fn index() -> Html<String> {
    Html(page::render(&LatticeForm::default(), None, None))
}

/// POST / -- render the lattice and embed it as a base64 SVG image
pub async fn render_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LatticeForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!("malformed lattice form: {rejection}");
            let message = format!("invalid form input: {}", rejection.body_text());
            let page = page::render(&LatticeForm::default(), None, Some(&message));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page));
        }
    };

    let image = form
        .to_params()
        .and_then(|params| render_lattice(&params))
        .and_then(|figure| figure.to_svg(state.config.figure_size));

    match image {
        Ok(svg) => {
            let data_uri = format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg));
            (StatusCode::OK, Html(page::render(&form, Some(&data_uri), None)))
        }
        Err(e) => {
            tracing::warn!("lattice request rejected: {e}");
            let status = if e.is_parameter_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Html(page::render(&form, None, Some(&e.to_string()))))
        }
    }
}

/// GET /api/lattice -- price levels plus the positioned graph as JSON
pub async fn api_lattice(
    query: Result<Query<LatticeForm>, QueryRejection>,
) -> (StatusCode, Json<serde_json::Value>) {
    let form = match query {
        Ok(Query(form)) => form,
        Err(rejection) => {
            tracing::warn!("malformed lattice query: {rejection}");
            let message = format!("invalid query: {}", rejection.body_text());
            let body = serde_json::json!({ "error": message });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body));
        }
    };

    let result = form.to_params().and_then(|params| generate_lattice(&params));
    match result {
        Ok(lattice) => {
            let graph = LatticeGraph::from_lattice(&lattice);
            let nodes: Vec<serde_json::Value> = graph
                .nodes()
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "id": n.id,
                        "price": n.price,
                        "label": n.label(),
                        "x": n.x,
                        "y": n.y,
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "params": lattice.params,
                    "dt": lattice.dt,
                    "up": lattice.up,
                    "down": lattice.down,
                    "levels": lattice.levels(),
                    "nodes": nodes,
                    "edges": graph.edges(),
                })),
            )
        }
        Err(e) => {
            tracing::warn!("lattice api request rejected: {e}");
            let body = serde_json::json!({ "error": e.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body))
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weeks_converted_to_years() {
        let form = LatticeForm { stock_price: 18.0, time: 26.0, volatility: 0.2, steps: 2 };
        let params = form.to_params().unwrap();
        assert_relative_eq!(params.time_horizon, 0.5);
        assert_eq!(params.steps, 2);
    }

    #[test]
    fn test_default_form_is_valid() {
        let params = LatticeForm::default().to_params().unwrap();
        assert_relative_eq!(params.time_horizon, 1.0);
    }

    #[tokio::test]
    async fn test_api_rejects_too_many_steps() {
        let form = LatticeForm { steps: 13, ..LatticeForm::default() };
        let (status, Json(body)) = api_lattice(Ok(Query(form))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("too many steps"));
    }

    #[tokio::test]
    async fn test_api_returns_graph() {
        let form = LatticeForm { steps: 3, ..LatticeForm::default() };
        let (status, Json(body)) = api_lattice(Ok(Query(form))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"].as_array().unwrap().len(), 10);
        assert_eq!(body["edges"].as_array().unwrap().len(), 12);
        assert_eq!(body["nodes"][0]["label"], "$18.00");
        assert_eq!(body["edges"][0]["to"]["down_moves"], 0);
    }
}
