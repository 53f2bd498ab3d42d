use crate::infra::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use lead_analyzer::config::clamp_synthetic_count;
use lead_analyzer::error::AppError;
use lead_analyzer::leads::outreach::{
    compose_outreach, generate_heygen_script, generate_script, ContentType, OutreachChannel,
    OutreachMessage, PodcastOptions, ScriptTemplate,
};
use lead_analyzer::leads::report::breakdown::LeadFilter;
use lead_analyzer::leads::report::generate_insights;
use lead_analyzer::leads::report::views::InsightItem;
use lead_analyzer::leads::scoring::ScoreBreakdown;
use lead_analyzer::leads::{ContactWindow, LeadAnalysis, LeadImporter, LeadView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Body of `POST /api/v1/leads/import`: exactly one of `csv`, `json`, or `synthetic`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ImportRequest {
    Csv(String),
    Json(serde_json::Value),
    Synthetic(usize),
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportResponse {
    pub(crate) imported: usize,
    pub(crate) source: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeadQuery {
    pub(crate) source: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) min_score: Option<u8>,
    pub(crate) max_score: Option<u8>,
}

impl LeadQuery {
    fn to_filter(&self) -> LeadFilter {
        let score_range = (self.min_score.is_some() || self.max_score.is_some())
            .then(|| (self.min_score.unwrap_or(0), self.max_score.unwrap_or(100)));
        LeadFilter {
            source: self.source.clone(),
            status: self.status.clone(),
            tag: self.tag.clone(),
            score_range,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoredLead {
    #[serde(flatten)]
    pub(crate) lead: LeadView,
    pub(crate) breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) scored: usize,
    pub(crate) leads: Vec<ScoredLead>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactTimesResponse {
    pub(crate) lead_id: String,
    pub(crate) scored: bool,
    pub(crate) optimal_contact_times: Vec<ContactWindow>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OutreachQuery {
    pub(crate) channel: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptRequest {
    pub(crate) template: String,
    #[serde(default)]
    pub(crate) lead_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScriptResponse {
    pub(crate) template: ScriptTemplate,
    pub(crate) name: &'static str,
    pub(crate) script: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeygenRequest {
    #[serde(default)]
    pub(crate) content_type: ContentType,
    #[serde(default)]
    pub(crate) lead_name: Option<String>,
    #[serde(default)]
    pub(crate) podcast: PodcastOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeygenResponse {
    pub(crate) content_type: ContentType,
    pub(crate) script: String,
}

pub(crate) fn lead_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/leads", get(list_leads_endpoint))
        .route("/api/v1/leads/import", post(import_endpoint))
        .route("/api/v1/leads/score", post(score_endpoint))
        .route("/api/v1/leads/analysis", get(analysis_endpoint))
        .route("/api/v1/leads/insights", get(insights_endpoint))
        .route("/api/v1/leads/scripts", post(script_endpoint))
        .route("/api/v1/leads/heygen", post(heygen_endpoint))
        .route(
            "/api/v1/leads/:id/contact-times",
            get(contact_times_endpoint),
        )
        .route("/api/v1/leads/:id/outreach", get(outreach_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn import_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let (leads, source) = match payload {
        ImportRequest::Csv(text) => (LeadImporter::from_csv_str(&text)?, "csv"),
        ImportRequest::Json(value) => (LeadImporter::from_json_value(value)?, "json"),
        ImportRequest::Synthetic(count) => {
            let mut rng = StdRng::from_entropy();
            let count = clamp_synthetic_count(count);
            (LeadImporter::synthetic(&mut rng, count, Utc::now()), "synthetic")
        }
    };

    let imported = leads.len();
    state.store().replace(leads);
    info!(imported, source, "lead import accepted");

    Ok(Json(ImportResponse { imported, source }))
}

pub(crate) async fn list_leads_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<LeadQuery>,
) -> Json<Vec<LeadView>> {
    let leads = state
        .store()
        .filtered(&query.to_filter())
        .into_iter()
        .map(|lead| lead.to_view())
        .collect();

    Json(leads)
}

pub(crate) async fn score_endpoint(Extension(state): Extension<AppState>) -> Json<ScoreResponse> {
    let mut rng = StdRng::from_entropy();
    let mut store = state.store();
    store.calculate_scores(&mut rng);

    Json(ScoreResponse {
        scored: store.len(),
        leads: store
            .score_breakdowns()
            .into_iter()
            .map(|(lead, breakdown)| ScoredLead {
                lead: lead.to_view(),
                breakdown,
            })
            .collect(),
    })
}

pub(crate) async fn analysis_endpoint(Extension(state): Extension<AppState>) -> Json<LeadAnalysis> {
    let analysis = state
        .store()
        .analysis(Utc::now(), state.analytics.timeline_days);
    Json(analysis)
}

pub(crate) async fn insights_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<Vec<InsightItem>> {
    let insights = generate_insights(state.store().leads(), Utc::now());
    Json(insights)
}

pub(crate) async fn contact_times_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactTimesResponse>, AppError> {
    let store = state.store();
    let lead = store.get(&id).ok_or_else(|| AppError::LeadNotFound(id.clone()))?;

    Ok(Json(ContactTimesResponse {
        lead_id: id,
        scored: lead.score().is_some(),
        optimal_contact_times: lead.contact_times().unwrap_or_default().to_vec(),
    }))
}

pub(crate) async fn outreach_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OutreachQuery>,
) -> Result<Json<OutreachMessage>, AppError> {
    let channel = match query.channel.as_deref() {
        Some(raw) => raw.parse::<OutreachChannel>()?,
        None => OutreachChannel::default(),
    };

    let store = state.store();
    let lead = store.get(&id).ok_or(AppError::LeadNotFound(id))?;
    Ok(Json(compose_outreach(lead, channel)))
}

pub(crate) async fn script_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScriptRequest>,
) -> Result<Json<ScriptResponse>, AppError> {
    let template: ScriptTemplate = payload.template.parse()?;
    let script = generate_script(
        template,
        state.store().leads(),
        payload.lead_name.as_deref(),
        Utc::now(),
    )?;

    Ok(Json(ScriptResponse {
        template,
        name: template.name(),
        script,
    }))
}

pub(crate) async fn heygen_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<HeygenRequest>,
) -> Result<Json<HeygenResponse>, AppError> {
    let script = generate_heygen_script(
        state.store().leads(),
        payload.lead_name.as_deref(),
        payload.content_type,
        &payload.podcast,
    )?;

    Ok(Json(HeygenResponse {
        content_type: payload.content_type,
        script,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const CSV: &str = "id,name,email,source,initialContact,status,tags,conversionProbability,estimatedValue\n\
L-1,Jane Doe,jane@x.com,LinkedIn,2025-06-25T14:30:00Z,Converted,enterprise;finance,0.7,18000\n\
L-2,John Smith,john@x.com,Website,2025-06-10,New,retail,0.2,4000\n";

    async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("valid json body")
    }

    fn app(state: &AppState) -> Router {
        lead_routes().layer(Extension(state.clone()))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    async fn import_csv(state: &AppState) {
        let response = app(state)
            .oneshot(post_json("/api/v1/leads/import", json!({ "csv": CSV })))
            .await
            .expect("import responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_flagged() {
        let state = test_state();
        let response = app(&state)
            .oneshot(get_request("/ready"))
            .await
            .expect("ready responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state
            .readiness
            .store(true, std::sync::atomic::Ordering::Release);
        let response = app(&state)
            .oneshot(get_request("/ready"))
            .await
            .expect("ready responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn csv_import_replaces_the_store() {
        let state = test_state();
        import_csv(&state).await;
        assert_eq!(state.store().len(), 2);

        let response = app(&state)
            .oneshot(post_json("/api/v1/leads/import", json!({ "synthetic": 500 })))
            .await
            .expect("import responds");
        let body = read_json_body(response).await;
        assert_eq!(body["imported"], 100);
        assert_eq!(body["source"], "synthetic");
        assert_eq!(state.store().len(), 100);
    }

    #[tokio::test]
    async fn invalid_import_is_a_bad_request() {
        let state = test_state();
        let response = app(&state)
            .oneshot(post_json(
                "/api/v1/leads/import",
                json!({ "csv": "id,name\n1,Jane" }),
            ))
            .await
            .expect("import responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json_body(response).await;
        let message = body["error"].as_str().expect("error message");
        assert!(message.contains("Missing required fields: email, source"));

        let response = app(&state)
            .oneshot(post_json("/api/v1/leads/import", json!({ "json": { "id": 1 } })))
            .await
            .expect("import responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scoring_then_contact_times_round_trip() {
        let state = test_state();
        import_csv(&state).await;

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-1/contact-times"))
            .await
            .expect("contact times respond");
        let body = read_json_body(response).await;
        assert_eq!(body["scored"], false);
        assert_eq!(body["optimalContactTimes"], json!([]));

        let response = app(&state)
            .oneshot(post_json("/api/v1/leads/score", json!({})))
            .await
            .expect("score responds");
        let body = read_json_body(response).await;
        assert_eq!(body["scored"], 2);
        let first = &body["leads"][0];
        assert_eq!(first["id"], "L-1");
        assert_eq!(first["score"], first["breakdown"]["total"]);
        assert_eq!(first["breakdown"]["value"], 11.0);

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-1/contact-times"))
            .await
            .expect("contact times respond");
        let body = read_json_body(response).await;
        assert_eq!(body["scored"], true);
        let days: Vec<&str> = body["optimalContactTimes"]
            .as_array()
            .expect("windows")
            .iter()
            .filter_map(|window| window["day"].as_str())
            .collect();
        assert_eq!(days, vec!["Tuesday", "Thursday"]);
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let state = test_state();
        import_csv(&state).await;

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-404/contact-times"))
            .await
            .expect("contact times respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-404/outreach"))
            .await
            .expect("outreach responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_query() {
        let state = test_state();
        import_csv(&state).await;

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads?tag=retail"))
            .await
            .expect("list responds");
        let body = read_json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], "L-2");

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads?minScore=0"))
            .await
            .expect("list responds");
        let body = read_json_body(response).await;
        assert_eq!(body, json!([]));

        let response = app(&state)
            .oneshot(post_json("/api/v1/leads/score", json!({})))
            .await
            .expect("score responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads?source=LinkedIn&maxScore=100"))
            .await
            .expect("list responds");
        let body = read_json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], "L-1");

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads?status=New&tag=enterprise"))
            .await
            .expect("list responds");
        assert_eq!(read_json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn analysis_and_insights_cover_the_store() {
        let state = test_state();
        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/insights"))
            .await
            .expect("insights respond");
        assert_eq!(read_json_body(response).await, json!([]));

        import_csv(&state).await;
        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/analysis"))
            .await
            .expect("analysis responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["leadCount"], 2);
        assert_eq!(body["totalValue"], 22000.0);
        assert_eq!(body["conversionRate"], 50.0);
        assert_eq!(body["timelineDays"], 30);
        assert_eq!(body["insights"][3]["title"], "Conversion Rate");
        assert_eq!(body["insights"][3]["type"], "success");
    }

    #[tokio::test]
    async fn scripts_and_outreach_render_text() {
        let state = test_state();
        import_csv(&state).await;

        let response = app(&state)
            .oneshot(post_json(
                "/api/v1/leads/scripts",
                json!({ "template": "personalized", "leadName": "jane" }),
            ))
            .await
            .expect("script responds");
        let body = read_json_body(response).await;
        assert_eq!(body["template"], "personalized");
        assert_eq!(body["name"], "Personalized Outreach");
        assert!(body["script"]
            .as_str()
            .expect("script text")
            .starts_with("Hi Jane Doe,"));

        let response = app(&state)
            .oneshot(post_json(
                "/api/v1/leads/scripts",
                json!({ "template": "weekly" }),
            ))
            .await
            .expect("script responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(&state)
            .oneshot(post_json(
                "/api/v1/leads/heygen",
                json!({
                    "contentType": "podcast",
                    "podcast": { "format": "debate", "hostCount": 3, "durationMinutes": 20 }
                }),
            ))
            .await
            .expect("heygen responds");
        let body = read_json_body(response).await;
        let script = body["script"].as_str().expect("script text");
        assert!(script.contains("MODERATOR: "));
        assert!(script.contains("(20 minutes)"));

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-2/outreach?channel=linkedin"))
            .await
            .expect("outreach responds");
        let body = read_json_body(response).await;
        assert_eq!(body["channel"], "linkedin");
        assert!(body.get("subject").is_none());

        let response = app(&state)
            .oneshot(get_request("/api/v1/leads/L-2/outreach?channel=fax"))
            .await
            .expect("outreach responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn personalized_script_for_unknown_name_is_not_found() {
        let state = test_state();
        import_csv(&state).await;

        let response = app(&state)
            .oneshot(post_json(
                "/api/v1/leads/scripts",
                json!({ "template": "personalized", "leadName": "Zed" }),
            ))
            .await
            .expect("script responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
