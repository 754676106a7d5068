use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    Extension, Form, Json,
};

use super::{
    errors::{AppError, JsonError},
    models::{AddConnectionForm, ConnectionNameForm, HopsParams, QueryForm},
    render::{render_page, PageView},
    session::SessionId,
    AppState,
};
use crate::{
    connections::ConnectionProfile,
    database::ResultRow,
    hop::{GraphElements, HopLimit, HopSelector},
};

/// Simple health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "hopgraph",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn index(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Html<String> {
    render_for_session(&app_state, &session, None).await
}

pub async fn list_connections(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Html<String> {
    render_for_session(&app_state, &session, None).await
}

pub async fn add_connection(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<AddConnectionForm>,
) -> Result<Html<String>, AppError> {
    app_state
        .connections
        .write()
        .await
        .add(&form.name, &form.server, &form.db_name)?;

    Ok(render_for_session(&app_state, &session, None).await)
}

pub async fn delete_connection(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<ConnectionNameForm>,
) -> Result<Html<String>, AppError> {
    {
        let mut manager = app_state.connections.write().await;
        let mut context = app_state.sessions.context(&session).await;
        manager.delete(&form.name, &mut context)?;
        app_state.sessions.store(session.clone(), context).await;
    }
    app_state.sessions.forget_profile(&form.name).await;

    Ok(render_for_session(&app_state, &session, None).await)
}

pub async fn select_connection(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<ConnectionNameForm>,
) -> Result<Html<String>, AppError> {
    {
        let manager = app_state.connections.read().await;
        let mut context = app_state.sessions.context(&session).await;
        manager.select(&form.name, &mut context)?;
        app_state.sessions.store(session.clone(), context).await;
    }

    Ok(render_for_session(&app_state, &session, None).await)
}

pub async fn run_query(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<QueryForm>,
) -> Result<Html<String>, AppError> {
    log::debug!("Query handler called with query: {}", form.sql);

    let profile = active_profile(&app_state, &session).await;
    let rows = app_state
        .executor
        .execute(profile.as_ref(), &form.sql)
        .await?;

    Ok(render_for_session(&app_state, &session, Some(rows.as_slice())).await)
}

pub async fn read_hops(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Query(params): Query<HopsParams>,
) -> Result<Json<GraphElements>, JsonError> {
    let limit = match params.limit.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => HopLimit::parse(raw)?,
        None => HopLimit::new(app_state.config.default_hop_limit)?,
    };
    let selector = HopSelector::from_params(
        params.by_v_id.as_deref(),
        params.by_v_label_en.as_deref(),
        params.by_like_v_label_en.as_deref(),
    );
    log::debug!("Hop request: {:?}, limit {}", selector, limit);

    let profile = active_profile(&app_state, &session).await;
    let graph = app_state
        .executor
        .fetch_hop_graph(profile.as_ref(), &selector, limit)
        .await?;

    if graph.is_empty() {
        return Err(AppError::EmptyResult.into());
    }

    Ok(Json(graph.into()))
}

/// Clone of the session's active profile, so no lock is held during queries.
async fn active_profile(app_state: &AppState, session: &SessionId) -> Option<ConnectionProfile> {
    let context = app_state.sessions.context(session).await;
    let manager = app_state.connections.read().await;
    manager.active_profile(&context).cloned()
}

async fn render_for_session(
    app_state: &AppState,
    session: &SessionId,
    rows: Option<&[ResultRow]>,
) -> Html<String> {
    let context = app_state.sessions.context(session).await;
    let manager = app_state.connections.read().await;
    let connections = manager.list();
    let selected = manager.active_profile(&context).map(|p| p.name.as_str());

    Html(render_page(&PageView {
        connections: &connections,
        selected,
        rows,
    }))
}
