//! Web portal routes for the interactive banking-assistant session.
//!
//! HTML Endpoints:
//! - `GET  /`            — redirect to the chat view
//! - `GET  /login`       — login form (customer id + DOB fields, guest button)
//! - `POST /login`       — customer credentials; redirects to `/chat` on success
//! - `POST /login/guest` — guest entry; redirects to `/chat`
//! - `POST /logout`      — clears the session; redirects to `/login`
//! - `GET  /chat`        — transcript view plus the message form
//! - `POST /chat`        — handle one conversation turn; redirects to `/chat`
//!
//! JSON Endpoints:
//! - `GET  /health`      — liveness report with a database connectivity check

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tera::{Context, Tera};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use teller_core::errors::{ApplicationError, InterfaceError};

use crate::bootstrap::Application;
use crate::health;

/// Inline form error shown when a credential pair matches no customer record.
const LOGIN_ERROR: &str = "Invalid Customer ID or DOB";

#[derive(Clone)]
pub struct PortalState {
    app: Arc<Application>,
    templates: Arc<Tera>,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub customer_id: String,
    pub dob: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Initialize Tera template engine with portal templates.
fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/portal/**/*") {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to load portal templates from filesystem, using empty Tera instance");
            Tera::default()
        }
    };

    // Add built-in fallback templates in case filesystem templates are not available
    tera.add_raw_template("login.html", include_str!("../../../templates/portal/login.html"))
        .ok();
    tera.add_raw_template("chat.html", include_str!("../../../templates/portal/chat.html")).ok();

    Arc::new(tera)
}

pub fn router(app: Arc<Application>) -> Router {
    let templates = init_templates();
    let health_routes = health::router(app.db_pool.clone());

    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
        .route("/login/guest", post(login_guest))
        .route("/logout", post(logout))
        .route("/chat", get(chat_page).post(chat_submit))
        .with_state(PortalState { app, templates })
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// HTML Handlers
// ---------------------------------------------------------------------------

async fn index() -> Redirect {
    Redirect::to("/chat")
}

async fn login_page(
    State(state): State<PortalState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    render_login(&state, None)
}

async fn login_submit(
    State(state): State<PortalState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, Html<String>)> {
    if state.app.login_customer(&form.customer_id, &form.dob).await {
        return Ok(Redirect::to("/chat").into_response());
    }

    // Rejected credentials re-render the form inline; the session is unchanged.
    Ok(render_login(&state, Some(LOGIN_ERROR))?.into_response())
}

async fn login_guest(State(state): State<PortalState>) -> Redirect {
    state.app.login_guest().await;
    Redirect::to("/chat")
}

async fn logout(State(state): State<PortalState>) -> Redirect {
    state.app.logout().await;
    Redirect::to("/login")
}

async fn chat_page(
    State(state): State<PortalState>,
) -> Result<Response, (StatusCode, Html<String>)> {
    let session = state.app.session_snapshot().await;
    if !session.logged_in {
        return Ok(Redirect::to("/login").into_response());
    }

    let mut context = Context::new();
    context.insert("customer_id", &session.customer_id);
    context.insert("history", &session.history);

    let html = state.templates.render("chat.html", &context).map_err(template_error)?;
    Ok(Html(html).into_response())
}

async fn chat_submit(
    State(state): State<PortalState>,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let session = state.app.session_snapshot().await;
    if !session.logged_in {
        return Ok(Redirect::to("/login"));
    }

    // Whitespace-only input is dropped without recording a turn.
    if form.message.trim().is_empty() {
        return Ok(Redirect::to("/chat"));
    }

    state.app.handle_turn(&form.message).await.map_err(turn_failure)?;
    Ok(Redirect::to("/chat"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn render_login(
    state: &PortalState,
    error: Option<&str>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("error", &error);

    let html = state.templates.render("login.html", &context).map_err(template_error)?;
    Ok(Html(html))
}

fn template_error(error: tera::Error) -> (StatusCode, Html<String>) {
    error!(error = %error, "portal template rendering failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<h1>Template Error</h1><pre>{:?}</pre>", error)),
    )
}

fn turn_failure(error: ApplicationError) -> (StatusCode, Html<String>) {
    let interface = error.into_interface("chat-turn");
    error!(
        event_name = "portal.turn.failed",
        error = %interface,
        "conversation turn could not be completed"
    );

    let status = match interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(format!("<h1>Error</h1><p>{}</p>", interface.user_message())))
}
