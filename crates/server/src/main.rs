// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod live;

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, Path, Query, State as AxumState},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use visit_scheduler_api::{
    ApiError, ApplicationResponse, AuthenticatedActor, BookVisitRequest, CancelVisitRequest,
    CreatePrisonRequest, CreateSessionTemplateRequest, InMemoryDirectory,
    MigrateCancellationRequest, MigrateVisitRequest, PrisonResponse, ReserveSlotRequest, Role,
    SessionCapacityRequest, SessionCapacityResponse, SessionTemplateResponse, Services,
    SlotRequestBody, VisitHistoryResponse, VisitResponse, VisitSessionResponse,
    VisitSessionsRequest, approve_visit_request, authenticate, book_visit, cancel_visit,
    change_application_slot, change_booked_visit, create_prison, create_session_template,
    expire_stale_applications, get_session_capacity, get_visit, get_visit_history,
    get_visit_sessions, list_visits_for_prisoner, migrate_cancellation, migrate_visit,
    reject_visit_request, reserve_slot, withdraw_visit_request,
};
use visit_scheduler_audit::Cause;
use visit_scheduler_domain::validate_timezone;
use visit_scheduler_persistence::Persistence;

use crate::config::Args;
use crate::live::{LiveEventBroadcaster, live_events_handler};

/// Header carrying the caller's identity.
const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Optional correlation id recorded as the audit cause.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers.
///
/// Handlers hold the persistence lock for the whole load, apply and persist
/// sequence, so commands against the same booking are serialised.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    services: Services,
    live: Arc<LiveEventBroadcaster>,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live)
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// The authenticated caller and the cause recorded against their command.
struct Caller {
    actor: AuthenticatedActor,
    cause: Cause,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
        };

        let actor = authenticate(header(ACTOR_ID_HEADER), header(ACTOR_ROLE_HEADER)).map_err(
            |e| {
                warn!(path = %parts.uri.path(), error = %e, "Rejected request identity");
                ApiError::from(e)
            },
        )?;

        let request_id = match header(REQUEST_ID_HEADER) {
            "" => String::from("unspecified"),
            id => id.to_string(),
        };
        let cause = Cause::new(request_id, format!("{} {}", parts.method, parts.uri.path()));

        Ok(Self { actor, cause })
    }
}

/// Query parameters for listing a prisoner's visits.
#[derive(Debug, Deserialize)]
struct ListVisitsQuery {
    prisoner_id: String,
}

/// Handler for POST `/prisons`.
async fn handle_create_prison(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<CreatePrisonRequest>,
) -> Result<Json<PrisonResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, prison_code = %req.code, "Handling create_prison request");

    let response = create_prison(&mut *app_state.persistence.lock().await, &req, &caller.actor)?;
    Ok(Json(response))
}

/// Handler for POST `/session-templates`.
async fn handle_create_session_template(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<CreateSessionTemplateRequest>,
) -> Result<Json<SessionTemplateResponse>, HttpError> {
    info!(
        actor_id = %caller.actor.id,
        reference = %req.reference,
        prison_code = %req.prison_code,
        "Handling create_session_template request"
    );

    let response = create_session_template(
        &mut *app_state.persistence.lock().await,
        req,
        &caller.actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/visits/application/slot/reserve`.
async fn handle_reserve_slot(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<ReserveSlotRequest>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    info!(
        actor_id = %caller.actor.id,
        prisoner_id = %req.prisoner_id,
        session_template_reference = %req.slot.session_template_reference,
        session_date = %req.slot.session_date,
        "Handling reserve_slot request"
    );

    let response = reserve_slot(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/application/{reference}/slot/change`.
async fn handle_change_application_slot(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
    Json(req): Json<SlotRequestBody>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling change_application_slot request");

    let response = change_application_slot(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/visits/application/{reference}/change`, where the
/// reference is that of the booked visit.
async fn handle_change_booked_visit(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
    Json(req): Json<SlotRequestBody>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling change_booked_visit request");

    let response = change_booked_visit(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/{reference}/book`, where the reference is that
/// of the application.
async fn handle_book_visit(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
    Json(req): Json<BookVisitRequest>,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(
        actor_id = %caller.actor.id,
        %reference,
        is_request_booking = req.is_request_booking,
        "Handling book_visit request"
    );

    let response = book_visit(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/{reference}/cancel`.
async fn handle_cancel_visit(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
    Json(req): Json<CancelVisitRequest>,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(
        actor_id = %caller.actor.id,
        %reference,
        outcome_status = %req.outcome_status,
        "Handling cancel_visit request"
    );

    let response = cancel_visit(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/{reference}/request/approve`.
async fn handle_approve_visit_request(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling approve_visit_request request");

    let response = approve_visit_request(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/{reference}/request/reject`.
async fn handle_reject_visit_request(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling reject_visit_request request");

    let response = reject_visit_request(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/visits/{reference}/request/withdraw`.
async fn handle_withdraw_visit_request(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling withdraw_visit_request request");

    let response = withdraw_visit_request(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/migrate/visits`.
async fn handle_migrate_visit(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<MigrateVisitRequest>,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(
        actor_id = %caller.actor.id,
        prison_code = %req.prison_code,
        prisoner_id = %req.prisoner_id,
        start_timestamp = %req.start_timestamp,
        "Handling migrate_visit request"
    );

    let response = migrate_visit(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/migrate/visits/{reference}/cancel`.
async fn handle_migrate_cancellation(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
    Json(req): Json<MigrateCancellationRequest>,
) -> Result<Json<VisitResponse>, HttpError> {
    info!(actor_id = %caller.actor.id, %reference, "Handling migrate_cancellation request");

    let response = migrate_cancellation(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &reference,
        req,
        &caller.actor,
        caller.cause,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/visits/{reference}`.
async fn handle_get_visit(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
) -> Result<Json<VisitResponse>, HttpError> {
    let response = get_visit(&mut *app_state.persistence.lock().await, &reference, &caller.actor)?;
    Ok(Json(response))
}

/// Handler for GET `/visits/{reference}/history`.
async fn handle_get_visit_history(
    AxumState(app_state): AxumState<AppState>,
    Path(reference): Path<String>,
    caller: Caller,
) -> Result<Json<VisitHistoryResponse>, HttpError> {
    let response = get_visit_history(
        &mut *app_state.persistence.lock().await,
        &reference,
        &caller.actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/visits?prisoner_id=`.
async fn handle_list_visits(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListVisitsQuery>,
    caller: Caller,
) -> Result<Json<Vec<VisitResponse>>, HttpError> {
    let response = list_visits_for_prisoner(
        &mut *app_state.persistence.lock().await,
        &query.prisoner_id,
        &caller.actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/visit-sessions`.
async fn handle_get_visit_sessions(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<VisitSessionsRequest>,
    caller: Caller,
) -> Result<Json<Vec<VisitSessionResponse>>, HttpError> {
    let response = get_visit_sessions(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &query,
        &caller.actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/visit-sessions/capacity`.
async fn handle_get_session_capacity(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SessionCapacityRequest>,
    caller: Caller,
) -> Result<Json<SessionCapacityResponse>, HttpError> {
    let response = get_session_capacity(
        &mut *app_state.persistence.lock().await,
        &app_state.services,
        OffsetDateTime::now_utc(),
        &query,
        &caller.actor,
    )?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/prisons", post(handle_create_prison))
        .route("/session-templates", post(handle_create_session_template))
        .route("/visits", get(handle_list_visits))
        .route("/visits/application/slot/reserve", post(handle_reserve_slot))
        .route(
            "/visits/application/{reference}/slot/change",
            put(handle_change_application_slot),
        )
        .route(
            "/visits/application/{reference}/change",
            post(handle_change_booked_visit),
        )
        .route("/visits/{reference}", get(handle_get_visit))
        .route("/visits/{reference}/history", get(handle_get_visit_history))
        .route("/visits/{reference}/book", put(handle_book_visit))
        .route("/visits/{reference}/cancel", put(handle_cancel_visit))
        .route(
            "/visits/{reference}/request/approve",
            put(handle_approve_visit_request),
        )
        .route(
            "/visits/{reference}/request/reject",
            put(handle_reject_visit_request),
        )
        .route(
            "/visits/{reference}/request/withdraw",
            put(handle_withdraw_visit_request),
        )
        .route("/migrate/visits", post(handle_migrate_visit))
        .route(
            "/migrate/visits/{reference}/cancel",
            put(handle_migrate_cancellation),
        )
        .route("/visit-sessions", get(handle_get_visit_sessions))
        .route("/visit-sessions/capacity", get(handle_get_session_capacity))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

/// Periodically deletes applications whose reservation has lapsed.
fn spawn_expiry_sweep(app_state: AppState, period: Duration) {
    tokio::spawn(async move {
        let actor = AuthenticatedActor::new(String::from("expiry-sweep"), Role::System);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let result = {
                let mut persistence = app_state.persistence.lock().await;
                expire_stale_applications(
                    &mut persistence,
                    &app_state.services,
                    OffsetDateTime::now_utc(),
                    &actor,
                )
            };
            match result {
                Ok(result) => {
                    debug!(deleted = result.deleted, cutoff = %result.cutoff, "Expiry sweep done");
                }
                Err(e) => error!(error = %e, "Expiry sweep failed"),
            }
        }
    });
}

fn open_persistence(args: &Args) -> Result<Persistence, Box<dyn std::error::Error>> {
    let persistence = if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        Persistence::new_with_mysql(url)?
    } else if let Some(path) = &args.database {
        info!("Using file-based database at: {}", path.display());
        Persistence::new_with_file(path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    Ok(persistence)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing prison visit scheduler");
    validate_timezone(&args.timezone)?;

    let persistence = open_persistence(&args)?;
    let directory = match &args.directory_seed {
        Some(path) => {
            info!("Loading directory seed from: {}", path.display());
            Arc::new(InMemoryDirectory::from_json_file(path)?)
        }
        None => Arc::new(InMemoryDirectory::new()),
    };
    let live = Arc::new(LiveEventBroadcaster::new());
    let services = Services::new(
        args.scheduler_settings(),
        directory.clone(),
        directory,
        live.clone(),
    );

    let app_state = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        services,
        live,
    };

    if args.expiry_sweep_seconds > 0 {
        spawn_expiry_sweep(
            app_state.clone(),
            Duration::from_secs(args.expiry_sweep_seconds),
        );
    }

    let app: Router = build_router(app_state);

    let addr = args.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
