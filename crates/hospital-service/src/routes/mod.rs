//! HTTP routes for the hospital registration service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers::{self, auth, catalog, doctors, index, registrations};
use crate::middleware::{http_metrics_middleware, require_roles, AuthState, ANY_ROLE};
use crate::models::{Department, Disease, Doctor, Patient, Role};
use crate::repositories::Stores;
use crate::services::{RegistrationWorkflow, TokenService};
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const ADMIN: &[Role] = &[Role::Admin];
const PATIENT: &[Role] = &[Role::Patient];
const ADMIN_OR_DOCTOR: &[Role] = &[Role::Admin, Role::Doctor];
const ADMIN_OR_PATIENT: &[Role] = &[Role::Admin, Role::Patient];

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// One store per backing document.
    pub stores: Stores,

    /// Session token issuer/verifier.
    pub tokens: TokenService,

    /// Registration visibility and status rules.
    pub workflow: RegistrationWorkflow,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        let tokens = TokenService::new(config.auth_secret.clone());
        let workflow = RegistrationWorkflow::new(stores.clone(), config.department_validation);
        AppState {
            config,
            stores,
            tokens,
            workflow,
        }
    }
}

/// A router whose routes all require one of `allowed`.
fn guarded(
    state: &Arc<AppState>,
    allowed: &'static [Role],
    routes: Router<Arc<AppState>>,
) -> Router {
    let auth_state = Arc::new(AuthState {
        tokens: state.tokens.clone(),
        allowed,
    });
    routes
        .route_layer(middleware::from_fn_with_state(auth_state, require_roles))
        .with_state(state.clone())
}

/// Build the application routes.
///
/// - `/health` and `/metrics` - public, unversioned
/// - `/api/auth/login` - public
/// - everything else under `/api` - behind the authorization guard, grouped
///   by the role set allowed to call it
/// - TraceLayer for request logging, permissive CORS for the browser client
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let any_role = guarded(
        &state,
        ANY_ROLE,
        Router::new()
            .route("/api/auth/me", get(auth::me))
            .route("/api/doctors/getDoctors", get(catalog::list::<Doctor>))
            .route("/api/doctors/getDoctor", get(catalog::get_one::<Doctor>))
            .route("/api/doctors/getDoctorDiseases", get(doctors::get_doctor_diseases))
            .route("/api/departments/getDepartments", get(catalog::list::<Department>))
            .route("/api/departments/getDepartment", get(catalog::get_one::<Department>))
            .route("/api/diseases/getDiseases", get(catalog::list::<Disease>))
            .route("/api/diseases/getDisease", get(catalog::get_one::<Disease>))
            .route("/api/registrations/getRegistrations", get(registrations::list_registrations))
            .route("/api/registrations/getRegistration", get(registrations::get_registration)),
    );

    let admin = guarded(
        &state,
        ADMIN,
        Router::new()
            .route("/api/index", get(index::index))
            .route("/api/auth/assignDoctorAccount", post(auth::assign_doctor_account))
            .route("/api/patients/createPatient", post(catalog::create::<Patient>))
            .route("/api/patients/updatePatient", put(catalog::update::<Patient>))
            .route("/api/patients/deletePatient", delete(catalog::delete::<Patient>))
            .route("/api/doctors/createDoctor", post(doctors::create_doctor))
            .route("/api/doctors/updateDoctor", put(doctors::update_doctor))
            .route("/api/doctors/deleteDoctor", delete(catalog::delete::<Doctor>))
            .route("/api/departments/createDepartment", post(catalog::create::<Department>))
            .route("/api/departments/updateDepartment", put(catalog::update::<Department>))
            .route("/api/departments/deleteDepartment", delete(catalog::delete::<Department>))
            .route("/api/diseases/createDisease", post(catalog::create::<Disease>))
            .route("/api/diseases/updateDisease", put(catalog::update::<Disease>))
            .route("/api/diseases/deleteDisease", delete(catalog::delete::<Disease>))
            .route("/api/registrations/deleteRegistration", delete(registrations::delete_registration)),
    );

    let admin_or_doctor = guarded(
        &state,
        ADMIN_OR_DOCTOR,
        Router::new()
            .route("/api/patients/getPatients", get(catalog::list::<Patient>))
            .route("/api/patients/getPatient", get(catalog::get_one::<Patient>))
            .route("/api/registrations/updateRegistration", put(registrations::update_registration)),
    );

    let admin_or_patient = guarded(
        &state,
        ADMIN_OR_PATIENT,
        Router::new().route(
            "/api/registrations/createRegistration",
            post(registrations::create_registration),
        ),
    );

    let patient = guarded(
        &state,
        PATIENT,
        Router::new().route(
            "/api/auth/upsertMyPatientProfile",
            post(auth::upsert_my_patient_profile),
        ),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Layer order (bottom-to-top execution):
    // 1. TraceLayer - log request details (innermost)
    // 2. CorsLayer - answer preflights before the guard sees them
    // 3. http_metrics_middleware - record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(any_role)
        .merge(admin)
        .merge(admin_or_doctor)
        .merge(admin_or_patient)
        .merge(patient)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(http_metrics_middleware))
}
