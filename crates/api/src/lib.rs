//! HTTP API server for the event-sourced todo lists.
//!
//! Commands go through [`domain::TodoListService`]; queries are answered from
//! the [`projections::TodoListProjector`] read model, which the service's
//! event bus keeps current. Structured logging uses `tracing`, metrics are
//! exported in Prometheus format.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{Aggregate, RetryPolicy, TodoList, TodoListEvent, TodoListService};
use event_bus::InMemoryEventBus;
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{InMemoryTodoListStore, ProjectionProcessor, TodoListProjector};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::todo_lists::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/todo-lists", post(routes::todo_lists::create::<S>))
        .route("/todo-lists/{id}", get(routes::todo_lists::get::<S>))
        .route(
            "/todo-lists/{id}/todos",
            get(routes::todo_lists::get::<S>).post(routes::todo_lists::add_todo::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the command side to the read side over one event bus.
///
/// The projector is subscribed to the bus for live events and registered
/// with the returned processor for catch-up from the store.
pub async fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    retry: RetryPolicy,
) -> (
    Arc<AppState<S>>,
    ProjectionProcessor<S, TodoListEvent>,
) {
    let bus: Arc<InMemoryEventBus<TodoListEvent>> = Arc::new(InMemoryEventBus::new());
    let projector = Arc::new(TodoListProjector::new(InMemoryTodoListStore::new()));
    bus.subscribe(projector.clone()).await;

    let mut processor = ProjectionProcessor::new(event_store.clone(), TodoList::registry());
    processor.register(projector.clone());

    let state = Arc::new(AppState {
        todo_service: TodoListService::with_retry_policy(event_store, bus, retry),
        projector,
    });

    (state, processor)
}
