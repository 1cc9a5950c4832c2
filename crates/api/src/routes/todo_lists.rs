//! Todo-list command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{
    AddTodo, Aggregate, CreateTodoList, TodoList, TodoListError, TodoListService, TodoText, UserId,
};
use event_store::{EventStore, Version};
use projections::{InMemoryTodoListStore, ProjectionError, TodoListProjector, TodoListView};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub todo_service: TodoListService<S>,
    pub projector: Arc<TodoListProjector<InMemoryTodoListStore>>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateTodoListRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct AddTodoRequest {
    pub user_id: String,
    pub todo: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub aggregate_id: AggregateId,
    pub version: Version,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub aggregate_id: AggregateId,
    pub user_id: String,
    pub items: Vec<TodoItemResponse>,
    pub version: Version,
}

#[derive(Debug, Serialize)]
pub struct TodoItemResponse {
    pub text: String,
}

impl From<TodoListView> for TodoListResponse {
    fn from(view: TodoListView) -> Self {
        Self {
            aggregate_id: view.aggregate_id,
            user_id: view.user_id.into(),
            items: view
                .items
                .into_iter()
                .map(|item| TodoItemResponse {
                    text: item.text.into(),
                })
                .collect(),
            version: view.version,
        }
    }
}

impl TodoListResponse {
    fn from_aggregate(aggregate_id: AggregateId, list: &TodoList) -> Self {
        Self {
            aggregate_id,
            user_id: list
                .user_id()
                .map(|u| u.as_str().to_string())
                .unwrap_or_default(),
            items: list
                .items()
                .iter()
                .map(|item| TodoItemResponse {
                    text: item.text.as_str().to_string(),
                })
                .collect(),
            version: list.version(),
        }
    }
}

// -- Handlers --

/// POST /todo-lists
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id))]
pub async fn create<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateTodoListRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let user_id = UserId::new(&req.user_id)?;

    let result = state
        .todo_service
        .create_list(CreateTodoList::new(user_id))
        .await?;
    let aggregate_id = result
        .aggregate
        .id()
        .ok_or_else(|| ApiError::Domain(TodoListError::NotCreated.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommandResponse {
            aggregate_id,
            version: result.new_version,
        }),
    ))
}

/// POST /todo-lists/{id}/todos
#[tracing::instrument(skip(state, req))]
pub async fn add_todo<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddTodoRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;
    let user_id = UserId::new(&req.user_id)?;
    let text = TodoText::new(&req.todo)?;

    let result = state
        .todo_service
        .add_todo(AddTodo::new(aggregate_id, user_id, text))
        .await?;

    Ok(Json(CommandResponse {
        aggregate_id,
        version: result.new_version,
    }))
}

/// GET /todo-lists/{id} and GET /todo-lists/{id}/todos
///
/// Served from the read model. A list the projector has not seen yet is
/// rebuilt from its events instead.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;

    match state.projector.get_list(aggregate_id).await {
        Ok(view) => Ok(Json(view.into())),
        Err(ProjectionError::NotFound(_)) => {
            tracing::debug!(%aggregate_id, "view missing, replaying events");
            let list = state.todo_service.get_list(aggregate_id).await?;
            Ok(Json(TodoListResponse::from_aggregate(aggregate_id, &list)))
        }
        Err(e) => Err(e.into()),
    }
}

// -- Helpers --

fn parse_aggregate_id(id: &str) -> Result<AggregateId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid todo list id: {id}")))
}
