//! Value objects for the todo-list domain.

use serde::{Deserialize, Serialize};

use super::TodoListError;

/// Longest accepted user id, in characters.
pub const MAX_USER_ID_LEN: usize = 128;

/// Longest accepted todo text, in characters.
pub const MAX_TODO_TEXT_LEN: usize = 256;

/// Owner of a todo list.
///
/// Always trimmed and non-empty. Deserialization runs the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl AsRef<str>) -> Result<Self, TodoListError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TodoListError::InvalidUserId("user id is required".to_string()));
        }
        if trimmed.chars().count() > MAX_USER_ID_LEN {
            return Err(TodoListError::InvalidUserId(format!(
                "user id must be at most {MAX_USER_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = TodoListError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Text of a single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoText(String);

impl TodoText {
    pub fn new(value: impl AsRef<str>) -> Result<Self, TodoListError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TodoListError::InvalidTodoText(
                "todo text is required".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_TODO_TEXT_LEN {
            return Err(TodoListError::InvalidTodoText(format!(
                "todo text must be at most {MAX_TODO_TEXT_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TodoText {
    type Error = TodoListError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TodoText> for String {
    fn from(text: TodoText) -> Self {
        text.0
    }
}

/// An entry in a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: TodoText,
}

impl TodoItem {
    pub fn new(text: TodoText) -> Self {
        Self { text }
    }
}
