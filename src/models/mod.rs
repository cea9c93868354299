use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub version: Option<i32>,
}

impl Post {
    #[cfg(test)]
    pub fn new(id: i32, user_id: i32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Post {
            id,
            user_id,
            title: title.into(),
            body: body.into(),
            version: None,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validate_content(&self.title, &self.body)
    }

    /// Keeps this record's `id`, `user_id` and `version`, takes the new text.
    pub fn merged_with(self, update: UpdatePost) -> Post {
        Post {
            title: update.title,
            body: update.body,
            ..self
        }
    }
}

/// Body of `PUT /api/posts/{id}`. A full post may be sent; anything other
/// than `title` and `body` is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdatePost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl FieldError {
    pub fn empty(field: &'static str) -> Self {
        FieldError {
            field: Some(field),
            message: "must not be empty".to_string(),
        }
    }
}

pub fn validate_content(title: &str, body: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::empty("title"));
    }
    if body.trim().is_empty() {
        errors.push(FieldError::empty("body"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl UpdatePost {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validate_content(&self.title, &self.body)
    }
}
