//! Screens the controllers can send the user to, and the messages shown on
//! the way. The desktop UI maps these onto its router and dialogs.

use std::fmt;

use crate::model::PostId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    PostList,
    NewPost,
    Edit(PostId),
    Post(PostId),
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::PostList => "/".to_string(),
            Navigation::NewPost => "/contents".to_string(),
            Navigation::Edit(id) => format!("/edit/{id}"),
            Navigation::Post(id) => format!("/posts/{id}"),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Blocking message the user must dismiss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// Notice followed by a move to another screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub notice: Notice,
    pub to: Navigation,
}
