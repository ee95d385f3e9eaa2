use async_graphql::{Enum, InputObject};
use std::cmp::Ordering;

use super::models::UserModel;
use crate::pagination::Direction;

/// Input for registering a new account
#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Profile changes; missing fields stay as they are
#[derive(Debug, Clone, Default, InputObject)]
pub struct EditUserInput {
    pub name: Option<String>,
    pub username: Option<String>,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortField {
    #[default]
    Username,
    Name,
    CreatedAt,
}

impl UserSortField {
    pub fn column(&self) -> &'static str {
        match self {
            UserSortField::Username => "username",
            UserSortField::Name => "name",
            UserSortField::CreatedAt => "created_at",
        }
    }

    pub fn compare(&self, a: &UserModel, b: &UserModel) -> Ordering {
        match self {
            UserSortField::Username => a.username.cmp(&b.username),
            UserSortField::Name => a.name.cmp(&b.name),
            UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct UserSort {
    pub field: UserSortField,
    #[graphql(default)]
    pub direction: Direction,
}
