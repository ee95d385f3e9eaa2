use async_graphql::{ErrorExtensions, SimpleObject, Union, ID};
use tracing::error;
use uuid::Uuid;

use super::objects::{Ingredient, Recipe, Step, User};
use crate::recipe::models::{IngredientModel, RecipeModel, StepModel};
use crate::shared::AppError;
use crate::user::models::UserModel;

/// Inline error record returned in place of an object
#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "Error")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

impl From<&AppError> for ApiError {
    fn from(error: &AppError) -> Self {
        Self {
            code: i32::from(error.status_code().as_u16()),
            message: error.to_string(),
        }
    }
}

/// Converts an error that cannot be shown as a record into a GraphQL error.
/// Infrastructure failures are logged and reported without detail.
pub fn graphql_error(error: AppError) -> async_graphql::Error {
    if error.is_user_facing() {
        let code = i32::from(error.status_code().as_u16());
        async_graphql::Error::new(error.to_string()).extend_with(|_, ext| ext.set("code", code))
    } else {
        error!(error = %error, "GraphQL operation failed");
        async_graphql::Error::new("Internal server error").extend_with(|_, ext| ext.set("code", 500))
    }
}

/// A union of one object type and `Error`
pub trait Respond: Sized {
    type Model;

    fn found(model: Self::Model) -> Self;
    fn failed(error: ApiError) -> Self;
}

/// User-facing failures become `Error` records; the rest become GraphQL errors
pub fn respond<R: Respond>(result: Result<R::Model, AppError>) -> async_graphql::Result<R> {
    match result {
        Ok(model) => Ok(R::found(model)),
        Err(e) if e.is_user_facing() => Ok(R::failed(ApiError::from(&e))),
        Err(e) => Err(graphql_error(e)),
    }
}

macro_rules! response_union {
    ($union:ident, $object:ident, $model:ty) => {
        #[derive(Union)]
        pub enum $union {
            $object($object),
            Error(ApiError),
        }

        impl Respond for $union {
            type Model = $model;

            fn found(model: $model) -> Self {
                $union::$object($object(model))
            }

            fn failed(error: ApiError) -> Self {
                $union::Error(error)
            }
        }
    };
}

response_union!(UserResponse, User, UserModel);
response_union!(RecipeResponse, Recipe, RecipeModel);
response_union!(StepResponse, Step, StepModel);
response_union!(IngredientResponse, Ingredient, IngredientModel);

/// Parses a GraphQL ID into a UUID
pub fn parse_id(id: &ID) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.as_str()).map_err(|_| AppError::Validation(format!("Invalid id '{}'", id.as_str())))
}

pub fn parse_cursor(from: Option<&ID>) -> Result<Option<Uuid>, AppError> {
    from.map(parse_id).transpose()
}
