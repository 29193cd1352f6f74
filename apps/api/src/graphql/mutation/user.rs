//! User mutations
//!
//! - createUser: Create a user with a starting balance
//! - changeUser: Rename a user or adjust their balance
//! - deleteUser: Delete a user together with their posts, profile and
//!   subscriptions

use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::store_error;
use crate::graphql::types::User;
use crate::models::{ChangeUser, CreateUser};
use crate::store::Store;

/// Maximum length of a user name
const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub balance: f64,
}

/// Fields left out are not changed
#[derive(Debug, Clone, InputObject)]
pub struct ChangeUserInput {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_balance(balance: f64) -> Result<(), ApiError> {
    if !balance.is_finite() {
        return Err(ApiError::validation("balance must be a finite number"));
    }
    Ok(())
}

impl TryFrom<CreateUserInput> for CreateUser {
    type Error = ApiError;

    fn try_from(input: CreateUserInput) -> Result<Self, Self::Error> {
        validate_name(&input.name)?;
        validate_balance(input.balance)?;
        Ok(Self {
            name: input.name,
            balance: input.balance,
        })
    }
}

impl TryFrom<ChangeUserInput> for ChangeUser {
    type Error = ApiError;

    fn try_from(input: ChangeUserInput) -> Result<Self, Self::Error> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(balance) = input.balance {
            validate_balance(balance)?;
        }
        Ok(Self {
            name: input.name,
            balance: input.balance,
        })
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(&self, ctx: &Context<'_>, dto: CreateUserInput) -> Result<Option<User>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let input = CreateUser::try_from(dto).map_err(ApiError::into_graphql)?;

        let user = store.create_user(input).await.map_err(store_error)?;
        tracing::info!(user_id = %user.id, "User created");

        Ok(Some(User::from(user)))
    }

    async fn change_user(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeUserInput,
    ) -> Result<Option<User>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let change = ChangeUser::try_from(dto).map_err(ApiError::into_graphql)?;

        let user = store.update_user(id, change).await.map_err(store_error)?;
        Ok(Some(User::from(user)))
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        store.delete_user(id).await.map_err(store_error)?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(Some(true))
    }
}
