//! Profile mutations
//!
//! A user has at most one profile; creating a second one is a `CONFLICT`.

use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::store_error;
use crate::graphql::types::Profile;
use crate::models::{ChangeProfile, CreateProfile, MemberTypeId};
use crate::store::Store;

/// Accepted range for `yearOfBirth`
const YEAR_OF_BIRTH_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

#[derive(Debug, Clone, InputObject)]
pub struct CreateProfileInput {
    pub user_id: Uuid,
    pub is_male: bool,
    pub year_of_birth: i32,
    pub member_type_id: MemberTypeId,
}

#[derive(Debug, Clone, InputObject)]
pub struct ChangeProfileInput {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

fn validate_year_of_birth(year: i32) -> Result<(), ApiError> {
    if !YEAR_OF_BIRTH_RANGE.contains(&year) {
        return Err(ApiError::validation(format!(
            "yearOfBirth must be between {} and {}",
            YEAR_OF_BIRTH_RANGE.start(),
            YEAR_OF_BIRTH_RANGE.end()
        )));
    }
    Ok(())
}

impl TryFrom<CreateProfileInput> for CreateProfile {
    type Error = ApiError;

    fn try_from(input: CreateProfileInput) -> Result<Self, Self::Error> {
        validate_year_of_birth(input.year_of_birth)?;
        Ok(Self {
            user_id: input.user_id,
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            member_type_id: input.member_type_id,
        })
    }
}

impl TryFrom<ChangeProfileInput> for ChangeProfile {
    type Error = ApiError;

    fn try_from(input: ChangeProfileInput) -> Result<Self, Self::Error> {
        if let Some(year) = input.year_of_birth {
            validate_year_of_birth(year)?;
        }
        Ok(Self {
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            member_type_id: input.member_type_id,
        })
    }
}

#[derive(Default)]
pub struct ProfileMutation;

#[Object]
impl ProfileMutation {
    async fn create_profile(
        &self,
        ctx: &Context<'_>,
        dto: CreateProfileInput,
    ) -> Result<Option<Profile>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let input = CreateProfile::try_from(dto).map_err(ApiError::into_graphql)?;

        let profile = store.create_profile(input).await.map_err(store_error)?;
        tracing::info!(profile_id = %profile.id, user_id = %profile.user_id, "Profile created");

        Ok(Some(Profile::from(profile)))
    }

    async fn change_profile(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeProfileInput,
    ) -> Result<Option<Profile>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let change = ChangeProfile::try_from(dto).map_err(ApiError::into_graphql)?;

        let profile = store
            .update_profile(id, change)
            .await
            .map_err(store_error)?;
        Ok(Some(Profile::from(profile)))
    }

    async fn delete_profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        store.delete_profile(id).await.map_err(store_error)?;
        Ok(Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1899, false)]
    #[case(1900, true)]
    #[case(1987, true)]
    #[case(2100, true)]
    #[case(2101, false)]
    fn test_year_of_birth_bounds(#[case] year: i32, #[case] accepted: bool) {
        assert_eq!(validate_year_of_birth(year).is_ok(), accepted);
    }
}
