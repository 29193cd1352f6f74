//! MemberType GraphQL type

use async_graphql::Object;

use crate::models::{MemberType as DbMemberType, MemberTypeId};

pub struct MemberType {
    inner: DbMemberType,
}

impl From<DbMemberType> for MemberType {
    fn from(member_type: DbMemberType) -> Self {
        Self { inner: member_type }
    }
}

/// Membership tier
#[Object]
impl MemberType {
    async fn id(&self) -> MemberTypeId {
        self.inner.id
    }

    /// Percentage discount granted to members of this tier
    async fn discount(&self) -> f64 {
        self.inner.discount
    }

    async fn posts_limit_per_month(&self) -> i32 {
        self.inner.posts_limit_per_month
    }
}
