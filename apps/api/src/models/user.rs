//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row from the `users` table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub balance: f64,
}

/// Fields required to create a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub balance: f64,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeUser {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl ChangeUser {
    /// Apply the change set to an in-memory row
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(balance) = self.balance {
            user.balance = balance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_user_only_touches_present_fields() {
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            balance: 10.0,
        };
        ChangeUser {
            balance: Some(12.5),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.name, "Ada");
        assert_eq!(user.balance, 12.5);
    }
}
