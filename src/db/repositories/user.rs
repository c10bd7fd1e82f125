use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};
use crate::models::UserRecord;
use crate::sync::datetime;
use chrono::NaiveDateTime;

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        Users::find()
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
    }

    /// `(username, id)` pairs for identity mapping.
    pub async fn username_ids(&self) -> Result<Vec<(String, i32)>, DbErr> {
        Users::find()
            .select_only()
            .column(users::Column::Username)
            .column(users::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        record: &UserRecord,
        captured_at: NaiveDateTime,
    ) -> Result<i32, DbErr> {
        let active = users::ActiveModel {
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            hashed_password: Set(record.hashed_password.clone()),
            role: Set(record.role.as_str().to_string()),
            first_name: Set(record.first_name.clone()),
            last_name: Set(record.last_name.clone()),
            phone: Set(record.phone.clone()),
            address: Set(record.address.clone()),
            is_active: Set(record.is_active),
            branch_id: Set(record.branch_id),
            last_login: Set(record.last_login.map(datetime::to_relational)),
            created_at: Set(Some(datetime::to_relational(
                record.created_at.unwrap_or(captured_at),
            ))),
            ..Default::default()
        };

        let res = Users::insert(active).exec(self.conn).await?;
        Ok(res.last_insert_id)
    }

    /// Overwrites every mutable field of `existing` with `record`. Username,
    /// key and creation time are left alone.
    pub async fn overwrite(&self, existing: users::Model, record: &UserRecord) -> Result<(), DbErr> {
        let mut active: users::ActiveModel = existing.into();
        active.email = Set(record.email.clone());
        active.hashed_password = Set(record.hashed_password.clone());
        active.role = Set(record.role.as_str().to_string());
        active.first_name = Set(record.first_name.clone());
        active.last_name = Set(record.last_name.clone());
        active.phone = Set(record.phone.clone());
        active.address = Set(record.address.clone());
        active.is_active = Set(record.is_active);
        active.branch_id = Set(record.branch_id);
        active.last_login = Set(record.last_login.map(datetime::to_relational));
        active.update(self.conn).await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Users::find().count(self.conn).await
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    fn matches(password: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn test_hash_uses_configured_params() {
        let hash = hash_password("forklift", Some(&fast_params())).unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(matches("forklift", &hash));
        assert!(!matches("pallet", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("forklift", Some(&fast_params())).unwrap();
        let second = hash_password("forklift", Some(&fast_params())).unwrap();
        assert_ne!(first, second);
    }
}
