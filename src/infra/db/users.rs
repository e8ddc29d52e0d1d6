use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::query::ListQuery;
use crate::application::repos::{CreateUser, RepoError, UpdateUser, UserLookup, UsersRepo};
use crate::domain::entities::UserRecord;

use super::util::map_sqlx_error;
use super::{PostgresRepositories, paginate::paginate};

// The projection never includes password_hash; it must not end up in any
// record that can be cached.
const USER_COLUMNS: &str = "user_id, user_name, email, role, first_name, last_name, \
     last_login, created_at, updated_at";

const USER_SORTABLE: &[&str] = &["user_name", "email", "role", "created_at", "last_login"];

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: Option<String>,
    role: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    last_login: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            user_name: row.user_name,
            email: row.email,
            role: row.role,
            first_name: row.first_name,
            last_name: row.last_name,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find(&self, lookup: &UserLookup) -> Result<UserRecord, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE "
        ));
        match lookup {
            UserLookup::ById(user_id) => {
                qb.push("user_id = ");
                qb.push_bind(*user_id);
            }
            UserLookup::ByUserName(user_name) => {
                qb.push("user_name = ");
                qb.push_bind(user_name.clone());
            }
        }

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(UserRecord::from(row))
    }

    async fn list(&self, request: &PageRequest) -> Result<PageResult<UserRecord>, RepoError> {
        let query = ListQuery::new("users", USER_COLUMNS, "user_id", USER_SORTABLE);
        let page = paginate::<UserRow>(self.pool(), &query, request).await?;
        Ok(page.map(UserRecord::from))
    }

    async fn create(&self, params: CreateUser) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users ( \
                 user_id, user_name, password_hash, email, role, first_name, last_name \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.user_name)
        .bind(params.password_hash)
        .bind(params.email)
        .bind(params.role)
        .bind(params.first_name)
        .bind(params.last_name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(UserRecord::from(row))
    }

    async fn update(&self, user_id: Uuid, params: UpdateUser) -> Result<UserRecord, RepoError> {
        // Partial update: only the provided columns change.
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");

        if let Some(user_name) = params.user_name {
            qb.push(", user_name = ");
            qb.push_bind(user_name);
        }
        if let Some(password_hash) = params.password_hash {
            qb.push(", password_hash = ");
            qb.push_bind(password_hash);
        }
        if let Some(email) = params.email {
            qb.push(", email = ");
            qb.push_bind(email);
        }
        if let Some(role) = params.role {
            qb.push(", role = ");
            qb.push_bind(role);
        }
        if let Some(first_name) = params.first_name {
            qb.push(", first_name = ");
            qb.push_bind(first_name);
        }
        if let Some(last_name) = params.last_name {
            qb.push(", last_name = ");
            qb.push_bind(last_name);
        }
        if let Some(last_login) = params.last_login {
            qb.push(", last_login = ");
            qb.push_bind(last_login);
        }

        qb.push(" WHERE user_id = ");
        qb.push_bind(user_id);
        qb.push(format!(" RETURNING {USER_COLUMNS}"));

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(UserRecord::from(row))
    }

    async fn hard_delete(&self, user_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
