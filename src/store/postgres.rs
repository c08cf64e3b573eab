use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{CredentialStore, TaskStore};
use crate::auth::model::{Account, NewAccount};
use crate::error::StoreError;
use crate::tasks::model::{NewTask, Task, TaskChanges};

const TASK_COLUMNS: &str = "id, title, description, due_date, status, owner_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;

        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    email: String,
    secret_hash: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            name: row.name,
            email: row.email,
            secret_hash: row.secret_hash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    due_date: NaiveDate,
    status: String,
    owner_id: i64,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(StoreError::Corrupt)?;
        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            status,
            owner_id: row.owner_id,
            assigned_to: None,
        })
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

fn into_task(row: Option<TaskRow>) -> Result<Option<Task>, StoreError> {
    row.map(Task::try_from).transpose()
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, email, secret_hash
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (name, email, secret_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, secret_hash
            "#,
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(row.into())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, owner_id: i64, task: NewTask) -> Result<Task, StoreError> {
        let query = format!(
            "INSERT INTO tasks (title, description, due_date, status, owner_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.status.as_str())
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list_owned(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let query =
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY id ASC");
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        into_task(row)
    }

    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError> {
        let query = format!(
            "UPDATE tasks SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                due_date = COALESCE($5, due_date), \
                status = COALESCE($6, status) \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.due_date)
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        into_task(row)
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError> {
        let query = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        into_task(row)
    }
}
