//! Storage seams for accounts and tasks.
//!
//! - `PgStore`: Postgres via sqlx, the production backend
//! - `MemoryStore`: in-process maps, non-persistent (dev runs and tests)
//!
//! Every single-task method takes the task id and the owner id together and
//! applies both in the same predicate. `None` means no row matched, which is
//! how a task that belongs to someone else looks from here.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::auth::model::{Account, NewAccount};
use crate::error::StoreError;
use crate::tasks::model::{NewTask, Task, TaskChanges};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact match on the email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, owner_id: i64, task: NewTask) -> Result<Task, StoreError>;

    /// All tasks of one owner, ascending by id.
    async fn list_owned(&self, owner_id: i64) -> Result<Vec<Task>, StoreError>;

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError>;

    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns the row as it was before deletion.
    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError>;
}
