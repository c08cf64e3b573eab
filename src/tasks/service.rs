use std::sync::Arc;

use super::model::{CreateTask, NewTask, OwnerSummary, Task, TaskChanges, UpdateTask};
use crate::auth::model::Account;
use crate::error::{AccessError, AppResult, AuthError};
use crate::store::{CredentialStore, TaskStore};
use crate::validation::{parse_due_date, validate_title};

/// CRUD over tasks, always scoped to the owner named by the caller's email.
///
/// Reads and writes never touch a row unless both its id and its owner match
/// in the same store call. A missing task and someone else's task produce the
/// same [`AccessError::NoAccess`]. Every task handed back carries its
/// owner's summary in `assigned_to`.
pub struct TaskService {
    accounts: Arc<dyn CredentialStore>,
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(accounts: Arc<dyn CredentialStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { accounts, tasks }
    }

    async fn owner(&self, owner_email: &str) -> AppResult<Account> {
        match self.accounts.find_by_email(owner_email).await? {
            Some(account) => Ok(account),
            None => {
                tracing::warn!("token names an email with no account behind it");
                Err(AuthError::AccountNotFound.into())
            }
        }
    }

    pub async fn create(&self, input: CreateTask, owner_email: &str) -> AppResult<Task> {
        let task = NewTask {
            title: validate_title(&input.title)?,
            description: input.description,
            due_date: parse_due_date(&input.due_date)?,
            status: input.status.unwrap_or_default(),
        };
        let owner = self.owner(owner_email).await?;

        let task = self.tasks.insert(owner.id, task).await?;
        tracing::debug!(task_id = task.id, owner_id = owner.id, "task created");
        Ok(assigned(task, &owner))
    }

    /// Ascending by id.
    pub async fn list(&self, owner_email: &str) -> AppResult<Vec<Task>> {
        let owner = self.owner(owner_email).await?;
        let tasks = self.tasks.list_owned(owner.id).await?;
        Ok(tasks.into_iter().map(|task| assigned(task, &owner)).collect())
    }

    pub async fn get_one(&self, id: i64, owner_email: &str) -> AppResult<Task> {
        let owner = self.owner(owner_email).await?;
        let task = self.find_owned(id, owner.id).await?;
        Ok(assigned(task, &owner))
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> AppResult<Task> {
        self.tasks
            .find_owned(id, owner_id)
            .await?
            .ok_or_else(|| AccessError::NoAccess.into())
    }

    pub async fn update(&self, id: i64, patch: UpdateTask, owner_email: &str) -> AppResult<Task> {
        let changes = TaskChanges {
            title: patch.title.as_deref().map(validate_title).transpose()?,
            description: patch.description,
            due_date: patch.due_date.as_deref().map(parse_due_date).transpose()?,
            status: patch.status,
        };

        let owner = self.owner(owner_email).await?;
        self.find_owned(id, owner.id).await?;

        // The write carries its own id + owner predicate. If the row vanished
        // after the read above, zero rows match and nothing else is touched.
        let task = self
            .tasks
            .update_owned(id, owner.id, &changes)
            .await?
            .ok_or(AccessError::NoAccess)?;
        tracing::debug!(task_id = task.id, owner_id = owner.id, "task updated");
        Ok(assigned(task, &owner))
    }

    pub async fn remove(&self, id: i64, owner_email: &str) -> AppResult<Task> {
        let owner = self.owner(owner_email).await?;
        self.find_owned(id, owner.id).await?;

        let task = self
            .tasks
            .delete_owned(id, owner.id)
            .await?
            .ok_or(AccessError::NoAccess)?;
        tracing::debug!(task_id = task.id, owner_id = owner.id, "task removed");
        Ok(assigned(task, &owner))
    }
}

fn assigned(task: Task, owner: &Account) -> Task {
    Task {
        assigned_to: Some(OwnerSummary::from(owner)),
        ..task
    }
}
