//! In-memory store (non-persistent).

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CredentialStore, TaskStore};
use crate::auth::model::{Account, NewAccount};
use crate::error::StoreError;
use crate::tasks::model::{NewTask, Task, TaskChanges};

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    tasks: BTreeMap<i64, Task>,
    last_account_id: i64,
    last_task_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.read().await.accounts.get(email).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.last_account_id += 1;
        let account = Account {
            id: tables.last_account_id,
            name: account.name,
            email: account.email,
            secret_hash: account.secret_hash,
        };
        tables.accounts.insert(account.email.clone(), account.clone());
        Ok(account)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, owner_id: i64, task: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_task_id += 1;
        let task = Task {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            status: task.status,
            owner_id,
            assigned_to: None,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_owned(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables
            .tasks
            .get_mut(&id)
            .filter(|task| task.owner_id == owner_id)
        else {
            return Ok(None);
        };
        changes.apply(task);
        Ok(Some(task.clone()))
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .tasks
            .get(&id)
            .is_some_and(|task| task.owner_id == owner_id);
        if !owned {
            return Ok(None);
        }
        Ok(tables.tasks.remove(&id))
    }
}
