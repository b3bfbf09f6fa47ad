use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::models::wordbook::{NewWordbookEntry, WordbookEntry};
use crate::repositories::WordbookStore;

use super::{RequestHandler, Service, ServiceError};

pub enum WordbookRequest {
    List {
        user_id: String,
        response: oneshot::Sender<Result<Vec<WordbookEntry>, ServiceError>>,
    },
    Add {
        user_id: String,
        entry: NewWordbookEntry,
        response: oneshot::Sender<Result<WordbookEntry, ServiceError>>,
    },
    Delete {
        user_id: String,
        entry_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct WordbookRequestHandler {
    store: Arc<dyn WordbookStore>,
}

impl WordbookRequestHandler {
    pub fn new(store: Arc<dyn WordbookStore>) -> Self {
        WordbookRequestHandler { store }
    }

    async fn list(&self, user_id: &str) -> Result<Vec<WordbookEntry>, ServiceError> {
        self.store
            .list_entries(user_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn add(
        &self,
        user_id: &str,
        entry: NewWordbookEntry,
    ) -> Result<WordbookEntry, ServiceError> {
        let inserted = self
            .store
            .insert_entry(user_id, entry)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        inserted.ok_or(ServiceError::DuplicateWord)
    }

    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<(), ServiceError> {
        self.store
            .delete_entry(user_id, entry_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<WordbookRequest> for WordbookRequestHandler {
    async fn handle_request(&self, request: WordbookRequest) {
        match request {
            WordbookRequest::List { user_id, response } => {
                let entries = self.list(&user_id).await;
                let _ = response.send(entries);
            }
            WordbookRequest::Add {
                user_id,
                entry,
                response,
            } => {
                let entry = self.add(&user_id, entry).await;
                let _ = response.send(entry);
            }
            WordbookRequest::Delete {
                user_id,
                entry_id,
                response,
            } => {
                let result = self.delete(&user_id, &entry_id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct WordbookService;

impl WordbookService {
    pub fn new() -> Self {
        WordbookService {}
    }
}

#[async_trait]
impl Service<WordbookRequest, WordbookRequestHandler> for WordbookService {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Mirrors the store's conflict-safe insert: the entry lands only if the
    /// (user_id, word) pair is not already present.
    struct FakeWordbookStore {
        entries: Mutex<Vec<WordbookEntry>>,
    }

    impl FakeWordbookStore {
        fn empty() -> Self {
            FakeWordbookStore {
                entries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WordbookStore for FakeWordbookStore {
        async fn list_entries(&self, user_id: &str) -> Result<Vec<WordbookEntry>, anyhow::Error> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .filter(|entry| entry.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert_entry(
            &self,
            user_id: &str,
            entry: NewWordbookEntry,
        ) -> Result<Option<WordbookEntry>, anyhow::Error> {
            let mut entries = self.entries.lock().unwrap();
            if entries
                .iter()
                .any(|existing| existing.user_id == user_id && existing.word == entry.word)
            {
                return Ok(None);
            }

            let inserted = WordbookEntry {
                id: Uuid::new_v4().hyphenated().to_string(),
                user_id: user_id.to_string(),
                word: entry.word,
                context_sentence: entry.context_sentence,
                parsed_data: entry.parsed_data,
                created_at: Utc::now(),
            };
            entries.push(inserted.clone());
            Ok(Some(inserted))
        }

        async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), anyhow::Error> {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|entry| !(entry.user_id == user_id && entry.id == entry_id));
            Ok(())
        }
    }

    fn new_entry(word: &str) -> NewWordbookEntry {
        NewWordbookEntry {
            word: word.to_string(),
            context_sentence: None,
            parsed_data: None,
        }
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_without_a_second_row() {
        let store = Arc::new(FakeWordbookStore::empty());
        let handler = WordbookRequestHandler::new(Arc::clone(&store) as Arc<dyn WordbookStore>);

        let first = handler.add("user-1", new_entry("telephone")).await;
        assert!(first.is_ok());

        let second = handler.add("user-1", new_entry("telephone")).await;
        assert!(matches!(second, Err(ServiceError::DuplicateWord)));

        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn same_word_for_another_user_is_not_a_duplicate() {
        let store = Arc::new(FakeWordbookStore::empty());
        let handler = WordbookRequestHandler::new(Arc::clone(&store) as Arc<dyn WordbookStore>);

        handler.add("user-1", new_entry("telephone")).await.unwrap();
        let other = handler.add("user-2", new_entry("telephone")).await;

        assert!(other.is_ok());
        assert_eq!(store.entries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_only_touches_own_entries() {
        let store = Arc::new(FakeWordbookStore::empty());
        let handler = WordbookRequestHandler::new(Arc::clone(&store) as Arc<dyn WordbookStore>);

        let mine = handler.add("user-1", new_entry("telephone")).await.unwrap();
        handler.add("user-2", new_entry("telephone")).await.unwrap();

        handler.delete("user-2", &mine.id).await.unwrap();
        assert_eq!(store.entries.lock().unwrap().len(), 2);

        handler.delete("user-1", &mine.id).await.unwrap();
        assert_eq!(store.entries.lock().unwrap().len(), 1);
    }
}
