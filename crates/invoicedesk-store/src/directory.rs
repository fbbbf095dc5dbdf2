//! Cached client list backed by the remote directory API.

use std::sync::{PoisonError, RwLock};

use invoicedesk_core::{ClientDraft, ClientId, ClientRecord, Confirm, DirectoryApi, validate};
use tracing::{info, warn};

use crate::StoreError;

const LIST_FAILED: &str = "failed to load clients";
const SAVE_FAILED: &str = "failed to save client";
const DELETE_FAILED: &str = "failed to delete client";

/// Outcome of a guarded deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The operator declined; no request was sent.
    Declined,
    Deleted,
}

#[derive(Debug, Default)]
struct Cache {
    clients: Vec<ClientRecord>,
    loaded: bool,
}

/// Client directory store.
///
/// The cached list is only ever replaced wholesale by a successful
/// `GET /clientes`; mutations go to the server first and are followed by a
/// refresh that completes before the mutation returns. Refreshes are not
/// coalesced: when two overlap, whichever response arrives last wins.
pub struct ClientDirectory<A> {
    api: A,
    cache: RwLock<Cache>,
}

impl<A: DirectoryApi> ClientDirectory<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Snapshot of the cached list.
    pub fn clients(&self) -> Vec<ClientRecord> {
        self.read(|c| c.clients.clone())
    }

    /// Look up a cached record by id.
    pub fn find(&self, id: ClientId) -> Option<ClientRecord> {
        self.read(|c| c.clients.iter().find(|r| r.id == id).cloned())
    }

    /// True once any list fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.read(|c| c.loaded)
    }

    /// Fetch the full list and replace the cache.
    ///
    /// On failure the previously cached list is left untouched; the caller
    /// decides whether to show it as stale. There is no automatic retry.
    pub async fn list(&self) -> Result<Vec<ClientRecord>, StoreError> {
        match self.api.list_clients().await {
            Ok(clients) => {
                info!(count = clients.len(), "client list refreshed");
                self.write(|c| {
                    c.clients = clients.clone();
                    c.loaded = true;
                });
                Ok(clients)
            }
            Err(e) => {
                warn!(error = %e, "client list refresh failed; keeping cached list");
                Err(StoreError::operation(e, LIST_FAILED))
            }
        }
    }

    /// Create a client from a valid draft, then refresh.
    pub async fn create(&self, draft: &ClientDraft) -> Result<ClientRecord, StoreError> {
        ensure_valid(draft)?;
        let created = self
            .api
            .create_client(draft)
            .await
            .map_err(|e| StoreError::operation(e, SAVE_FAILED))?;
        info!(id = %created.id, "client created");
        self.refresh_after_mutation().await;
        Ok(created)
    }

    /// Replace the client `id` with a valid draft, then refresh.
    pub async fn update(&self, id: ClientId, draft: &ClientDraft) -> Result<ClientRecord, StoreError> {
        ensure_valid(draft)?;
        let updated = self
            .api
            .update_client(id, draft)
            .await
            .map_err(|e| StoreError::targeting(id, e, SAVE_FAILED))?;
        info!(id = %updated.id, "client updated");
        self.refresh_after_mutation().await;
        Ok(updated)
    }

    /// Delete client `id` once `confirm` agrees, then refresh.
    ///
    /// The confirmation runs before any network traffic; a refusal returns
    /// [`Deletion::Declined`] without touching the server or the cache.
    pub async fn delete(&self, id: ClientId, confirm: &impl Confirm) -> Result<Deletion, StoreError> {
        let prompt = format!("Delete client {id}? This cannot be undone.");
        if !confirm.confirm(&prompt) {
            info!(id = %id, "deletion declined");
            return Ok(Deletion::Declined);
        }

        self.api
            .delete_client(id)
            .await
            .map_err(|e| StoreError::targeting(id, e, DELETE_FAILED))?;
        info!(id = %id, "client deleted");
        self.refresh_after_mutation().await;
        Ok(Deletion::Deleted)
    }

    /// The mutation already succeeded on the server, so a failed refresh is
    /// logged rather than reported as a failure of the mutation.
    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.list().await {
            warn!(error = %e, "refresh after mutation failed; cached list is stale");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Cache) -> T) -> T {
        let guard = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Cache)) {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

fn ensure_valid(draft: &ClientDraft) -> Result<(), StoreError> {
    let errors = validate(draft);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(errors))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use invoicedesk_core::{Field, FieldError, RemoteError};
    use mockall::{Sequence, mock};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    mock! {
        pub Directory {}

        #[async_trait]
        impl DirectoryApi for Directory {
            async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteError>;
            async fn create_client(&self, draft: &ClientDraft) -> Result<ClientRecord, RemoteError>;
            async fn update_client(
                &self,
                id: ClientId,
                draft: &ClientDraft,
            ) -> Result<ClientRecord, RemoteError>;
            async fn delete_client(&self, id: ClientId) -> Result<(), RemoteError>;
        }
    }

    pub(crate) fn record(id: i64, name: &str) -> ClientRecord {
        ClientRecord {
            id: ClientId(id),
            name: name.into(),
            email: format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
            tax_id: "52998224725".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 8, 20)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    fn draft() -> ClientDraft {
        ClientDraft::new("João Silva Santos", "joao.silva@email.com", "12345678901")
    }

    /// In-memory directory service that behaves like the real one.
    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        rows: Mutex<Vec<ClientRecord>>,
        next_id: AtomicUsize,
        pub(crate) list_calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryApi for FakeDirectory {
        async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create_client(&self, draft: &ClientDraft) -> Result<ClientRecord, RemoteError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.email == draft.email) {
                return Err(RemoteError::Rejected {
                    status: 400,
                    detail: Some("Email já cadastrado".into()),
                });
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            let mut rec = record(id, &draft.name);
            rec.email = draft.email.clone();
            rec.tax_id = draft.tax_id.clone();
            rows.push(rec.clone());
            Ok(rec)
        }

        async fn update_client(
            &self,
            id: ClientId,
            draft: &ClientDraft,
        ) -> Result<ClientRecord, RemoteError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(rec) = rows.iter_mut().find(|r| r.id == id) else {
                return Err(RemoteError::NotFound {
                    detail: Some("Cliente não encontrado".into()),
                });
            };
            rec.name = draft.name.clone();
            rec.email = draft.email.clone();
            rec.tax_id = draft.tax_id.clone();
            Ok(rec.clone())
        }

        async fn delete_client(&self, id: ClientId) -> Result<(), RemoteError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            if rows.len() == before {
                return Err(RemoteError::NotFound {
                    detail: Some("Cliente não encontrado".into()),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn list_populates_cache() {
        let mut api = MockDirectory::new();
        api.expect_list_clients()
            .times(1)
            .returning(|| Ok(vec![record(1, "Ana"), record(2, "Bruno")]));

        let dir = ClientDirectory::new(api);
        assert!(!dir.is_loaded());
        let clients = dir.list().await.unwrap();
        assert_eq!(clients.len(), 2);
        assert!(dir.is_loaded());
        assert_eq!(dir.find(ClientId(2)).unwrap().name, "Bruno");
    }

    #[tokio::test]
    async fn failed_list_keeps_previous_cache() {
        let mut api = MockDirectory::new();
        let mut seq = Sequence::new();
        api.expect_list_clients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![record(1, "Ana")]));
        api.expect_list_clients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(RemoteError::Transport("connection refused".into())));

        let dir = ClientDirectory::new(api);
        dir.list().await.unwrap();
        let err = dir.list().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to load clients");
        assert_eq!(dir.clients(), vec![record(1, "Ana")]);
        assert!(dir.is_loaded());
    }

    #[tokio::test]
    async fn create_then_list_contains_draft_fields() {
        let dir = ClientDirectory::new(FakeDirectory::default());
        let created = dir.create(&draft()).await.unwrap();

        let listed = dir.list().await.unwrap();
        let found = listed.iter().find(|r| r.id == created.id).unwrap();
        assert_eq!(found.name, "João Silva Santos");
        assert_eq!(found.email, "joao.silva@email.com");
        assert_eq!(found.tax_id, "12345678901");
    }

    #[tokio::test]
    async fn create_refreshes_before_returning() {
        let dir = ClientDirectory::new(FakeDirectory::default());
        let created = dir.create(&draft()).await.unwrap();
        // No explicit list() call: the refresh already ran.
        assert_eq!(dir.find(created.id).unwrap().name, "João Silva Santos");
        assert_eq!(dir.api.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_server() {
        let mut api = MockDirectory::new();
        api.expect_create_client().never();
        api.expect_update_client().never();
        api.expect_list_clients().never();

        let dir = ClientDirectory::new(api);
        let bad = ClientDraft::new("", "joao@", "1");
        let Err(StoreError::Validation(errors)) = dir.create(&bad).await else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get(Field::Name), Some(FieldError::Required));
        assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidFormat));

        assert!(matches!(
            dir.update(ClientId(1), &bad).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_failure_surfaces_server_detail_and_keeps_cache() {
        let mut api = MockDirectory::new();
        let mut seq = Sequence::new();
        api.expect_list_clients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![record(1, "Ana")]));
        api.expect_create_client()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(RemoteError::Rejected {
                    status: 400,
                    detail: Some("CPF/CNPJ já cadastrado".into()),
                })
            });

        let dir = ClientDirectory::new(api);
        dir.list().await.unwrap();
        let err = dir.create(&draft()).await.unwrap_err();
        assert_eq!(err.to_string(), "CPF/CNPJ já cadastrado");
        assert_eq!(dir.clients(), vec![record(1, "Ana")]);
    }

    #[tokio::test]
    async fn create_failure_without_detail_uses_fallback() {
        let mut api = MockDirectory::new();
        api.expect_create_client()
            .returning(|_| Err(RemoteError::Rejected { status: 500, detail: None }));
        api.expect_list_clients().never();

        let dir = ClientDirectory::new(api);
        let err = dir.create(&draft()).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to save client");
        assert!(matches!(err.remote(), Some(RemoteError::Rejected { status: 500, .. })));
    }

    #[tokio::test]
    async fn update_replaces_record_and_refreshes() {
        let dir = ClientDirectory::new(FakeDirectory::default());
        let created = dir.create(&draft()).await.unwrap();

        let changed = ClientDraft::new("João S. Santos", "joao.santos@email.com", "529.982.247-25");
        dir.update(created.id, &changed).await.unwrap();

        let cached = dir.find(created.id).unwrap();
        assert_eq!(cached.name, "João S. Santos");
        assert_eq!(cached.email, "joao.santos@email.com");
        assert_eq!(cached.tax_id, "529.982.247-25");
        assert_eq!(cached.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_client_is_not_found() {
        let dir = ClientDirectory::new(FakeDirectory::default());
        let err = dir.update(ClientId(42), &draft()).await.unwrap_err();
        match err {
            StoreError::NotFound { id, message, .. } => {
                assert_eq!(id, ClientId(42));
                assert_eq!(message, "Cliente não encontrado");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(dir.api.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_without_confirmation_sends_nothing() {
        let mut api = MockDirectory::new();
        api.expect_delete_client().never();
        api.expect_list_clients().never();

        let dir = ClientDirectory::new(api);
        let asked = AtomicUsize::new(0);
        let decline = |_: &str| {
            asked.fetch_add(1, Ordering::SeqCst);
            false
        };
        let outcome = dir.delete(ClientId(1), &decline).await.unwrap();
        assert_eq!(outcome, Deletion::Declined);
        assert_eq!(asked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_calls_once_and_refreshes_once() {
        let mut api = MockDirectory::new();
        let mut seq = Sequence::new();
        api.expect_delete_client()
            .withf(|id| *id == ClientId(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        api.expect_list_clients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![record(2, "Bruno")]));

        let dir = ClientDirectory::new(api);
        let outcome = dir.delete(ClientId(1), &|_: &str| true).await.unwrap();
        assert_eq!(outcome, Deletion::Deleted);
        assert_eq!(dir.clients(), vec![record(2, "Bruno")]);
    }

    #[tokio::test]
    async fn delete_failure_is_operation_error_and_keeps_cache() {
        let mut api = MockDirectory::new();
        let mut seq = Sequence::new();
        api.expect_list_clients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![record(1, "Ana")]));
        api.expect_delete_client()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(RemoteError::Transport("connection reset".into())));

        let dir = ClientDirectory::new(api);
        dir.list().await.unwrap();
        let err = dir.delete(ClientId(1), &|_: &str| true).await.unwrap_err();
        assert!(matches!(err, StoreError::Operation { .. }));
        assert_eq!(err.to_string(), "failed to delete client");
        assert_eq!(dir.clients(), vec![record(1, "Ana")]);
    }

    #[tokio::test]
    async fn mutation_succeeds_even_if_refresh_fails() {
        let mut api = MockDirectory::new();
        api.expect_create_client()
            .times(1)
            .returning(|d| Ok(record(5, &d.name)));
        api.expect_list_clients()
            .times(1)
            .returning(|| Err(RemoteError::Rejected { status: 503, detail: None }));

        let dir = ClientDirectory::new(api);
        let created = dir.create(&draft()).await.unwrap();
        assert_eq!(created.id, ClientId(5));
        assert!(!dir.is_loaded());
    }

    /// Directory whose list responses arrive in the reverse order they were requested.
    struct SlowFirstList {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryApi for SlowFirstList {
        async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(vec![record(1, "Older")])
            } else {
                Ok(vec![record(1, "Newer")])
            }
        }

        async fn create_client(&self, _: &ClientDraft) -> Result<ClientRecord, RemoteError> {
            unreachable!()
        }

        async fn update_client(&self, _: ClientId, _: &ClientDraft) -> Result<ClientRecord, RemoteError> {
            unreachable!()
        }

        async fn delete_client(&self, _: ClientId) -> Result<(), RemoteError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn overlapping_refreshes_last_response_wins() {
        let dir = ClientDirectory::new(SlowFirstList {
            calls: AtomicUsize::new(0),
        });
        let (a, b) = tokio::join!(dir.list(), dir.list());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(dir.clients()[0].name, "Older");
    }

    #[tokio::test]
    async fn back_to_back_creates_each_refresh() {
        let dir = ClientDirectory::new(FakeDirectory::default());
        let first = draft();
        let second = ClientDraft::new("Maria Oliveira", "maria.oliveira@email.com", "98765432100");
        let (a, b) = tokio::join!(dir.create(&first), dir.create(&second));
        a.unwrap();
        b.unwrap();
        assert_eq!(dir.api.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(dir.clients().len(), 2);
    }
}
