use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Agency, Case, CaseFilter, CaseId, Page, SlaRecord};

/// Storage abstraction for cases and their SLA records.
pub trait CaseRepository: Send + Sync {
    fn insert(&self, case: Case) -> Result<Case, RepositoryError>;
    fn update(&self, case: Case) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError>;
    fn list(&self, filter: &CaseFilter, page: Page) -> Result<Vec<Case>, RepositoryError>;
    fn all(&self) -> Result<Vec<Case>, RepositoryError>;
    /// Stores the SLA for `record.case_id`, replacing any earlier record.
    fn upsert_sla(&self, record: SlaRecord) -> Result<(), RepositoryError>;
    fn fetch_sla(&self, id: &CaseId) -> Result<Option<SlaRecord>, RepositoryError>;
    fn slas(&self) -> Result<Vec<SlaRecord>, RepositoryError>;
}

/// Read-only view of the agency roster.
pub trait AgencyDirectory: Send + Sync {
    fn agencies(&self) -> Result<Vec<Agency>, RepositoryError>;

    fn find(&self, name: &str) -> Result<Option<Agency>, RepositoryError> {
        Ok(self
            .agencies()?
            .into_iter()
            .find(|agency| agency.name == name))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store used by the service binary, the CLI, and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCaseStore {
    cases: Arc<Mutex<BTreeMap<CaseId, Case>>>,
    slas: Arc<Mutex<BTreeMap<CaseId, SlaRecord>>>,
    agencies: Arc<Mutex<Vec<Agency>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

impl MemoryCaseStore {
    pub fn with_agencies(agencies: Vec<Agency>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.agencies.lock() {
            *guard = agencies;
        }
        store
    }

    /// Bulk-loads cases, replacing any with the same id.
    pub fn load_cases<I>(&self, cases: I) -> Result<usize, RepositoryError>
    where
        I: IntoIterator<Item = Case>,
    {
        let mut guard = lock(&self.cases)?;
        let mut loaded = 0;
        for case in cases {
            guard.insert(case.id.clone(), case);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        lock(&self.cases).map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CaseRepository for MemoryCaseStore {
    fn insert(&self, case: Case) -> Result<Case, RepositoryError> {
        let mut guard = lock(&self.cases)?;
        if guard.contains_key(&case.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(case.id.clone(), case.clone());
        Ok(case)
    }

    fn update(&self, case: Case) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.cases)?;
        match guard.get_mut(&case.id) {
            Some(slot) => {
                *slot = case;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        Ok(lock(&self.cases)?.get(id).cloned())
    }

    fn list(&self, filter: &CaseFilter, page: Page) -> Result<Vec<Case>, RepositoryError> {
        Ok(lock(&self.cases)?
            .values()
            .filter(|case| filter.matches(case))
            .skip(page.skip)
            .take(page.limit)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Case>, RepositoryError> {
        Ok(lock(&self.cases)?.values().cloned().collect())
    }

    fn upsert_sla(&self, record: SlaRecord) -> Result<(), RepositoryError> {
        lock(&self.slas)?.insert(record.case_id.clone(), record);
        Ok(())
    }

    fn fetch_sla(&self, id: &CaseId) -> Result<Option<SlaRecord>, RepositoryError> {
        Ok(lock(&self.slas)?.get(id).cloned())
    }

    fn slas(&self) -> Result<Vec<SlaRecord>, RepositoryError> {
        Ok(lock(&self.slas)?.values().cloned().collect())
    }
}

impl AgencyDirectory for MemoryCaseStore {
    fn agencies(&self) -> Result<Vec<Agency>, RepositoryError> {
        Ok(lock(&self.agencies)?.clone())
    }
}
