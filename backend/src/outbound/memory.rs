//! Process-local adapters for every driven port.
//!
//! The server falls back to these when no database or identity provider is
//! configured, and service tests run against them. State lives behind a
//! `Mutex`; a poisoned lock is recovered rather than propagated because each
//! operation leaves the maps consistent before it can panic.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::blob::validate_blob_path;
use crate::domain::ports::{
    BlobStore, BlobStoreError, IdentityProvider, IdentityProviderError, LessonRepository,
    LessonRepositoryError, ProfileRepository, ProfileRepositoryError, ProgressRepository,
    ProgressRepositoryError,
};
use crate::domain::{
    AccessToken, AuthSession, DirectoryQuery, EmailAddress, Identity, Instrument, Lesson, LessonId,
    LoginCredentials, NewPassword, Profile, ProfileDraft, ProgressChange, ProgressRecord,
    Registration, Role, SortDir, SortField, UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Profiles keyed by identity id.
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<UserId, Profile>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryProfileRepository {
    /// Create an empty repository stamping new profiles with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Insert or replace a profile.
    pub fn seed(&self, profile: Profile) {
        lock(&self.profiles).insert(*profile.id(), profile);
    }
}

fn directory_order(a: &Profile, b: &Profile, sort: SortField) -> Ordering {
    match sort {
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::Email => nulls_last(
            a.email().map(|email| email.as_ref()),
            b.email().map(|email| email.as_ref()),
        ),
        SortField::FullName => a.full_name().cmp(b.full_name()),
        SortField::Role => nulls_last(a.role().map(Role::as_str), b.role().map(Role::as_str)),
    }
}

fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches_search(profile: &Profile, needle: &str) -> bool {
    let email_hit = profile
        .email()
        .is_some_and(|email| email.as_ref().contains(needle));
    email_hit || profile.full_name().to_lowercase().contains(needle)
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.profiles).get(id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let profiles = lock(&self.profiles);
        Ok(ids.iter().filter_map(|id| profiles.get(id).cloned()).collect())
    }

    async fn assign_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut profiles = lock(&self.profiles);
        let existing = profiles.get(identity.id());
        let profile = Profile::new(ProfileDraft {
            id: *identity.id(),
            email: Some(identity.email().clone()),
            role: Some(role),
            instrument: existing.and_then(|p| p.instrument().cloned()),
            full_name: existing.map(|p| p.full_name().to_owned()).unwrap_or_default(),
            avatar_url: existing.and_then(|p| p.avatar_url().map(str::to_owned)),
            created_at: existing.map_or_else(|| self.clock.utc(), Profile::created_at),
        });
        profiles.insert(*identity.id(), profile.clone());
        Ok(profile)
    }

    async fn list_directory(
        &self,
        query: &DirectoryQuery,
    ) -> Result<(Vec<Profile>, u64), ProfileRepositoryError> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Profile> = lock(&self.profiles)
            .values()
            .filter(|profile| needle.as_deref().is_none_or(|n| matches_search(profile, n)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let order = directory_order(a, b, query.sort);
            match query.dir {
                SortDir::Asc => order,
                SortDir::Desc => order.reverse(),
            }
        });
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(usize::MAX);
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

/// Lessons keyed by id.
#[derive(Default)]
pub struct InMemoryLessonRepository {
    lessons: Mutex<HashMap<LessonId, Lesson>>,
}

impl InMemoryLessonRepository {
    /// Insert or replace a lesson.
    pub fn seed(&self, lesson: Lesson) {
        lock(&self.lessons).insert(lesson.id(), lesson);
    }

    /// Snapshot of every stored lesson, ascending by `order_index`.
    pub fn all(&self) -> Vec<Lesson> {
        sorted(lock(&self.lessons).values().cloned().collect())
    }

    /// Stored copy of one lesson.
    pub fn get(&self, id: &LessonId) -> Option<Lesson> {
        lock(&self.lessons).get(id).cloned()
    }
}

fn sorted(mut lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons.sort_by_key(|lesson| (lesson.order_index(), lesson.created_at()));
    lessons
}

#[async_trait]
impl LessonRepository for InMemoryLessonRepository {
    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, LessonRepositoryError> {
        Ok(self.get(id))
    }

    async fn list_published(
        &self,
        instrument: &Instrument,
    ) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let lessons = lock(&self.lessons)
            .values()
            .filter(|lesson| lesson.is_visible_to(Some(instrument)))
            .cloned()
            .collect();
        Ok(sorted(lessons))
    }

    async fn list_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let lessons = lock(&self.lessons)
            .values()
            .filter(|lesson| lesson.is_owned_by(teacher_id))
            .cloned()
            .collect();
        Ok(sorted(lessons))
    }

    async fn insert(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError> {
        let mut lessons = lock(&self.lessons);
        if lessons.contains_key(&lesson.id()) {
            return Err(LessonRepositoryError::query(format!(
                "duplicate lesson id {}",
                lesson.id()
            )));
        }
        lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn update_owned(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError> {
        let mut lessons = lock(&self.lessons);
        match lessons.get_mut(&lesson.id()) {
            Some(stored) if stored.is_owned_by(lesson.teacher_id()) => {
                *stored = lesson.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(
        &self,
        id: &LessonId,
        teacher_id: &UserId,
    ) -> Result<bool, LessonRepositoryError> {
        let mut lessons = lock(&self.lessons);
        if lessons.get(id).is_some_and(|lesson| lesson.is_owned_by(teacher_id)) {
            lessons.remove(id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Progress records keyed by `(user_id, lesson_id)`.
#[derive(Default)]
pub struct InMemoryProgressRepository {
    records: Mutex<BTreeMap<(UserId, LessonId), ProgressRecord>>,
}

impl InMemoryProgressRepository {
    /// Insert or replace a record.
    pub fn seed(&self, record: ProgressRecord) {
        lock(&self.records).insert((record.user_id, record.lesson_id), record);
    }

    /// Snapshot of every stored record.
    pub fn records(&self) -> Vec<ProgressRecord> {
        lock(&self.records).values().cloned().collect()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn find(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        Ok(lock(&self.records).get(&(*user_id, *lesson_id)).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| record.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn list_for_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| record.lesson_id == *lesson_id)
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        change: &ProgressChange,
    ) -> Result<ProgressRecord, ProgressRepositoryError> {
        let mut records = lock(&self.records);
        let key = (change.user_id, change.lesson_id);
        let current = records
            .remove(&key)
            .unwrap_or_else(|| ProgressRecord::not_started(change.user_id, change.lesson_id));
        let updated = current.apply(change);
        records.insert(key, updated.clone());
        Ok(updated)
    }

    async fn update_existing(
        &self,
        change: &ProgressChange,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        let mut records = lock(&self.records);
        let Some(stored) = records.get_mut(&(change.user_id, change.lesson_id)) else {
            return Ok(None);
        };
        *stored = stored.clone().apply(change);
        Ok(Some(stored.clone()))
    }
}

/// Blobs held in memory under their paths.
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store whose public URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            blobs: Mutex::new(BTreeMap::new()),
        }
    }

    /// Paths of every stored blob, sorted.
    pub fn paths(&self) -> Vec<String> {
        lock(&self.blobs).keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        validate_blob_path(path)?;
        let mut blobs = lock(&self.blobs);
        if blobs.contains_key(path) {
            return Err(BlobStoreError::already_exists(path));
        }
        blobs.insert(path.to_owned(), bytes);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

struct Account {
    identity: Identity,
    password: Zeroizing<String>,
}

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<EmailAddress, Account>,
    sessions: HashMap<String, Identity>,
}

/// Identity provider for local development.
///
/// Sign-ups are confirmed immediately and tokens are random UUIDs that live
/// until sign-out or restart. No email is sent.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<IdentityState>,
}

impl InMemoryIdentityProvider {
    fn issue_token(
        state: &mut IdentityState,
        identity: &Identity,
    ) -> Result<AccessToken, IdentityProviderError> {
        let raw = Uuid::new_v4().to_string();
        let token = AccessToken::new(raw.clone())
            .ok_or_else(|| IdentityProviderError::decode("generated token was blank"))?;
        state.sessions.insert(raw, identity.clone());
        Ok(token)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn current_identity(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Identity>, IdentityProviderError> {
        Ok(lock(&self.state).sessions.get(token.expose()).cloned())
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, IdentityProviderError> {
        let mut state = lock(&self.state);
        let identity = state
            .accounts
            .get(credentials.email())
            .filter(|account| account.password.as_str() == credentials.password())
            .map(|account| account.identity.clone())
            .ok_or_else(|| IdentityProviderError::rejected("invalid login credentials"))?;
        let access_token = Self::issue_token(&mut state, &identity)?;
        Ok(AuthSession {
            access_token,
            identity,
        })
    }

    async fn sign_up(&self, registration: &Registration) -> Result<(), IdentityProviderError> {
        let mut state = lock(&self.state);
        if state.accounts.contains_key(registration.email()) {
            return Err(IdentityProviderError::rejected("user already registered"));
        }
        let identity = Identity::new(UserId::random(), registration.email().clone());
        state.accounts.insert(
            registration.email().clone(),
            Account {
                identity,
                password: Zeroizing::new(registration.password().expose().to_owned()),
            },
        );
        Ok(())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityProviderError> {
        lock(&self.state).sessions.remove(token.expose());
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<(), IdentityProviderError> {
        if lock(&self.state).accounts.contains_key(email) {
            Ok(())
        } else {
            Err(IdentityProviderError::rejected("user not found"))
        }
    }

    async fn update_password(
        &self,
        token: &AccessToken,
        password: &NewPassword,
    ) -> Result<(), IdentityProviderError> {
        let mut state = lock(&self.state);
        let email = state
            .sessions
            .get(token.expose())
            .map(|identity| identity.email().clone())
            .ok_or_else(|| IdentityProviderError::rejected("session expired"))?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or_else(|| IdentityProviderError::rejected("user not found"))?;
        account.password = Zeroizing::new(password.expose().to_owned());
        Ok(())
    }

    async fn resend_confirmation(
        &self,
        email: &EmailAddress,
    ) -> Result<(), IdentityProviderError> {
        self.send_password_reset(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pagination::PageRequest;
    use rstest::rstest;

    fn profile(name: &str, email: &str, role: Option<Role>, minutes: i64) -> Profile {
        let base = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp");
        Profile::new(ProfileDraft {
            id: UserId::random(),
            email: Some(EmailAddress::new(email).expect("email")),
            role,
            instrument: None,
            full_name: name.to_owned(),
            avatar_url: None,
            created_at: base + Duration::minutes(minutes),
        })
    }

    fn seeded_directory() -> InMemoryProfileRepository {
        let repo = InMemoryProfileRepository::default();
        repo.seed(profile("Ada", "ada@example.com", Some(Role::Admin), 0));
        repo.seed(profile("Clara", "clara@example.com", Some(Role::Teacher), 1));
        repo.seed(profile("Robert", "robert@example.com", None, 2));
        repo
    }

    #[rstest]
    #[case(SortField::CreatedAt, SortDir::Desc, vec!["Robert", "Clara", "Ada"])]
    #[case(SortField::FullName, SortDir::Asc, vec!["Ada", "Clara", "Robert"])]
    #[case(SortField::Role, SortDir::Asc, vec!["Ada", "Clara", "Robert"])]
    #[tokio::test]
    async fn directory_sorts_by_requested_column(
        #[case] sort: SortField,
        #[case] dir: SortDir,
        #[case] expected: Vec<&str>,
    ) {
        let query = DirectoryQuery {
            sort,
            dir,
            ..DirectoryQuery::default()
        };

        let (page, total) = seeded_directory()
            .list_directory(&query)
            .await
            .expect("listing");

        let names: Vec<&str> = page.iter().map(Profile::full_name).collect();
        assert_eq!(names, expected);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn directory_search_is_case_insensitive_and_counts_matches() {
        let query = DirectoryQuery {
            search: Some("CLA".to_owned()),
            ..DirectoryQuery::default()
        };

        let (page, total) = seeded_directory()
            .list_directory(&query)
            .await
            .expect("listing");

        assert_eq!(total, 1);
        assert_eq!(page.first().map(Profile::full_name), Some("Clara"));
    }

    #[tokio::test]
    async fn directory_pages_past_the_end_are_empty() {
        let query = DirectoryQuery {
            page: PageRequest::new(2, 10).expect("page"),
            ..DirectoryQuery::default()
        };

        let (page, total) = seeded_directory()
            .list_directory(&query)
            .await
            .expect("listing");

        assert!(page.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn assign_role_keeps_existing_profile_fields() {
        let repo = InMemoryProfileRepository::default();
        let existing = profile("Robert", "robert@example.com", None, 0);
        repo.seed(existing.clone());
        let identity = Identity::new(
            *existing.id(),
            EmailAddress::new("robert@example.com").expect("email"),
        );

        let updated = repo
            .assign_role(&identity, Role::Student)
            .await
            .expect("assigned");

        assert_eq!(updated.role(), Some(Role::Student));
        assert_eq!(updated.full_name(), "Robert");
        assert_eq!(updated.created_at(), existing.created_at());
    }

    #[tokio::test]
    async fn blob_store_refuses_overwrites_and_traversal() {
        let store = InMemoryBlobStore::new("https://cdn.example.com/");
        store.upload("a/b.pdf", vec![1]).await.expect("first upload");

        assert_eq!(
            store.upload("a/b.pdf", vec![2]).await,
            Err(BlobStoreError::already_exists("a/b.pdf"))
        );
        assert_eq!(
            store.upload("../b.pdf", vec![2]).await,
            Err(BlobStoreError::invalid_path("../b.pdf"))
        );
        assert_eq!(store.public_url("a/b.pdf"), "https://cdn.example.com/a/b.pdf");
    }

    #[tokio::test]
    async fn identity_provider_round_trips_a_session() {
        let provider = InMemoryIdentityProvider::default();
        let registration =
            Registration::try_from_parts("ada@example.com", "secret1", "Ada").expect("form");
        provider.sign_up(&registration).await.expect("signed up");
        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", "secret1").expect("creds");

        let session = provider.sign_in(&credentials).await.expect("signed in");
        let resolved = provider
            .current_identity(&session.access_token)
            .await
            .expect("lookup");
        provider
            .sign_out(&session.access_token)
            .await
            .expect("signed out");
        let after = provider
            .current_identity(&session.access_token)
            .await
            .expect("lookup");

        assert_eq!(resolved, Some(session.identity));
        assert_eq!(after, None);
    }

    #[tokio::test]
    async fn identity_provider_rejects_wrong_passwords() {
        let provider = InMemoryIdentityProvider::default();
        let registration =
            Registration::try_from_parts("ada@example.com", "secret1", "Ada").expect("form");
        provider.sign_up(&registration).await.expect("signed up");
        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", "wrong!").expect("creds");

        let err = provider.sign_in(&credentials).await.expect_err("rejected");

        assert!(matches!(err, IdentityProviderError::Rejected { .. }));
    }
}
