use std::sync::Arc;
use tracing::{error, info, trace};

use super::entity::CrudEntity;
use super::error::{CrudError, StoreError};
use super::mapper::CrudMapper;
use super::repository::CrudRepository;
use crate::instant::InstantProvider;
use crate::pagination::{PageRequest, Paged};
use crate::parameters::Parameters;

type IdOf<R> = <<R as CrudRepository>::Entity as CrudEntity>::Id;

/// The two ways an existing entity can change.
enum Mutation<U> {
    Update(U),
    MarkDeleted,
}

/// Business operations over one entity type.
///
/// Updates and deletes use optimistic locking: the entity is read, changed
/// and written back only if its stored version did not move in between.
/// Soft-deleted entities behave exactly like missing ones.
pub struct CrudService<R, M> {
    type_name: String,
    instant_provider: Arc<dyn InstantProvider>,
    repository: R,
    mapper: M,
}

impl<R, M> CrudService<R, M>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
{
    pub fn new(
        type_name: impl Into<String>,
        instant_provider: Arc<dyn InstantProvider>,
        repository: R,
        mapper: M,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            instant_provider,
            repository,
            mapper,
        }
    }

    /// Name used in log lines and error messages, e.g. `"Foo"`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    #[must_use]
    pub fn instant_provider(&self) -> &dyn InstantProvider {
        self.instant_provider.as_ref()
    }

    /// # Errors
    ///
    /// [`CrudError::AlreadyExists`] when the store reports a duplicate, or the
    /// store failure itself.
    pub async fn create(
        &self,
        create_model: M::CreateModel,
        parameters: &Parameters,
    ) -> Result<M::Model, CrudError> {
        info!(type_name = %self.type_name, ?parameters, ?create_model, "Creating entity");

        let entity = self
            .mapper
            .entity_to_be_created_from(&create_model, self.instant_provider.now());
        trace!(?entity, "Entity to be created");

        let created = self
            .repository
            .insert(entity, parameters)
            .await
            .map_err(|err| match err {
                StoreError::Duplicate(_) => {
                    CrudError::already_exists(&self.type_name, &create_model)
                }
                err => err.into(),
            })?;
        trace!(entity = ?created, "Created entity");

        let model = self.mapper.entity_to_model(&created);
        trace!(?model, "Created model");
        Ok(model)
    }

    /// # Errors
    ///
    /// Store failures.
    pub async fn list(
        &self,
        request: PageRequest,
        parameters: &Parameters,
    ) -> Result<Paged<M::Model>, CrudError> {
        info!(type_name = %self.type_name, ?parameters, ?request, "Listing entities");

        let page = self.repository.find_page(request, parameters).await?;
        trace!(entities = ?page.items, total_pages = page.total_pages, "Found page");

        let data = page
            .items
            .iter()
            .map(|entity| self.mapper.entity_to_model(entity))
            .collect();
        Ok(Paged::new(data, request, page.total_pages))
    }

    /// Absence is not an error here, the caller decides what it means.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn get(
        &self,
        id: &IdOf<R>,
        parameters: &Parameters,
    ) -> Result<Option<M::Model>, CrudError> {
        info!(type_name = %self.type_name, ?parameters, %id, "Getting entity");

        let entity = self.repository.find_by_id(id, parameters).await?;
        trace!(?entity, "Found entity");

        Ok(entity.map(|entity| self.mapper.entity_to_model(&entity)))
    }

    /// # Errors
    ///
    /// [`CrudError::NotFound`] for missing or deleted entities,
    /// [`CrudError::AlreadyExists`] when the new data collides with another
    /// entity, [`CrudError::ConcurrencyInvariantViolation`] when the entity
    /// changed concurrently.
    pub async fn update(
        &self,
        id: &IdOf<R>,
        update_model: M::UpdateModel,
        parameters: &Parameters,
    ) -> Result<M::Model, CrudError> {
        info!(type_name = %self.type_name, ?parameters, %id, ?update_model, "Updating entity");

        let updated = self
            .mutate(id, Mutation::Update(update_model), parameters)
            .await?;

        let model = self.mapper.entity_to_model(&updated);
        trace!(?model, "Updated model");
        Ok(model)
    }

    /// Soft-deletes an entity.
    ///
    /// # Errors
    ///
    /// [`CrudError::NotFound`] for missing or already deleted entities,
    /// [`CrudError::ConcurrencyInvariantViolation`] when the entity changed
    /// concurrently.
    pub async fn delete(&self, id: &IdOf<R>, parameters: &Parameters) -> Result<(), CrudError> {
        info!(type_name = %self.type_name, ?parameters, %id, "Deleting entity");

        self.mutate(id, Mutation::MarkDeleted, parameters).await?;
        Ok(())
    }

    async fn mutate(
        &self,
        id: &IdOf<R>,
        mutation: Mutation<M::UpdateModel>,
        parameters: &Parameters,
    ) -> Result<R::Entity, CrudError> {
        let mut entity = self
            .repository
            .find_by_id(id, parameters)
            .await?
            .ok_or_else(|| CrudError::not_found(&self.type_name, id))?;
        trace!(?entity, "Found entity to mutate");

        let expected_version = entity.version();
        let now = self.instant_provider.now();
        match &mutation {
            Mutation::Update(update_model) => self.mapper.update_entity_with(&mut entity, update_model),
            Mutation::MarkDeleted => entity.set_deleted_at(Some(now)),
        }
        entity.set_updated_at(now);
        trace!(?entity, expected_version, "Writing mutated entity");

        let affected = self
            .repository
            .conditional_update(&entity, parameters)
            .await
            .map_err(|err| match (&mutation, err) {
                (Mutation::Update(update_model), StoreError::Duplicate(_)) => {
                    CrudError::already_exists(&self.type_name, update_model)
                }
                (_, err) => err.into(),
            })?;

        if affected == 0 {
            error!(
                type_name = %self.type_name,
                %id,
                expected_version,
                "Conditional update matched no row right after reading the entity"
            );
            return Err(CrudError::ConcurrencyInvariantViolation {
                type_name: self.type_name.clone(),
                id: id.to_string(),
                expected_version,
            });
        }

        entity.set_version(expected_version + 1);
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Page;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: i64,
        text: String,
        version: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    }

    crate::crud_entity!(Note, id: i64);

    struct NoteMapper;

    impl CrudMapper for NoteMapper {
        type Entity = Note;
        type Model = Note;
        type CreateModel = String;
        type UpdateModel = String;

        fn entity_to_be_created_from(&self, text: &String, now: DateTime<Utc>) -> Note {
            Note {
                id: 0,
                text: text.clone(),
                version: 0,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }
        }

        fn entity_to_model(&self, entity: &Note) -> Note {
            entity.clone()
        }

        fn update_entity_with(&self, entity: &mut Note, text: &String) {
            entity.text.clone_from(text);
        }
    }

    /// Repository answering from canned data and recording writes.
    #[derive(Default)]
    struct ScriptedRepository {
        stored: Option<Note>,
        duplicate: bool,
        affected: u64,
        written: Mutex<Vec<Note>>,
    }

    #[async_trait]
    impl CrudRepository for ScriptedRepository {
        type Entity = Note;

        async fn find_page(
            &self,
            request: PageRequest,
            _parameters: &Parameters,
        ) -> Result<Page<Note>, StoreError> {
            let items: Vec<Note> = self.stored.iter().cloned().collect();
            let total_pages = request.total_pages_for(items.len() as u64);
            Ok(Page { items, total_pages })
        }

        async fn find_by_id(&self, id: &i64, _parameters: &Parameters) -> Result<Option<Note>, StoreError> {
            Ok(self.stored.clone().filter(|note| note.id == *id))
        }

        async fn insert(&self, mut entity: Note, _parameters: &Parameters) -> Result<Note, StoreError> {
            if self.duplicate {
                return Err(StoreError::Duplicate("UNIQUE constraint failed".into()));
            }
            entity.id = 1;
            self.written.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn conditional_update(&self, entity: &Note, _parameters: &Parameters) -> Result<u64, StoreError> {
            if self.duplicate {
                return Err(StoreError::Duplicate("UNIQUE constraint failed".into()));
            }
            self.written.lock().unwrap().push(entity.clone());
            Ok(self.affected)
        }
    }

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap()
    }

    fn stored_note() -> Note {
        Note {
            id: 1,
            text: "stored".to_string(),
            version: 3,
            created_at: created_at(),
            updated_at: created_at(),
            deleted_at: None,
        }
    }

    fn service(repository: ScriptedRepository) -> CrudService<ScriptedRepository, NoteMapper> {
        CrudService::new("Note", Arc::new(now), repository, NoteMapper)
    }

    #[tokio::test]
    async fn test_create_sets_bookkeeping_fields() {
        let service = service(ScriptedRepository::default());

        let created = service.create("hello".to_string(), &Parameters::default()).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.version, 0);
        assert_eq!(created.created_at, now());
        assert_eq!(created.updated_at, now());
        assert_eq!(created.deleted_at, None);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_already_exists() {
        let service = service(ScriptedRepository {
            duplicate: true,
            ..Default::default()
        });

        let err = service.create("dup".to_string(), &Parameters::default()).await.unwrap_err();

        assert_eq!(err.to_string(), r#"Note with "dup" already exists."#);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = service(ScriptedRepository::default());

        let err = service
            .update(&9, "text".to_string(), &Parameters::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Note with id 9 is not found.");
        assert!(service.repository().written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_writes_expected_version_and_bumps_it() {
        let service = service(ScriptedRepository {
            stored: Some(stored_note()),
            affected: 1,
            ..Default::default()
        });

        let updated = service
            .update(&1, "changed".to_string(), &Parameters::default())
            .await
            .unwrap();

        assert_eq!(updated.version, 4);
        assert_eq!(updated.text, "changed");
        assert_eq!(updated.updated_at, now());
        assert_eq!(updated.created_at, created_at());

        let written = service.repository().written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].version, 3);
    }

    #[tokio::test]
    async fn test_update_duplicate_is_already_exists() {
        let service = service(ScriptedRepository {
            stored: Some(stored_note()),
            duplicate: true,
            ..Default::default()
        });

        let err = service
            .update(&1, "taken".to_string(), &Parameters::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CrudError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_zero_rows_is_invariant_violation() {
        let service = service(ScriptedRepository {
            stored: Some(stored_note()),
            affected: 0,
            ..Default::default()
        });

        let err = service.delete(&1, &Parameters::default()).await.unwrap_err();

        match err {
            CrudError::ConcurrencyInvariantViolation { id, expected_version, .. } => {
                assert_eq!(id, "1");
                assert_eq!(expected_version, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_marks_updated_and_deleted_at_together() {
        let service = service(ScriptedRepository {
            stored: Some(stored_note()),
            affected: 1,
            ..Default::default()
        });

        service.delete(&1, &Parameters::default()).await.unwrap();

        let written = service.repository().written.lock().unwrap();
        assert_eq!(written[0].deleted_at, Some(now()));
        assert_eq!(written[0].updated_at, now());
        assert_eq!(written[0].text, "stored");
    }

    #[tokio::test]
    async fn test_list_wraps_page() {
        let service = service(ScriptedRepository {
            stored: Some(stored_note()),
            ..Default::default()
        });

        let paged = service
            .list(PageRequest::new(0, 20).unwrap(), &Parameters::default())
            .await
            .unwrap();

        assert_eq!(paged.data, vec![stored_note()]);
        assert_eq!((paged.page, paged.per_page, paged.total_pages), (0, 20, 1));
    }
}
