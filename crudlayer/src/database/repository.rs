use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, Iterable, PaginatorTrait, QueryFilter, QueryOrder, Value,
};
use std::marker::PhantomData;
use tracing::debug;

use crate::core::{CrudEntity, CrudRepository, StoreError};
use crate::pagination::{Page, PageRequest};
use crate::parameters::Parameters;

type ColumnOf<E> = <<E as SeaOrmEntity>::Table as EntityTrait>::Column;
type ModelOf<E> = <<E as SeaOrmEntity>::Table as EntityTrait>::Model;

/// Ties a [`CrudEntity`] to its sea-orm table.
///
/// When the sea-orm `Model` itself is the entity, the conversions are the
/// identity and `Model::into_active_model`:
///
/// ```rust,ignore
/// impl SeaOrmEntity for foo::Model {
///     type Table = foo::Entity;
///     type ActiveModel = foo::ActiveModel;
///
///     const ID_COLUMN: foo::Column = foo::Column::Id;
///     const VERSION_COLUMN: foo::Column = foo::Column::Version;
///     const CREATED_AT_COLUMN: foo::Column = foo::Column::CreatedAt;
///     const DELETED_AT_COLUMN: foo::Column = foo::Column::DeletedAt;
///
///     fn from_model(model: foo::Model) -> Self {
///         model
///     }
///
///     fn to_active_model(&self) -> foo::ActiveModel {
///         self.clone().into_active_model()
///     }
/// }
/// ```
pub trait SeaOrmEntity: CrudEntity {
    type Table: EntityTrait;
    type ActiveModel: ActiveModelTrait<Entity = Self::Table> + ActiveModelBehavior + Send + Sync + 'static;

    const ID_COLUMN: ColumnOf<Self>;
    const VERSION_COLUMN: ColumnOf<Self>;
    const CREATED_AT_COLUMN: ColumnOf<Self>;
    const DELETED_AT_COLUMN: ColumnOf<Self>;

    fn from_model(model: ModelOf<Self>) -> Self;

    /// Store-assigned ids must be left `NotSet`.
    fn to_active_model(&self) -> Self::ActiveModel;
}

/// [`CrudRepository`] over a sea-orm [`DatabaseConnection`].
///
/// Live rows are those with `deleted_at IS NULL`. Pages are ordered by
/// creation time, then id.
pub struct SeaOrmRepository<E> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SeaOrmRepository<E> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<E> Clone for SeaOrmRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

/// Marks every column of `active_model` as set, so an `UPDATE` writes them all.
fn set_all_columns<E: SeaOrmEntity>(active_model: &mut E::ActiveModel) {
    for column in <ColumnOf<E> as Iterable>::iter() {
        if let Some(value) = active_model.get(column).into_value() {
            active_model.set(column, value);
        }
    }
}

#[async_trait]
impl<E> CrudRepository for SeaOrmRepository<E>
where
    E: SeaOrmEntity,
    E::Id: Into<Value>,
    ModelOf<E>: IntoActiveModel<E::ActiveModel> + Sync + 'static,
{
    type Entity = E;

    async fn find_page(
        &self,
        request: PageRequest,
        _parameters: &Parameters,
    ) -> Result<Page<E>, StoreError> {
        let paginator = E::Table::find()
            .filter(E::DELETED_AT_COLUMN.is_null())
            .order_by_asc(E::CREATED_AT_COLUMN)
            .order_by_asc(E::ID_COLUMN)
            .paginate(&self.db, request.per_page());

        let total_pages = paginator.num_pages().await?;
        let models = paginator.fetch_page(request.page()).await?;
        debug!(page = request.page(), total_pages, rows = models.len(), "Fetched page");

        Ok(Page {
            items: models.into_iter().map(E::from_model).collect(),
            total_pages,
        })
    }

    async fn find_by_id(
        &self,
        id: &E::Id,
        _parameters: &Parameters,
    ) -> Result<Option<E>, StoreError> {
        let model = E::Table::find()
            .filter(E::ID_COLUMN.eq(id.clone()))
            .filter(E::DELETED_AT_COLUMN.is_null())
            .one(&self.db)
            .await?;
        Ok(model.map(E::from_model))
    }

    async fn insert(&self, entity: E, _parameters: &Parameters) -> Result<E, StoreError> {
        let model = entity.to_active_model().insert(&self.db).await?;
        Ok(E::from_model(model))
    }

    async fn conditional_update(
        &self,
        entity: &E,
        _parameters: &Parameters,
    ) -> Result<u64, StoreError> {
        let id = entity
            .id()
            .cloned()
            .ok_or_else(|| StoreError::Other("Cannot update an entity without id".to_string()))?;
        let expected_version = entity.version();

        let mut active_model = entity.to_active_model();
        set_all_columns::<E>(&mut active_model);
        active_model.not_set(E::ID_COLUMN);
        active_model.set(E::VERSION_COLUMN, (expected_version + 1).into());

        let result = E::Table::update_many()
            .set(active_model)
            .filter(E::ID_COLUMN.eq(id))
            .filter(E::VERSION_COLUMN.eq(expected_version))
            .filter(E::DELETED_AT_COLUMN.is_null())
            .exec(&self.db)
            .await?;
        debug!(expected_version, rows_affected = result.rows_affected, "Conditional update");

        Ok(result.rows_affected)
    }
}
