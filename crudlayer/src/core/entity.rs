use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier types usable as entity ids.
///
/// Blanket-implemented, so `Uuid`, `i64`, `String` and friends all qualify.
pub trait EntityId: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static {}

impl<T> EntityId for T where T: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static {}

/// A persisted, versioned, soft-deletable record.
///
/// `version` and `updated_at` only ever change together, and a deleted entity
/// always has `updated_at == deleted_at`. Both rules are enforced by
/// [`CrudService`](crate::CrudService); implementors only expose the fields.
///
/// Most implementations are generated with [`crud_entity!`](crate::crud_entity).
pub trait CrudEntity: Clone + Debug + Send + Sync + 'static {
    type Id: EntityId;

    /// `None` until the store assigns one, unless the mapper pre-assigns it.
    fn id(&self) -> Option<&Self::Id>;
    fn set_id(&mut self, id: Self::Id);

    fn version(&self) -> i32;
    fn set_version(&mut self, version: i32);

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, updated_at: DateTime<Utc>);

    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>);

    #[must_use]
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Implements [`CrudEntity`] for a struct carrying the standard fields
/// `id`, `version`, `created_at`, `updated_at` and `deleted_at`.
///
/// Use `optional_id` when the id field is an `Option` (store-assigned ids).
///
/// ```rust,ignore
/// crudlayer::crud_entity!(Model, id: Uuid);
/// crudlayer::crud_entity!(DraftEntity, optional_id: i64);
/// ```
#[macro_export]
macro_rules! crud_entity {
    (@accessors) => {
        fn version(&self) -> i32 {
            self.version
        }

        fn set_version(&mut self, version: i32) {
            self.version = version;
        }

        fn created_at(&self) -> $crate::chrono::DateTime<$crate::chrono::Utc> {
            self.created_at
        }

        fn updated_at(&self) -> $crate::chrono::DateTime<$crate::chrono::Utc> {
            self.updated_at
        }

        fn set_updated_at(&mut self, updated_at: $crate::chrono::DateTime<$crate::chrono::Utc>) {
            self.updated_at = updated_at;
        }

        fn deleted_at(&self) -> Option<$crate::chrono::DateTime<$crate::chrono::Utc>> {
            self.deleted_at
        }

        fn set_deleted_at(
            &mut self,
            deleted_at: Option<$crate::chrono::DateTime<$crate::chrono::Utc>>,
        ) {
            self.deleted_at = deleted_at;
        }
    };

    ($entity:ty, id: $id:ty) => {
        impl $crate::CrudEntity for $entity {
            type Id = $id;

            fn id(&self) -> Option<&Self::Id> {
                Some(&self.id)
            }

            fn set_id(&mut self, id: Self::Id) {
                self.id = id;
            }

            $crate::crud_entity!(@accessors);
        }
    };

    ($entity:ty, optional_id: $id:ty) => {
        impl $crate::CrudEntity for $entity {
            type Id = $id;

            fn id(&self) -> Option<&Self::Id> {
                self.id.as_ref()
            }

            fn set_id(&mut self, id: Self::Id) {
                self.id = Some(id);
            }

            $crate::crud_entity!(@accessors);
        }
    };
}
