//! Test harness for crudlayer services.
//!
//! Implement [`CrudTestData`] for an entity type, then let
//! [`crud_service_tests!`] generate the whole service test suite against an
//! [`InMemoryRepository`]:
//!
//! ```rust,ignore
//! crudlayer_test::crud_service_tests!(foo_service, ServiceFixture::new(FooTestData::default(), FooMapper));
//! ```
//!
//! The generated tests are `#[tokio::test]`s, so the calling crate needs
//! `tokio` with the `macros` and `rt` features.

pub mod data;
pub mod fixture;
pub mod id;
pub mod instant;
pub mod repository;
pub mod suite;

pub use data::CrudTestData;
pub use fixture::ServiceFixture;
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use instant::AdjustableInstantProvider;
pub use repository::InMemoryRepository;

/// Generates a module `$name` with one `#[tokio::test]` per case in
/// [`suite`], each running on a fresh fixture built by `$fixture`.
#[macro_export]
macro_rules! crud_service_tests {
    (@cases $fixture:expr; $($case:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $case() {
                let fixture = $fixture;
                $crate::suite::$case(&fixture).await;
            }
        )*
    };
    ($name:ident, $fixture:expr) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            $crate::crud_service_tests!(@cases $fixture;
                create_already_exists,
                create,
                create_again_after_delete,
                list_with_default_pagination,
                list_with_pagination,
                list_with_no_entities,
                list_with_no_deleted_entities,
                get_not_found,
                get,
                get_deleted_not_found,
                update_not_found,
                update_deleted_not_found,
                update_already_exists,
                update,
                update_with_data_of_deleted_entity,
                update_twice_with_same_data,
                delete_not_found,
                delete,
                delete_deleted_not_found,
            );
        }
    };
}
