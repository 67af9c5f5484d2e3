//! Route tables keyed by controller type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::table::{Controller, RouteTable};

/// Owns one route table per controller type.
///
/// Tables are built lazily the first time a type is seen and shared by every
/// instance of that type afterwards.
#[derive(Default)]
pub struct ControllerRegistry {
    tables: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `C`, running `C::configure` on first use.
    pub fn table<C: Controller>(&mut self) -> Arc<RouteTable<C>> {
        let entry = self
            .tables
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Arc::new(build::<C>()) as Arc<dyn Any + Send + Sync>);

        Arc::clone(entry)
            .downcast::<RouteTable<C>>()
            .unwrap_or_else(|_| Arc::new(build::<C>()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn build<C: Controller>() -> RouteTable<C> {
    let mut table = RouteTable::new();
    C::configure(&mut table);
    tracing::debug!(
        controller = std::any::type_name::<C>(),
        base_path = table.metadata().base_path(),
        routes = table.metadata().routes().len(),
        "Route table built"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::ApiError;
    use crate::http::request::ApiRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CONFIGURE_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Counted {
        async fn ping(self: Arc<Self>, _req: ApiRequest) -> Result<&'static str, ApiError> {
            Ok("pong")
        }
    }

    impl Controller for Counted {
        fn configure(routes: &mut RouteTable<Self>) {
            CONFIGURE_CALLS.fetch_add(1, Ordering::SeqCst);
            routes.get("ping", "/ping", Counted::ping);
        }
    }

    #[test]
    fn test_table_built_once_per_type() {
        let mut registry = ControllerRegistry::new();
        let first = registry.table::<Counted>();
        let second = registry.table::<Counted>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CONFIGURE_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
