//! Process-wide cache of service definitions.
//!
//! Each service type builds its [`Callbacks`] once, on first use, through
//! [`Service::define_callbacks`]. The result is leaked into a `'static`
//! reference and shared by every later invocation of that type.

use core::any::{Any, TypeId, type_name};
use std::sync::LazyLock;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::api::Callbacks;
use crate::service::Service;

type Definitions = HashMap<TypeId, &'static (dyn Any + Send + Sync)>;

static DEFINITIONS: LazyLock<RwLock<Definitions>> = LazyLock::new(Default::default);

/// Returns the callbacks of service `S`, building them on first use.
///
/// # Panics
///
/// Panics if [`Service::define_callbacks`] reports a registration error. A
/// broken definition is a programming error and surfaces on the first run.
#[must_use]
pub fn definition<S: Service>() -> &'static Callbacks<S> {
    let id = TypeId::of::<S>();

    if let Some(found) = DEFINITIONS.read().get(&id).copied() {
        return downcast(found);
    }

    // Built outside the lock: a definition may run other services.
    let mut callbacks = Callbacks::new();
    if let Err(err) = S::define_callbacks(&mut callbacks) {
        tracing::error!(service = type_name::<S>(), "invalid service definition: {err}");
        panic!("invalid definition of service `{}`: {err}", type_name::<S>());
    }

    let mut definitions = DEFINITIONS.write();
    let found = *definitions.entry(id).or_insert_with(|| {
        tracing::debug!(
            service = type_name::<S>(),
            call = callbacks.hook_count(super::Chain::Call),
            success = callbacks.hook_count(super::Chain::Success),
            error = callbacks.hook_count(super::Chain::Error),
            "service defined"
        );
        let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(callbacks));
        leaked
    });
    downcast(found)
}

fn downcast<S: Service>(found: &'static (dyn Any + Send + Sync)) -> &'static Callbacks<S> {
    found
        .downcast_ref()
        .expect("definitions are keyed by the TypeId of their service")
}
