mod loader;
mod naming;
mod registry;
mod store;

pub use {
    loader::{ClipLoad, ClipLoader, LoadSummary, MaterializedClip},
    naming::ClipNamer,
    registry::{ClipRegistry, RegistryEntry},
    store::ClipStore,
};

#[cfg(test)]
pub(crate) use registry::{RegistrySink, append_line};
