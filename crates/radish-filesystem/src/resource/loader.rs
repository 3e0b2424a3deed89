//! Typed resource loaders

use crate::resource::error::{ResourceError, ResourceResult};
use crate::resource::provider::{ReadSeek, ResourceStream};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::io::Read;

/// State handed to a loader for one resource
pub struct ResourceLoadContext<'a> {
    path: &'a str,
    stream: ResourceStream,
}

impl<'a> ResourceLoadContext<'a> {
    /// Context over an opened stream
    pub fn new(path: &'a str, stream: ResourceStream) -> Self {
        Self { path, stream }
    }

    /// Logical path being loaded
    pub fn path(&self) -> &str {
        self.path
    }

    /// Resource bytes
    pub fn stream(&mut self) -> &mut dyn ReadSeek {
        &mut *self.stream
    }

    /// Read the whole resource into memory
    pub fn read_to_end(&mut self) -> ResourceResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Build a load error for this resource
    pub fn error(&self, reason: impl Into<String>) -> ResourceError {
        ResourceError::Load {
            path: self.path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Turns resource bytes into a `T`
pub trait ResourceLoader<T>: 'static {
    /// Load a resource from the given context
    fn load(&self, ctx: &mut ResourceLoadContext<'_>) -> ResourceResult<T>;
}

impl<T, F> ResourceLoader<T> for F
where
    F: Fn(&mut ResourceLoadContext<'_>) -> ResourceResult<T> + 'static,
{
    fn load(&self, ctx: &mut ResourceLoadContext<'_>) -> ResourceResult<T> {
        self(ctx)
    }
}

/// Loaders keyed by the resource type they produce
///
/// Owned by whoever needs it, typically a
/// [`ResourceManager`](crate::resource::ResourceManager).
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<TypeId, Box<dyn Any>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the loader for resources of type `T`
    ///
    /// Each type has at most one loader.
    pub fn register<T, L>(&mut self, loader: L) -> ResourceResult<()>
    where
        T: 'static,
        L: ResourceLoader<T>,
    {
        let id = TypeId::of::<T>();
        if self.loaders.contains_key(&id) {
            return Err(ResourceError::LoaderExists(type_name::<T>()));
        }
        let boxed: Box<dyn ResourceLoader<T>> = Box::new(loader);
        self.loaders.insert(id, Box::new(boxed));
        Ok(())
    }

    /// Loader for resources of type `T`
    pub fn get<T: 'static>(&self) -> Option<&dyn ResourceLoader<T>> {
        self.loaders
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Box<dyn ResourceLoader<T>>>()
            .map(|loader| &**loader)
    }

    /// Check whether a loader for `T` is registered
    pub fn contains<T: 'static>(&self) -> bool {
        self.loaders.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered loaders
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Check if no loaders are registered
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("loaders", &self.loaders.len())
            .finish()
    }
}
