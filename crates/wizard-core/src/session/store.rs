use std::collections::HashMap;

use serde_json::Value;

/// Sesión del host: valores JSON con clave string. Se asume a lo sumo un
/// request en curso por sesión; el host serializa el acceso.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    /// Elimina la clave y devuelve el valor previo, si existía.
    fn remove(&mut self, key: &str) -> Option<Value>;
}

impl<T: SessionStore + ?Sized> SessionStore for &mut T {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value)
    }
    fn remove(&mut self, key: &str) -> Option<Value> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    pub inner: HashMap<String, Value>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).cloned()
    }
    fn set(&mut self, key: &str, value: Value) {
        self.inner.insert(key.to_string(), value);
    }
    fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(key)
    }
}
