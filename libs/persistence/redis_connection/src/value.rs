use std::ops::Deref;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::CacheError;

/// JSON wrapper shared by every backend so a value written by one backend
/// reads back identically from the other.
#[derive(Clone, Debug, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn inner(self) -> T { self.0 }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<T> Json<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(&self.0)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes)
            .map(Json)
            .map_err(|e| CacheError::Deserialization(e.to_string()))
    }

    pub fn to_text(&self) -> Result<String, CacheError> {
        serde_json::to_string(&self.0)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub fn from_text(text: &str) -> Result<Self, CacheError> {
        serde_json::from_str(text)
            .map(Json)
            .map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}
