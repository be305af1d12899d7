//! Value codec.
//!
//! Values are stored as JSON.

use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

use crate::DatabaseError;

/// Trait that will transform the data to be saved in the DB.
pub trait Encode: Send + Sync + Debug {
    /// Encodes data going into the database.
    fn encode(&self) -> Result<Vec<u8>, DatabaseError>;
}

/// Trait that will transform the data to be read from the DB.
pub trait Decode: Send + Sync + Sized + Debug {
    /// Decodes data coming from the database.
    fn decode(value: &[u8]) -> Result<Self, DatabaseError>;
}

impl<T> Encode for T
where
    T: Serialize + Send + Sync + Debug + ?Sized,
{
    fn encode(&self) -> Result<Vec<u8>, DatabaseError> {
        serde_json::to_vec(self).map_err(|e| DatabaseError::Encode(e.to_string()))
    }
}

impl<T> Decode for T
where
    T: DeserializeOwned + Send + Sync + Debug,
{
    fn decode(value: &[u8]) -> Result<Self, DatabaseError> {
        serde_json::from_slice(value).map_err(|e| DatabaseError::Decode(e.to_string()))
    }
}
