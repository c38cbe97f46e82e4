//! Keyset persistence over a [`StorageBackend`].
//!
//! Keysets are stored as JSON documents keyed by delivery service `xml_id`.
//! On the cluster they live in the [`URI_SIGNING_BUCKET`] bucket. Nothing
//! unvalidated crosses this layer in either direction: reads are validated
//! before they are returned and writes are validated before they are sent.

use edgeauth_storage::StorageBackend;

use crate::{
    error::KeysetError,
    keyset::Keyset,
    validation::{parse_and_validate, validate_keyset},
};

/// Cluster bucket holding URI-signing keysets.
pub const URI_SIGNING_BUCKET: &str = "cdn_uri_sig_keys";

/// Validated keyset access for one storage backend.
#[derive(Debug, Clone)]
pub struct KeysetStore<B> {
    backend: B,
}

impl<B: StorageBackend> KeysetStore<B> {
    /// Creates a store over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the keyset of a delivery service.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::Storage`] if the backend fails.
    /// - [`KeysetError::Parse`] or [`KeysetError::Validation`] if the stored document is not a
    ///   trustworthy keyset.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, xml_id: &str) -> Result<Option<Keyset>, KeysetError> {
        let Some(bytes) = self.backend.get(xml_id).await? else {
            return Ok(None);
        };

        let keyset = parse_and_validate(&bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "stored keyset rejected");
        })?;
        tracing::debug!(authorities = keyset.len(), "loaded keyset");
        Ok(Some(keyset))
    }

    /// Stores the keyset of a delivery service, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::Validation`] if `keyset` breaks the rotation rules; nothing is written.
    /// - [`KeysetError::Storage`] if the backend fails.
    #[tracing::instrument(skip(self, keyset), fields(authorities = keyset.len()))]
    pub async fn save(&self, xml_id: &str, keyset: &Keyset) -> Result<(), KeysetError> {
        validate_keyset(keyset)?;
        self.backend.set_json(xml_id.to_owned(), keyset).await?;
        tracing::debug!("saved keyset");
        Ok(())
    }

    /// Removes the keyset of a delivery service.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::NotFound`] if nothing is stored.
    /// - [`KeysetError::Storage`] if the backend fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, xml_id: &str) -> Result<(), KeysetError> {
        if self.backend.get(xml_id).await?.is_none() {
            return Err(KeysetError::NotFound { xml_id: xml_id.to_owned() });
        }
        self.backend.delete(xml_id).await?;
        tracing::debug!("deleted keyset");
        Ok(())
    }
}
