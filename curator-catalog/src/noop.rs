//! Catalog writer for deployments without a catalog.

use crate::CatalogWriter;
use async_trait::async_trait;
use curator_core::{CatalogError, EntityMetadata};

/// Returns empty metadata and accepts every write without doing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCatalogWriter;

#[async_trait]
impl CatalogWriter for NoopCatalogWriter {
    async fn get_current_metadata(&self, _entity_urn: &str) -> Result<EntityMetadata, CatalogError> {
        Ok(EntityMetadata::default())
    }

    async fn update_description(
        &self,
        entity_urn: &str,
        _description: &str,
    ) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, "No catalog configured; dropping description update");
        Ok(())
    }

    async fn update_column_description(
        &self,
        entity_urn: &str,
        column: &str,
        _description: &str,
    ) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, column, "No catalog configured; dropping column description");
        Ok(())
    }

    async fn add_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, tag_urn, "No catalog configured; dropping tag");
        Ok(())
    }

    async fn remove_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, tag_urn, "No catalog configured; dropping tag removal");
        Ok(())
    }

    async fn add_glossary_term(
        &self,
        entity_urn: &str,
        term_urn: &str,
    ) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, term_urn, "No catalog configured; dropping glossary term");
        Ok(())
    }

    async fn add_documentation_link(
        &self,
        entity_urn: &str,
        url: &str,
        _description: &str,
    ) -> Result<(), CatalogError> {
        tracing::debug!(entity_urn, url, "No catalog configured; dropping link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_reads_empty_and_accepts_writes() {
        let writer = NoopCatalogWriter;
        let meta = writer.get_current_metadata("urn:li:dataset:x").await.unwrap();
        assert_eq!(meta, EntityMetadata::default());
        writer.add_tag("urn:li:dataset:x", "urn:li:tag:pii").await.unwrap();
        writer
            .update_column_description("urn:li:dataset:x", "amount", "cents")
            .await
            .unwrap();
    }
}
