//! DataHub GraphQL client

use super::types::*;
use crate::{CatalogWriter, CuratedQuery, QueryRegistrar};
use async_trait::async_trait;
use curator_core::{CatalogError, EntityMetadata};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Connection settings for a DataHub GMS endpoint.
#[derive(Clone)]
pub struct DataHubConfig {
    /// Base URL, e.g. `https://datahub.example.com`
    pub base_url: String,
    /// Personal access token sent as a bearer token
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl DataHubConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for DataHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataHubConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// DataHub API client. Implements [`CatalogWriter`] and [`QueryRegistrar`].
#[derive(Clone)]
pub struct DataHubClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl DataHubClient {
    pub fn new(config: &DataHubConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Request {
                operation: "building DataHub HTTP client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/graphql", config.base_url.trim_end_matches('/')),
            token: config.token.clone(),
        })
    }

    /// GraphQL endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one GraphQL document. `operation` is the human-readable context
    /// prefixed to every error.
    async fn execute<V: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        operation: String,
        query: &str,
        variables: V,
    ) -> Result<R, CatalogError> {
        let body = GraphQlRequest { query, variables };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| CatalogError::Request {
            operation: operation.clone(),
            reason: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let reason = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "unauthorized (check CURATOR_DATAHUB_TOKEN)".to_string()
                }
                _ => format!("HTTP {status}: {text}"),
            };
            return Err(CatalogError::Request { operation, reason });
        }

        let envelope: GraphQlResponse<R> =
            response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse {
                    operation: operation.clone(),
                    reason: e.to_string(),
                })?;

        if !envelope.errors.is_empty() {
            let reason = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::Request { operation, reason });
        }

        envelope.data.ok_or(CatalogError::InvalidResponse {
            operation,
            reason: "response carried no data".to_string(),
        })
    }

    /// Run a mutation whose result is a single boolean field.
    async fn mutate<I: Serialize + Send + Sync>(
        &self,
        operation: String,
        mutation: &str,
        input: I,
    ) -> Result<(), CatalogError> {
        let data: BTreeMap<String, Option<bool>> = self
            .execute(operation.clone(), mutation, InputVariables { input })
            .await?;
        if data.values().any(|accepted| *accepted != Some(true)) {
            return Err(CatalogError::Request {
                operation,
                reason: "DataHub did not accept the change".to_string(),
            });
        }
        tracing::debug!(operation = %operation, "DataHub mutation applied");
        Ok(())
    }
}

impl std::fmt::Debug for DataHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataHubClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Editable description wins over the ingested one when it is set.
fn metadata_from_entity(entity: Entity) -> EntityMetadata {
    let editable = entity
        .editable_properties
        .and_then(|p| p.description)
        .filter(|d| !d.is_empty());
    let base = entity.properties.and_then(|p| p.description);

    EntityMetadata {
        description: editable.or(base).unwrap_or_default(),
        tags: entity
            .tags
            .map(|t| t.tags.into_iter().map(|a| a.tag.urn).collect())
            .unwrap_or_default(),
        glossary_terms: entity
            .glossary_terms
            .map(|t| t.terms.into_iter().map(|a| a.term.urn).collect())
            .unwrap_or_default(),
        owners: entity
            .ownership
            .map(|o| o.owners.into_iter().map(|a| a.owner.urn).collect())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl CatalogWriter for DataHubClient {
    async fn get_current_metadata(&self, entity_urn: &str) -> Result<EntityMetadata, CatalogError> {
        let operation = format!("getting entity {entity_urn}");
        let data: EntityData = self
            .execute(
                operation.clone(),
                ENTITY_METADATA_QUERY,
                UrnVariables { urn: entity_urn },
            )
            .await?;
        let entity = data.entity.ok_or_else(|| CatalogError::Request {
            operation,
            reason: "entity not found".to_string(),
        })?;
        Ok(metadata_from_entity(entity))
    }

    async fn update_description(
        &self,
        entity_urn: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.mutate(
            format!("updating description for {entity_urn}"),
            UPDATE_DESCRIPTION_MUTATION,
            DescriptionUpdateInput {
                description,
                resource_urn: entity_urn,
                sub_resource_type: None,
                sub_resource: None,
            },
        )
        .await
    }

    async fn update_column_description(
        &self,
        entity_urn: &str,
        column: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.mutate(
            format!("updating column description for {entity_urn}.{column}"),
            UPDATE_DESCRIPTION_MUTATION,
            DescriptionUpdateInput {
                description,
                resource_urn: entity_urn,
                sub_resource_type: Some(DATASET_FIELD),
                sub_resource: Some(column),
            },
        )
        .await
    }

    async fn add_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        self.mutate(
            format!("adding tag {tag_urn} to {entity_urn}"),
            ADD_TAG_MUTATION,
            TagAssociationInput {
                tag_urn,
                resource_urn: entity_urn,
            },
        )
        .await
    }

    async fn remove_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        self.mutate(
            format!("removing tag {tag_urn} from {entity_urn}"),
            REMOVE_TAG_MUTATION,
            TagAssociationInput {
                tag_urn,
                resource_urn: entity_urn,
            },
        )
        .await
    }

    async fn add_glossary_term(
        &self,
        entity_urn: &str,
        term_urn: &str,
    ) -> Result<(), CatalogError> {
        self.mutate(
            format!("adding glossary term {term_urn} to {entity_urn}"),
            ADD_TERM_MUTATION,
            TermAssociationInput {
                term_urn,
                resource_urn: entity_urn,
            },
        )
        .await
    }

    async fn add_documentation_link(
        &self,
        entity_urn: &str,
        url: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.mutate(
            format!("adding link to {entity_urn}"),
            ADD_LINK_MUTATION,
            AddLinkInput {
                link_url: url,
                label: description,
                resource_urn: entity_urn,
            },
        )
        .await
    }
}

#[async_trait]
impl QueryRegistrar for DataHubClient {
    async fn register_query(
        &self,
        entity_urn: &str,
        query: &CuratedQuery,
    ) -> Result<String, CatalogError> {
        let operation = format!("creating query {} for {entity_urn}", query.name);
        let input = CreateQueryInput {
            properties: QueryProperties {
                name: &query.name,
                description: query.description.as_deref(),
                statement: QueryStatement {
                    value: &query.sql,
                    language: "SQL",
                },
            },
            subjects: vec![QuerySubject {
                dataset_urn: entity_urn,
            }],
        };
        let data: CreateQueryData = self
            .execute(
                operation.clone(),
                CREATE_QUERY_MUTATION,
                InputVariables { input },
            )
            .await?;
        data.create_query
            .map(|created| created.urn)
            .ok_or(CatalogError::InvalidResponse {
                operation,
                reason: "createQuery returned no urn".to_string(),
            })
    }
}
