//! DataHub GraphQL request and response types

use serde::{Deserialize, Serialize};

// ============================================================================
// ENVELOPE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

// ============================================================================
// DOCUMENTS
// ============================================================================

pub const ENTITY_METADATA_QUERY: &str = r#"
query getEntityMetadata($urn: String!) {
  entity(urn: $urn) {
    urn
    ... on Dataset {
      properties { description }
      editableProperties { description }
      tags { tags { tag { urn } } }
      glossaryTerms { terms { term { urn } } }
      ownership { owners { owner { ... on CorpUser { urn } ... on CorpGroup { urn } } } }
    }
  }
}"#;

pub const UPDATE_DESCRIPTION_MUTATION: &str = r#"
mutation updateDescription($input: DescriptionUpdateInput!) {
  updateDescription(input: $input)
}"#;

pub const ADD_TAG_MUTATION: &str = r#"
mutation addTag($input: TagAssociationInput!) {
  addTag(input: $input)
}"#;

pub const REMOVE_TAG_MUTATION: &str = r#"
mutation removeTag($input: TagAssociationInput!) {
  removeTag(input: $input)
}"#;

pub const ADD_TERM_MUTATION: &str = r#"
mutation addTerm($input: TermAssociationInput!) {
  addTerm(input: $input)
}"#;

pub const ADD_LINK_MUTATION: &str = r#"
mutation addLink($input: AddLinkInput!) {
  addLink(input: $input)
}"#;

pub const CREATE_QUERY_MUTATION: &str = r#"
mutation createQuery($input: CreateQueryInput!) {
  createQuery(input: $input) { urn }
}"#;

// ============================================================================
// READ TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UrnVariables<'a> {
    pub urn: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityData {
    pub entity: Option<Entity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub urn: String,
    pub properties: Option<DescriptionHolder>,
    pub editable_properties: Option<DescriptionHolder>,
    pub tags: Option<TagList>,
    pub glossary_terms: Option<TermList>,
    pub ownership: Option<Ownership>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionHolder {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    #[serde(default)]
    pub tags: Vec<TagAssociation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagAssociation {
    pub tag: UrnHolder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermList {
    #[serde(default)]
    pub terms: Vec<TermAssociation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermAssociation {
    pub term: UrnHolder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ownership {
    #[serde(default)]
    pub owners: Vec<Owner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub owner: UrnHolder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrnHolder {
    pub urn: String,
}

// ============================================================================
// WRITE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InputVariables<T> {
    pub input: T,
}

/// Sub-resource type for column-level descriptions.
pub const DATASET_FIELD: &str = "DATASET_FIELD";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionUpdateInput<'a> {
    pub description: &'a str,
    pub resource_urn: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_resource_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAssociationInput<'a> {
    pub tag_urn: &'a str,
    pub resource_urn: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermAssociationInput<'a> {
    pub term_urn: &'a str,
    pub resource_urn: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLinkInput<'a> {
    pub link_url: &'a str,
    pub label: &'a str,
    pub resource_urn: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateQueryInput<'a> {
    pub properties: QueryProperties<'a>,
    pub subjects: Vec<QuerySubject<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryProperties<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub statement: QueryStatement<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryStatement<'a> {
    pub value: &'a str,
    pub language: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySubject<'a> {
    pub dataset_urn: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryData {
    pub create_query: Option<UrnHolder>,
}
