//! The OpenAPI 3.1 document model the assembler produces.
//!
//! This is a minimal serialize-only subset: document, info, path items,
//! operations, parameters, request bodies, responses, and components. All
//! maps are `BTreeMap` so the rendered output is deterministic regardless
//! of assembly order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::SchemaObject;

/// HTTP method of a documented operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// The lowercase path-item key for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

/// Root OpenAPI document.
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version marker.
    pub openapi: String,
    /// Document metadata.
    pub info: Info,
    /// Documented paths.
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable components, present once any schema is registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    /// An empty 3.1 document with the given metadata.
    pub fn new(info: Info) -> Self {
        Self {
            openapi: "3.1.0".to_string(),
            info,
            paths: BTreeMap::new(),
            components: None,
        }
    }
}

/// Document metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version string.
    pub version: String,
    /// Optional API description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    /// Metadata with just a title and version.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }
}

/// A path item holding one operation per HTTP method.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathItem {
    /// Path summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Path description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// GET operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// PATCH operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// DELETE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Mutable access to the operation slot for a method.
    pub fn operation_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
        }
    }
}

/// A single documented operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Operation {
    /// Grouping tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation description, from the entry point's doc comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Query, header, and path parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    /// Request body, when the entry point declares a request type.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyObject>,
    /// Responses keyed by status code or `"default"`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, ResponseObject>,
}

/// One operation parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterObject {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Parameter schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaObject>,
    /// Whether the parameter is required.
    pub required: bool,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Query string parameter.
    Query,
    /// Header parameter.
    Header,
    /// Path parameter.
    Path,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestBodyObject {
    /// Request body description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content keyed by media type; empty when the request has no body.
    pub content: BTreeMap<String, MediaTypeObject>,
}

/// Media-type content wrapper.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaTypeObject {
    /// The content schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaObject>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseObject {
    /// Response description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response content keyed by media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaTypeObject>>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Components {
    /// Named schemas available for `$ref` reuse.
    pub schemas: BTreeMap<String, SchemaObject>,
}
