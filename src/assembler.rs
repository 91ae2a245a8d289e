//! Endpoint assembly: wiring entry points into the OpenAPI document.
//!
//! For each documented entry point the assembler resolves the declared
//! request type variants, splits each variant's properties into the
//! canonical locations (`body`, `headers`, `pathParameters`,
//! `queryStringParameters`), registers the derived per-location components,
//! and emits the path item: parameters, request body, and per-status
//! responses. It also tracks which component names each endpoint actually
//! references, so the finished document contains no dead schemas.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::document::{
    Components, Info, MediaTypeObject, OpenApiDocument, Operation, ParamLocation, ParameterObject,
    RequestBodyObject, ResponseObject,
};
use crate::error::DocError;
use crate::metadata::{EntryPoint, GlobalMetadata, PathConfig, RequestAnnotation};
use crate::node::{Node, ObjectNode};
use crate::registry::ComponentRegistry;
use crate::schema::{to_schema, SchemaObject};

/// Type names that never produce `$ref` components.
const PRIMITIVE_TYPE_NAMES: [&str; 5] = ["undefined", "void", "string", "number", "boolean"];

/// Media type used when an entry point declares none.
const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// What one `add_path` call referenced.
#[derive(Debug, Clone)]
pub struct PathOutcome {
    /// De-duplicated component names the endpoint references, in first-use
    /// order: derived body components first, then response types.
    pub type_names_used: Vec<String>,
}

/// A derived per-location component extracted from a request variant.
#[derive(Debug, Clone)]
struct DerivedComponent {
    name: String,
    node: Node,
}

/// Request-variant properties partitioned by canonical location.
#[derive(Debug, Default)]
struct LocationSplit {
    body: Vec<DerivedComponent>,
    headers: Vec<DerivedComponent>,
    path: Vec<DerivedComponent>,
    query: Vec<DerivedComponent>,
}

/// Assembles one OpenAPI document over one documentation run.
///
/// Owns the document under construction, the component registry, and the
/// accumulated set of referenced component names. Call [`add_path`] once
/// per documented endpoint, then [`finish`] to obtain the pruned document.
///
/// [`add_path`]: DocumentBuilder::add_path
/// [`finish`]: DocumentBuilder::finish
#[derive(Debug)]
pub struct DocumentBuilder {
    document: OpenApiDocument,
    registry: ComponentRegistry,
    used_names: BTreeSet<String>,
}

impl DocumentBuilder {
    /// Start a document with the given metadata.
    pub fn new(info: Info) -> Self {
        Self {
            document: OpenApiDocument::new(info),
            registry: ComponentRegistry::new(),
            used_names: BTreeSet::new(),
        }
    }

    /// The registry of components derived so far.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Document one endpoint.
    ///
    /// Resolves the entry point's request/response annotations against the
    /// collected metadata, registers derived per-location components, and
    /// adds the operation to the path item for `config.method`.
    ///
    /// An entry-point name missing from the metadata is a hard error; a
    /// request variant that resolves to no declaration is skipped with a
    /// warning (the endpoint still documents); a variant resolving to a
    /// non-object type is a hard error.
    pub fn add_path(
        &mut self,
        entry_point: &str,
        config: &PathConfig,
        metadata: &GlobalMetadata,
    ) -> Result<PathOutcome, DocError> {
        let entry = metadata
            .entry_point(entry_point)
            .ok_or_else(|| DocError::UnknownEntryPoint {
                entry_point: entry_point.to_string(),
            })?;

        let mut tags = vec![config.tag_name.clone()];
        if let Some(tag) = &entry.tag {
            tags.push(tag.clone());
        }

        let media_type = entry
            .media_type
            .clone()
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        let split = self.split_request_by_location(entry_point, entry, metadata)?;

        let mut parameters = Vec::new();
        parameters.extend(expand_parameters(&split.query, ParamLocation::Query));
        parameters.extend(expand_parameters(&split.headers, ParamLocation::Header));
        parameters.extend(expand_parameters(&split.path, ParamLocation::Path));

        let (request_body, mut type_names_used) =
            build_request_body(entry.request.as_ref(), &split.body, &media_type);

        let (responses, response_names) = build_responses(entry, &media_type);
        type_names_used.extend(response_names);

        let type_names_used = dedupe_names(type_names_used);
        self.used_names.extend(type_names_used.iter().cloned());

        let operation = Operation {
            tags,
            description: entry.comment.clone(),
            parameters,
            request_body,
            responses,
        };

        let item = self.document.paths.entry(config.path.clone()).or_default();
        item.summary.clone_from(&config.summary);
        item.description.clone_from(&config.description);
        let slot = item.operation_mut(config.method);
        if slot.is_some() {
            warn!(
                path = %config.path,
                method = config.method.as_str(),
                "Operation already documented for this path and method; overwriting."
            );
        }
        *slot = Some(operation);

        Ok(PathOutcome { type_names_used })
    }

    /// Finish the run: attach the referenced components and return the
    /// document.
    ///
    /// Derived per-location components are always emitted; declarations are
    /// emitted only when some endpoint referenced them (first matching
    /// declaration wins). Everything else is pruned.
    pub fn finish(self, metadata: &GlobalMetadata) -> OpenApiDocument {
        let mut schemas = BTreeMap::new();
        for (name, node) in self.registry.iter() {
            schemas.insert(name.clone(), to_schema(node));
        }

        for name in &self.used_names {
            if schemas.contains_key(name) {
                continue;
            }
            match metadata.resolve_all(name).first() {
                Some(declaration) => {
                    schemas.insert(name.clone(), to_schema(&declaration.node));
                }
                None => warn!(
                    component = %name,
                    "Referenced component has no matching declaration; nothing emitted for it."
                ),
            }
        }

        let mut document = self.document;
        if !schemas.is_empty() {
            document.components = Some(Components { schemas });
        }
        document
    }

    /// Resolve each request variant and partition its properties by
    /// canonical location, registering the derived components.
    fn split_request_by_location(
        &mut self,
        entry_point: &str,
        entry: &EntryPoint,
        metadata: &GlobalMetadata,
    ) -> Result<LocationSplit, DocError> {
        let mut split = LocationSplit::default();
        let Some(request) = &entry.request else {
            return Ok(split);
        };

        for variant in request.types.variants() {
            if PRIMITIVE_TYPE_NAMES.contains(&variant.as_str()) {
                continue;
            }
            let Some(declaration) = metadata.resolve_all(variant).first().copied() else {
                warn!(
                    entry_point,
                    request_type = %variant,
                    "Request type not found in project metadata; skipping this variant."
                );
                continue;
            };
            let Some(object) = declaration.node.as_object() else {
                return Err(DocError::RequestTypeNotObject {
                    entry_point: entry_point.to_string(),
                    type_name: variant.clone(),
                });
            };

            if let Some(derived) = self.extract_bucket(object, "body", variant, "Body") {
                split.body.push(derived);
            }
            if let Some(derived) = self.extract_bucket(object, "headers", variant, "Headers") {
                split.headers.push(derived);
            }
            if let Some(derived) = self.extract_bucket(object, "pathParameters", variant, "Path") {
                split.path.push(derived);
            }
            if let Some(derived) =
                self.extract_bucket(object, "queryStringParameters", variant, "Query")
            {
                split.query.push(derived);
            }
        }

        Ok(split)
    }

    /// Extract one canonical property from a request variant, rename it
    /// `{Variant}{Suffix}`, and register it as a component.
    fn extract_bucket(
        &mut self,
        object: &ObjectNode,
        key: &str,
        variant: &str,
        suffix: &str,
    ) -> Option<DerivedComponent> {
        let property = object.properties.get(key)?;
        let name = format!("{variant}{suffix}");
        let mut node = property.node.clone();
        node.meta.name = Some(name.clone());
        self.registry.register(name.clone(), node.clone());
        Some(DerivedComponent { name, node })
    }
}

/// Expand object-shaped location sub-nodes into one parameter per property.
///
/// Non-object sub-nodes cannot name individual parameters and are skipped.
fn expand_parameters(bucket: &[DerivedComponent], location: ParamLocation) -> Vec<ParameterObject> {
    bucket
        .iter()
        .filter_map(|derived| derived.node.as_object())
        .flat_map(|object| {
            object.properties.iter().map(move |(name, property)| ParameterObject {
                name: name.clone(),
                location,
                schema: Some(to_schema(&property.node)),
                required: property.required,
            })
        })
        .collect()
}

/// Combine the derived body components of every variant into one request
/// body: zero variants yield empty content, one a single `$ref`, several an
/// `anyOf` of `$ref`s.
fn build_request_body(
    request: Option<&RequestAnnotation>,
    bodies: &[DerivedComponent],
    media_type: &str,
) -> (Option<RequestBodyObject>, Vec<String>) {
    let Some(request) = request else {
        return (None, Vec::new());
    };

    if bodies.is_empty() {
        return (
            Some(RequestBodyObject {
                description: request.comment.clone(),
                content: BTreeMap::new(),
            }),
            Vec::new(),
        );
    }

    let schema = if let [single] = bodies {
        body_reference(single)
    } else {
        SchemaObject {
            any_of: Some(bodies.iter().map(body_reference).collect()),
            ..SchemaObject::default()
        }
    };

    let mut content = BTreeMap::new();
    content.insert(
        media_type.to_string(),
        MediaTypeObject {
            schema: Some(schema),
        },
    );

    let names = bodies.iter().map(|body| body.name.clone()).collect();
    (
        Some(RequestBodyObject {
            description: request.comment.clone(),
            content,
        }),
        names,
    )
}

/// A `$ref` to a derived body component, carrying the body's own comment.
fn body_reference(body: &DerivedComponent) -> SchemaObject {
    let mut schema = SchemaObject::reference(&body.name);
    schema.description = body.node.meta.comment.clone();
    schema
}

/// Build the responses map from the entry point's response annotations.
fn build_responses(
    entry: &EntryPoint,
    media_type: &str,
) -> (BTreeMap<String, ResponseObject>, Vec<String>) {
    let mut responses = BTreeMap::new();
    let mut names = Vec::new();

    for annotation in &entry.responses {
        let refs: Vec<&String> = annotation
            .types
            .variants()
            .iter()
            .filter(|variant| !PRIMITIVE_TYPE_NAMES.contains(&variant.as_str()))
            .collect();

        let schema = match refs.as_slice() {
            [] => SchemaObject::default(),
            [single] => SchemaObject::reference(single.as_str()),
            many => SchemaObject {
                any_of: Some(
                    many.iter()
                        .map(|name| SchemaObject::reference(name.as_str()))
                        .collect(),
                ),
                ..SchemaObject::default()
            },
        };

        let status = annotation
            .status
            .map_or_else(|| "default".to_string(), |code| code.to_string());

        let mut content = BTreeMap::new();
        content.insert(
            media_type.to_string(),
            MediaTypeObject {
                schema: Some(schema),
            },
        );

        responses.insert(
            status,
            ResponseObject {
                description: annotation.comment.clone(),
                content: Some(content),
            },
        );

        names.extend(refs.into_iter().cloned());
    }

    (responses, names)
}

/// De-duplicate component names preserving first-use order.
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names.into_iter().filter(|name| seen.insert(name.clone())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::document::HttpMethod;
    use crate::metadata::{
        Declaration, DeclarationKind, ResponseAnnotation, TypeExpr,
    };
    use crate::node::ObjectProperty;

    fn object_node(properties: Vec<(&str, Node, bool)>) -> Node {
        let mut map = BTreeMap::new();
        for (name, node, required) in properties {
            map.insert(name.to_string(), ObjectProperty { node, required });
        }
        Node::object(map)
    }

    fn path_config(method: HttpMethod) -> PathConfig {
        PathConfig {
            path: "/accounts/{accountId}".to_string(),
            method,
            tag_name: "accounts".to_string(),
            summary: Some("Account operations".to_string()),
            description: None,
        }
    }

    fn entry_with_request(request_types: &str) -> EntryPoint {
        EntryPoint {
            name: "handler".to_string(),
            request: Some(RequestAnnotation {
                types: TypeExpr::parse(request_types),
                comment: None,
            }),
            ..EntryPoint::default()
        }
    }

    #[test]
    fn test_unknown_entry_point_is_a_hard_error() {
        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let metadata = GlobalMetadata::default();
        let result = builder.add_path("missing", &path_config(HttpMethod::Get), &metadata);
        assert!(matches!(
            result,
            Err(DocError::UnknownEntryPoint { entry_point }) if entry_point == "missing"
        ));
    }

    #[test]
    fn test_non_object_request_type_is_a_hard_error() {
        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new(
                "Alias",
                DeclarationKind::TypeAlias,
                Node::string(),
            )],
            entry_points: vec![entry_with_request("Alias")],
        };
        let result = builder.add_path("handler", &path_config(HttpMethod::Post), &metadata);
        assert!(matches!(
            result,
            Err(DocError::RequestTypeNotObject { type_name, .. }) if type_name == "Alias"
        ));
    }

    #[test]
    fn test_unresolved_request_variant_is_skipped() {
        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let metadata = GlobalMetadata {
            declarations: Vec::new(),
            entry_points: vec![entry_with_request("Ghost")],
        };
        let outcome = builder
            .add_path("handler", &path_config(HttpMethod::Post), &metadata)
            .unwrap();
        assert!(outcome.type_names_used.is_empty());

        // The request annotation still yields an (empty) request body.
        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].post.as_ref().unwrap();
        let body = operation.request_body.as_ref().unwrap();
        assert!(body.content.is_empty());
    }

    #[test]
    fn test_path_parameters_expand_with_location() {
        let request = object_node(vec![(
            "pathParameters",
            object_node(vec![("accountId", Node::string(), true)]),
            true,
        )]);
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new("IFoo", DeclarationKind::Interface, request)],
            entry_points: vec![entry_with_request("IFoo")],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();

        assert!(builder.registry().lookup("IFooPath").is_some());

        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();
        assert_eq!(operation.parameters.len(), 1);
        let rendered = serde_json::to_value(&operation.parameters[0]).unwrap();
        assert_eq!(
            rendered,
            json!({
                "name": "accountId",
                "in": "path",
                "schema": { "type": "string" },
                "required": true
            })
        );
        // No body property on the variant: zero request body content.
        let body = operation.request_body.as_ref().unwrap();
        assert!(body.content.is_empty());
    }

    #[test]
    fn test_query_and_header_locations() {
        let request = object_node(vec![
            (
                "queryStringParameters",
                object_node(vec![("cursor", Node::string(), false)]),
                true,
            ),
            (
                "headers",
                object_node(vec![("x-api-key", Node::string(), true)]),
                true,
            ),
        ]);
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new("IReq", DeclarationKind::Interface, request)],
            entry_points: vec![entry_with_request("IReq")],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();

        let locations: Vec<(String, ParamLocation, bool)> = operation
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.location, p.required))
            .collect();
        assert_eq!(
            locations,
            vec![
                ("cursor".to_string(), ParamLocation::Query, false),
                ("x-api-key".to_string(), ParamLocation::Header, true),
            ]
        );
    }

    #[test]
    fn test_two_body_variants_merge_into_any_of() {
        let variant = |name: &str| {
            Declaration::new(
                name,
                DeclarationKind::Interface,
                object_node(vec![(
                    "body",
                    object_node(vec![("value", Node::string(), true)]),
                    true,
                )]),
            )
        };
        let metadata = GlobalMetadata {
            declarations: vec![variant("TypeA"), variant("TypeB")],
            entry_points: vec![entry_with_request("TypeA | TypeB")],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let outcome = builder
            .add_path("handler", &path_config(HttpMethod::Post), &metadata)
            .unwrap();
        assert_eq!(
            outcome.type_names_used,
            vec!["TypeABody".to_string(), "TypeBBody".to_string()]
        );

        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].post.as_ref().unwrap();
        let body = operation.request_body.as_ref().unwrap();
        let schema = body.content["application/json"].schema.as_ref().unwrap();
        let rendered = serde_json::to_value(schema).unwrap();
        assert_eq!(
            rendered,
            json!({
                "anyOf": [
                    { "$ref": "#/components/schemas/TypeABody" },
                    { "$ref": "#/components/schemas/TypeBBody" }
                ]
            })
        );
    }

    #[test]
    fn test_single_response_emits_single_ref() {
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new(
                "ResDTO",
                DeclarationKind::Interface,
                object_node(vec![("ok", Node::boolean(), true)]),
            )],
            entry_points: vec![EntryPoint {
                name: "handler".to_string(),
                responses: vec![ResponseAnnotation {
                    types: TypeExpr::single("ResDTO"),
                    status: Some(200),
                    comment: Some("OK".to_string()),
                }],
                ..EntryPoint::default()
            }],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let outcome = builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        assert_eq!(outcome.type_names_used, vec!["ResDTO".to_string()]);

        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();
        let response = &operation.responses["200"];
        let schema = response.content.as_ref().unwrap()["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(
            schema.ref_path.as_deref(),
            Some("#/components/schemas/ResDTO")
        );

        // The referenced declaration is emitted as a component.
        let components = document.components.as_ref().unwrap();
        assert!(components.schemas.contains_key("ResDTO"));
    }

    #[test]
    fn test_primitive_response_variants_are_filtered() {
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new(
                "ResDTO",
                DeclarationKind::Interface,
                object_node(vec![("ok", Node::boolean(), true)]),
            )],
            entry_points: vec![EntryPoint {
                name: "handler".to_string(),
                responses: vec![ResponseAnnotation {
                    types: TypeExpr::parse("ResDTO | undefined"),
                    status: None,
                    comment: None,
                }],
                ..EntryPoint::default()
            }],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        let outcome = builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        assert_eq!(outcome.type_names_used, vec!["ResDTO".to_string()]);

        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();
        // No status declared: keyed under "default".
        let response = &operation.responses["default"];
        let schema = response.content.as_ref().unwrap()["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(
            schema.ref_path.as_deref(),
            Some("#/components/schemas/ResDTO")
        );
    }

    #[test]
    fn test_unreferenced_declarations_are_pruned() {
        let metadata = GlobalMetadata {
            declarations: vec![
                Declaration::new(
                    "Used",
                    DeclarationKind::Interface,
                    object_node(vec![("ok", Node::boolean(), true)]),
                ),
                Declaration::new(
                    "Unused",
                    DeclarationKind::Interface,
                    object_node(vec![("ignored", Node::string(), true)]),
                ),
            ],
            entry_points: vec![EntryPoint {
                name: "handler".to_string(),
                responses: vec![ResponseAnnotation {
                    types: TypeExpr::single("Used"),
                    status: Some(200),
                    comment: None,
                }],
                ..EntryPoint::default()
            }],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        let document = builder.finish(&metadata);
        let components = document.components.unwrap();
        assert!(components.schemas.contains_key("Used"));
        assert!(!components.schemas.contains_key("Unused"));
    }

    #[test]
    fn test_custom_media_type_keys_the_content() {
        let metadata = GlobalMetadata {
            declarations: vec![Declaration::new(
                "ResDTO",
                DeclarationKind::Interface,
                object_node(vec![("ok", Node::boolean(), true)]),
            )],
            entry_points: vec![EntryPoint {
                name: "handler".to_string(),
                media_type: Some("application/xml".to_string()),
                responses: vec![ResponseAnnotation {
                    types: TypeExpr::single("ResDTO"),
                    status: Some(200),
                    comment: None,
                }],
                ..EntryPoint::default()
            }],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();
        let response = &operation.responses["200"];
        assert!(response.content.as_ref().unwrap().contains_key("application/xml"));
    }

    #[test]
    fn test_multiple_methods_share_one_path_item() {
        let metadata = GlobalMetadata {
            declarations: Vec::new(),
            entry_points: vec![
                EntryPoint {
                    name: "list".to_string(),
                    ..EntryPoint::default()
                },
                EntryPoint {
                    name: "create".to_string(),
                    ..EntryPoint::default()
                },
            ],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("list", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        builder
            .add_path("create", &path_config(HttpMethod::Post), &metadata)
            .unwrap();
        let document = builder.finish(&metadata);
        let item = &document.paths["/accounts/{accountId}"];
        assert!(item.get.is_some());
        assert!(item.post.is_some());
    }

    #[test]
    fn test_entry_tag_joins_config_tag() {
        let metadata = GlobalMetadata {
            declarations: Vec::new(),
            entry_points: vec![EntryPoint {
                name: "handler".to_string(),
                tag: Some("billing".to_string()),
                ..EntryPoint::default()
            }],
        };

        let mut builder = DocumentBuilder::new(Info::new("app", "1.0.0"));
        builder
            .add_path("handler", &path_config(HttpMethod::Get), &metadata)
            .unwrap();
        let document = builder.finish(&metadata);
        let operation = document.paths["/accounts/{accountId}"].get.as_ref().unwrap();
        assert_eq!(
            operation.tags,
            vec!["accounts".to_string(), "billing".to_string()]
        );
    }
}
