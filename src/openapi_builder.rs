use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::extractor::{ExtractedRoute, HttpMethod, DEFAULT_MEDIA_TYPE};
use crate::schema_generator::Schema;

/// Version string written into documents whose base omits one.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// OpenAPI PathItem object - all operations declared for one path template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// TRACE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

/// OpenAPI Operation object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Tags from the route options; omitted when none were given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Parameters (path, query, header) in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code text
    pub responses: IndexMap<String, ResponseObject>,
}

/// OpenAPI Parameter object. The schema always travels inside a `content`
/// map rather than a bare `schema` key, so structured parameter payloads
/// keep their media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Media type map carrying the parameter schema
    pub content: IndexMap<String, MediaTypeObject>,
    /// Whether the parameter is required
    pub required: bool,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Content types and their schemas
    pub content: IndexMap<String, MediaTypeObject>,
    /// Whether the request body is required
    pub required: bool,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTypeObject {
    /// Schema for this media type; absent for schema-less responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Reference to a named example supplied by the base document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleReference>,
}

/// `$ref` pointer into `components.examples`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleReference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseObject {
    /// Response description; omitted when the declaration names none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response content; omitted when there is neither schema nor example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaTypeObject>>,
}

/// Collects extracted routes into the `paths` section.
///
/// Path templates keep their authored text and first-insertion order;
/// method keys are lower-case. A later route for an already-filled
/// path+method slot replaces the earlier operation.
pub struct OpenApiBuilder {
    paths: IndexMap<String, PathItem>,
}

impl OpenApiBuilder {
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        OpenApiBuilder {
            paths: IndexMap::new(),
        }
    }

    /// Adds one extracted route as an operation under its path template.
    pub fn add_route(&mut self, route: &ExtractedRoute) {
        debug!("Adding operation {} {}", route.method.as_str(), route.path);

        let operation = build_operation(route);
        let path_item = self.paths.entry(route.path.clone()).or_default();
        match route.method {
            HttpMethod::Get => path_item.get = Some(operation),
            HttpMethod::Post => path_item.post = Some(operation),
            HttpMethod::Put => path_item.put = Some(operation),
            HttpMethod::Delete => path_item.delete = Some(operation),
            HttpMethod::Patch => path_item.patch = Some(operation),
            HttpMethod::Options => path_item.options = Some(operation),
            HttpMethod::Head => path_item.head = Some(operation),
            HttpMethod::Trace => path_item.trace = Some(operation),
        }
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    pub fn into_paths(self) -> IndexMap<String, PathItem> {
        self.paths
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_operation(route: &ExtractedRoute) -> Operation {
    let tags = if route.tags.is_empty() {
        None
    } else {
        Some(route.tags.clone())
    };

    let parameters = if route.parameters.is_empty() {
        None
    } else {
        let parameters = route
            .parameters
            .iter()
            .map(|parameter| {
                let mut content = IndexMap::new();
                content.insert(
                    DEFAULT_MEDIA_TYPE.to_string(),
                    MediaTypeObject {
                        schema: Some(parameter.schema.clone()),
                        example: None,
                    },
                );
                Parameter {
                    name: parameter.name.clone(),
                    location: parameter.location.clone(),
                    content,
                    required: parameter.required,
                }
            })
            .collect();
        Some(parameters)
    };

    let request_body = route.request_body.as_ref().map(|body| {
        let mut content = IndexMap::new();
        content.insert(
            body.media_type.clone(),
            MediaTypeObject {
                schema: Some(body.schema.clone()),
                example: None,
            },
        );
        RequestBody {
            content,
            required: body.required,
        }
    });

    // The first response declared for a status code wins; later ones for
    // the same status are ignored.
    let mut responses = IndexMap::new();
    for response in &route.responses {
        let content = if response.schema.is_some() || response.example.is_some() {
            let mut media = IndexMap::new();
            media.insert(
                response.media_type.clone(),
                MediaTypeObject {
                    schema: response.schema.clone(),
                    example: response
                        .example
                        .clone()
                        .map(|reference| ExampleReference { reference }),
                },
            );
            Some(media)
        } else {
            None
        };
        responses
            .entry(response.status.clone())
            .or_insert(ResponseObject {
                description: response.description.clone(),
                content,
            });
    }

    Operation {
        tags,
        parameters,
        request_body,
        responses,
    }
}

/// Merges the generated `paths` and `components` into a caller-supplied
/// base document.
///
/// Objects merge recursively: generated leaves overwrite base leaves and
/// keys only the base has survive untouched, so `info`, `servers` and
/// hand-written `components.examples` all pass through. A base that omits
/// the `openapi` field gets [`OPENAPI_VERSION`] inserted.
pub struct DocumentAssembler {
    base: Value,
}

impl DocumentAssembler {
    pub fn new(base: Value) -> Self {
        debug!("Initializing DocumentAssembler");
        DocumentAssembler { base }
    }

    pub fn assemble(
        &self,
        paths: &IndexMap<String, PathItem>,
        schemas: &IndexMap<String, Schema>,
    ) -> Result<Value> {
        let mut document = match &self.base {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => self.base.clone(),
            _ => {
                return Err(Error::InvalidArgument(
                    "base document must be a JSON object".to_string(),
                ))
            }
        };

        let mut generated = Map::new();
        generated.insert("paths".to_string(), serde_json::to_value(paths)?);
        if !schemas.is_empty() {
            let mut components = Map::new();
            components.insert("schemas".to_string(), serde_json::to_value(schemas)?);
            generated.insert("components".to_string(), Value::Object(components));
        }

        deep_merge(&mut document, Value::Object(generated));

        if let Value::Object(object) = &mut document {
            if !object.contains_key("openapi") {
                let mut with_version = Map::new();
                with_version.insert(
                    "openapi".to_string(),
                    Value::String(OPENAPI_VERSION.to_string()),
                );
                with_version.append(object);
                *object = with_version;
            }
        }

        Ok(document)
    }
}

/// Recursive object merge; non-object values replace the target.
fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
