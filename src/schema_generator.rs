use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use swc_ecma_ast::TsType;

use crate::error::{Error, Result};
use crate::type_resolver::{Annotation, LiteralValue, MarkerKind, TypeResolver, TypeShape};

/// What to do when two distinct declarations register under the same
/// schema name in the same namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log a warning and let the later registration win
    #[default]
    Overwrite,
    /// Abort generation with an error
    Error,
}

/// OpenAPI schema object. Only the keywords this tool emits are modeled;
/// optional fields are omitted from the output entirely when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Format of a primitive schema, e.g. "date" or "int64"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// The type keyword (string, number, boolean, object, array)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Literal values for enum schemas
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    /// Union branches
    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    /// Intersection members
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    /// Reference to a registered schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Builds the `$ref` pointer for a registered schema. Namespaced schemas
/// live inside their group object, so the pointer goes through its
/// `properties` key.
pub fn schema_ref(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("#/components/schemas/{}/properties/{}", ns, name),
        None => format!("#/components/schemas/{}", name),
    }
}

/// Builds the `$ref` pointer for a named example. Namespaced example names
/// are dot-joined; the entries themselves come from the base document.
pub fn example_ref(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("#/components/examples/{}.{}", ns, name),
        None => format!("#/components/examples/{}", name),
    }
}

/// Converts resolved type shapes to OpenAPI schemas and maintains the
/// schema registry keyed by `(namespace, name)`.
///
/// Rendering a `NamedRef` registers its definition (in the same namespace,
/// so nested references inherit it) and returns a `$ref` schema. Insertion
/// order is preserved all the way into the components section.
pub struct SchemaGenerator<'g> {
    /// Type resolver for looking up definitions
    type_resolver: TypeResolver<'g>,
    collision_policy: CollisionPolicy,
    /// Registered schemas in first-registration order
    schemas: IndexMap<(Option<String>, String), Schema>,
    /// Defining module of each registered schema, for collision detection
    sources: HashMap<(Option<String>, String), PathBuf>,
    /// Registrations currently in progress, to keep self-references from
    /// recursing
    registering: HashSet<(Option<String>, String)>,
}

impl<'g> SchemaGenerator<'g> {
    pub fn new(type_resolver: TypeResolver<'g>, collision_policy: CollisionPolicy) -> Self {
        debug!("Initializing SchemaGenerator");
        SchemaGenerator {
            type_resolver,
            collision_policy,
            schemas: IndexMap::new(),
            sources: HashMap::new(),
            registering: HashSet::new(),
        }
    }

    /// Access the underlying resolver, e.g. to resolve an annotation
    /// before rendering it.
    pub fn resolver(&mut self) -> &mut TypeResolver<'g> {
        &mut self.type_resolver
    }

    /// Generate the schema for a type annotation appearing in `module`,
    /// registering any named types it references under `namespace`.
    pub fn schema_for_type(
        &mut self,
        module: &'g Path,
        ty: &'g TsType,
        namespace: Option<&str>,
    ) -> Result<Schema> {
        let shape = self.type_resolver.resolve_type(module, ty);
        self.render(&shape, namespace)
    }

    /// Generate the schema for a type annotation, reporting marker-wrapper
    /// metadata alongside. A namespace on the wrapper re-points the schema
    /// into that namespace.
    pub fn schema_for_annotated(
        &mut self,
        module: &'g Path,
        ty: &'g TsType,
    ) -> Result<(Schema, Option<(MarkerKind, Annotation)>)> {
        let (shape, metadata) = self.type_resolver.resolve_annotated(module, ty);
        let namespace = metadata
            .as_ref()
            .and_then(|(_, annotation)| annotation.namespace.clone());
        let mut schema = self.render(&shape, namespace.as_deref())?;
        if let Some((_, annotation)) = &metadata {
            if let Some(format) = &annotation.format {
                schema.format = Some(format.clone());
            }
        }
        Ok((schema, metadata))
    }

    /// Generate the schema for an identifier reference, e.g. the class
    /// name behind a `new AdminUser()` response value.
    pub fn schema_for_ident(
        &mut self,
        module: &'g Path,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Schema> {
        let shape = self.type_resolver.resolve_ident(module, name);
        self.render(&shape, namespace)
    }

    /// Render a resolved shape to a schema within `namespace`.
    pub fn render(&mut self, shape: &TypeShape, namespace: Option<&str>) -> Result<Schema> {
        match shape {
            TypeShape::Primitive(kind) => Ok(Schema {
                schema_type: Some(kind.type_name().to_string()),
                ..Default::default()
            }),
            TypeShape::Object(object) => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();
                for field in &object.fields {
                    let mut field_schema = self.render(&field.shape, namespace)?;
                    if let Some(format) = &field.format {
                        field_schema.format = Some(format.clone());
                    }
                    properties.insert(field.name.clone(), field_schema);
                    if field.required {
                        required.push(field.name.clone());
                    }
                }
                Ok(Schema {
                    schema_type: Some("object".to_string()),
                    properties: if properties.is_empty() {
                        None
                    } else {
                        Some(properties)
                    },
                    required: if required.is_empty() {
                        None
                    } else {
                        Some(required)
                    },
                    ..Default::default()
                })
            }
            TypeShape::Array(element) => {
                let items = self.render(element, namespace)?;
                Ok(Schema {
                    schema_type: Some("array".to_string()),
                    items: Some(Box::new(items)),
                    ..Default::default()
                })
            }
            TypeShape::Enum(values) => Ok(render_enum(values)),
            TypeShape::Union(members) => {
                let branches = members
                    .iter()
                    .map(|member| self.render(member, namespace))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Schema {
                    any_of: Some(branches),
                    ..Default::default()
                })
            }
            TypeShape::Intersection(members) => self.render_intersection(members, namespace),
            TypeShape::NamedRef {
                module,
                name,
                namespace: field_namespace,
            } => {
                let effective = field_namespace.as_deref().or(namespace);
                self.ensure_registered(module, name, effective)?;
                Ok(Schema {
                    reference: Some(schema_ref(effective, name)),
                    ..Default::default()
                })
            }
            TypeShape::Unknown => Ok(Schema::default()),
        }
    }

    /// An intersection of exactly one reference and one object literal is
    /// flattened: the literal's fields merge into the schema alongside an
    /// `allOf` entry for the reference. Anything else renders as a plain
    /// `allOf` list.
    fn render_intersection(
        &mut self,
        members: &[TypeShape],
        namespace: Option<&str>,
    ) -> Result<Schema> {
        if members.len() == 2 {
            let reference = members
                .iter()
                .find(|m| matches!(m, TypeShape::NamedRef { .. }));
            let object = members.iter().find(|m| matches!(m, TypeShape::Object(_)));
            if let (Some(reference), Some(object)) = (reference, object) {
                let mut merged = self.render(object, namespace)?;
                let referenced = self.render(reference, namespace)?;
                merged.all_of = Some(vec![referenced]);
                return Ok(merged);
            }
        }

        let rendered = members
            .iter()
            .map(|member| self.render(member, namespace))
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema {
            all_of: Some(rendered),
            ..Default::default()
        })
    }

    /// Register the definition behind a `NamedRef` under `(namespace,
    /// name)`, rendering it on first encounter. A redefinition from another
    /// module is rendered and compared first: a structurally identical one
    /// is ignored, a differing one goes through the collision policy.
    fn ensure_registered(
        &mut self,
        module: &Path,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        let key = (namespace.map(str::to_string), name.to_string());

        if self.registering.contains(&key) {
            return Ok(());
        }
        if let Some(source) = self.sources.get(&key) {
            if source == module {
                return Ok(());
            }
        }

        let Some(definition) = self.type_resolver.definition(module, name).cloned() else {
            warn!(
                "No definition recorded for schema '{}' from {}",
                name,
                module.display()
            );
            return Ok(());
        };

        self.registering.insert(key.clone());
        let rendered = self.render(&definition, namespace);
        self.registering.remove(&key);
        let rendered = rendered?;

        if let Some(source) = self.sources.get(&key) {
            if self.schemas.get(&key) == Some(&rendered) {
                return Ok(());
            }
            let label = match namespace {
                Some(ns) => format!("{}.{}", ns, name),
                None => name.to_string(),
            };
            match self.collision_policy {
                CollisionPolicy::Error => {
                    return Err(Error::SchemaConflict(format!(
                        "schema '{}' is defined by both {} and {}",
                        label,
                        source.display(),
                        module.display()
                    )));
                }
                CollisionPolicy::Overwrite => {
                    warn!(
                        "Schema '{}' redefined by {}, overwriting the definition from {}",
                        label,
                        module.display(),
                        source.display()
                    );
                }
            }
        }

        self.sources.insert(key.clone(), module.to_path_buf());
        self.schemas.insert(key, rendered);
        Ok(())
    }

    /// All registered schemas in registration order.
    pub fn schemas(&self) -> &IndexMap<(Option<String>, String), Schema> {
        &self.schemas
    }

    /// Fold the registry into the `components.schemas` map. Namespaced
    /// schemas become properties of a group object; the group itself
    /// carries no required list.
    pub fn into_components(self) -> IndexMap<String, Schema> {
        let mut components = IndexMap::new();

        for ((namespace, name), schema) in self.schemas {
            match namespace {
                None => {
                    components.insert(name, schema);
                }
                Some(ns) => {
                    let group = components.entry(ns).or_insert_with(|| Schema {
                        schema_type: Some("object".to_string()),
                        properties: Some(IndexMap::new()),
                        ..Default::default()
                    });
                    if let Some(properties) = group.properties.as_mut() {
                        properties.insert(name, schema);
                    }
                }
            }
        }

        components
    }
}

fn render_enum(values: &[LiteralValue]) -> Schema {
    let schema_type = match values.first() {
        Some(LiteralValue::Num(_)) => "number",
        _ => "string",
    };
    let rendered = values
        .iter()
        .map(|value| match value {
            LiteralValue::Str(s) => serde_json::Value::from(s.clone()),
            LiteralValue::Num(n) => {
                if n.fract() == 0.0 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Value::from(*n)
                }
            }
        })
        .collect();

    Schema {
        schema_type: Some(schema_type.to_string()),
        enum_values: Some(rendered),
        ..Default::default()
    }
}
