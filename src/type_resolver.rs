use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use swc_ecma_ast::{
    Class, ClassMember, Expr, ParamOrTsParamProp, PropName, TsEntityName, TsExprWithTypeArgs,
    TsInterfaceDecl, TsKeywordTypeKind, TsLit, TsParamPropParam, TsType, TsTypeElement,
    TsTypeParamInstantiation, TsTypeRef,
};

use crate::graph::{FoundDeclaration, ModuleGraph, TypeDeclaration};

/// Canonical structural representation of a resolved type, independent of
/// how it was declared or aliased.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Primitive(PrimitiveKind),
    Object(ObjectShape),
    Array(Box<TypeShape>),
    /// Union of string/number literals, in declaration order
    Enum(Vec<LiteralValue>),
    /// Union with at least one non-literal member, rendered as `anyOf`
    Union(Vec<TypeShape>),
    /// Intersection of shapes, rendered as `allOf`
    Intersection(Vec<TypeShape>),
    /// Reference to a schema registered under `name`; `module` identifies
    /// the defining module for definition lookup
    NamedRef {
        module: PathBuf,
        name: String,
        namespace: Option<String>,
    },
    /// Unrecognized construct, synthesized as an empty schema
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// A literal value appearing in an enum shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Num(f64),
}

/// An object shape with fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    /// The fields of the object
    pub fields: Vec<FieldShape>,
}

/// Field of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Field name
    pub name: String,
    /// Resolved shape of the field's type
    pub shape: TypeShape,
    /// Whether the field is listed in the parent's `required` array
    pub required: bool,
    /// Format carried over from a marker wrapper on the field, if any
    pub format: Option<String>,
}

/// Marker wrapper kinds, recognized by identifier name with or without
/// the `Lil` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Body,
    Header,
    Query,
    Route,
    RequiredProp,
}

impl MarkerKind {
    pub fn from_name(name: &str) -> Option<MarkerKind> {
        let bare = name.strip_prefix("Lil").unwrap_or(name);
        match bare {
            "BodyParam" => Some(MarkerKind::Body),
            "Header" => Some(MarkerKind::Header),
            "QueryParam" => Some(MarkerKind::Query),
            "RouteParam" => Some(MarkerKind::Route),
            "RequiredProp" | "RequiredField" => Some(MarkerKind::RequiredProp),
            _ => None,
        }
    }

    /// OpenAPI parameter location, for the kinds that map to one.
    pub fn location(self) -> Option<&'static str> {
        match self {
            MarkerKind::Header => Some("header"),
            MarkerKind::Query => Some("query"),
            MarkerKind::Route => Some("path"),
            MarkerKind::Body | MarkerKind::RequiredProp => None,
        }
    }

    /// Requiredness when the wrapper omits its `required` argument,
    /// matching the marker type declarations.
    pub fn default_required(self) -> bool {
        !matches!(self, MarkerKind::Query)
    }
}

/// Side metadata captured when a marker wrapper is stripped. It attaches
/// to the consuming parameter, body, or field, never to the payload shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub required: Option<bool>,
    pub namespace: Option<String>,
    pub format: Option<String>,
    pub media_type: Option<String>,
}

/// Resolution context: the module whose names are in scope, plus the
/// generic substitutions currently applied. Each substitution carries the
/// module its type argument was written in, since that is where the
/// argument's own names bind.
struct ResolveCtx<'g> {
    module: &'g Path,
    substitutions: HashMap<String, (&'g Path, &'g TsType)>,
}

impl<'g> ResolveCtx<'g> {
    fn plain(module: &'g Path) -> Self {
        ResolveCtx {
            module,
            substitutions: HashMap::new(),
        }
    }
}

/// Resolves named type references to structured [`TypeShape`]s.
///
/// Resolution is memoized by defining module, name and generic arguments.
/// A reference encountered while it is still being resolved returns a
/// `NamedRef` placeholder to itself instead of recursing, which is what
/// lets self-referential types terminate.
///
/// The resolver also keeps a definition table of every named shape it has
/// produced, in first-encounter order; the schema generator reads it to
/// register `$ref` targets.
pub struct TypeResolver<'g> {
    /// The module graph declarations are looked up in
    graph: &'g ModuleGraph,
    /// Cache of resolved references to avoid redundant work
    type_cache: HashMap<String, TypeShape>,
    /// Track references currently being resolved to detect cycles
    resolving_stack: HashSet<String>,
    /// Named shapes produced so far, in first-encounter order
    definitions: IndexMap<(PathBuf, String), TypeShape>,
}

impl<'g> TypeResolver<'g> {
    pub fn new(graph: &'g ModuleGraph) -> Self {
        debug!("Initializing TypeResolver over {} modules", graph.len());
        TypeResolver {
            graph,
            type_cache: HashMap::new(),
            resolving_stack: HashSet::new(),
            definitions: IndexMap::new(),
        }
    }

    /// Resolve a type annotation appearing in `module`.
    pub fn resolve_type(&mut self, module: &'g Path, ty: &'g TsType) -> TypeShape {
        let ctx = ResolveCtx::plain(module);
        self.resolve_ts_type(ty, &ctx)
    }

    /// Resolve a type annotation, additionally reporting marker-wrapper
    /// metadata when the annotation's outermost type is a wrapper.
    pub fn resolve_annotated(
        &mut self,
        module: &'g Path,
        ty: &'g TsType,
    ) -> (TypeShape, Option<(MarkerKind, Annotation)>) {
        let ctx = ResolveCtx::plain(module);
        self.resolve_annotated_inner(ty, &ctx)
    }

    /// Resolve a bare identifier reference appearing in `module`, e.g. the
    /// class name behind a `new AdminUser()` response value.
    pub fn resolve_ident(&mut self, module: &'g Path, name: &str) -> TypeShape {
        let ctx = ResolveCtx::plain(module);
        self.resolve_reference(&ctx, name, None, false)
    }

    /// The named shapes produced so far, in first-encounter order.
    pub fn definitions(&self) -> &IndexMap<(PathBuf, String), TypeShape> {
        &self.definitions
    }

    /// Look up the definition recorded for a `NamedRef`.
    pub fn definition(&self, module: &Path, name: &str) -> Option<&TypeShape> {
        self.definitions
            .get(&(module.to_path_buf(), name.to_string()))
    }

    fn resolve_annotated_inner(
        &mut self,
        ty: &'g TsType,
        ctx: &ResolveCtx<'g>,
    ) -> (TypeShape, Option<(MarkerKind, Annotation)>) {
        if let TsType::TsTypeRef(type_ref) = ty {
            if let TsEntityName::Ident(ident) = &type_ref.type_name {
                if let Some(kind) = MarkerKind::from_name(ident.sym.as_ref()) {
                    let (shape, annotation) = self.unwrap_marker(kind, type_ref, ctx);
                    return (shape, Some((kind, annotation)));
                }
            }
        }
        (self.resolve_ts_type(ty, ctx), None)
    }

    /// Strip a marker wrapper, resolving its payload and capturing the
    /// `required`, `namespace` and `format` (or media type) arguments.
    fn unwrap_marker(
        &mut self,
        kind: MarkerKind,
        type_ref: &'g TsTypeRef,
        ctx: &ResolveCtx<'g>,
    ) -> (TypeShape, Annotation) {
        let mut annotation = Annotation::default();
        if kind == MarkerKind::RequiredProp {
            annotation.required = Some(true);
        }

        let Some(type_params) = type_ref.type_params.as_deref() else {
            return (TypeShape::Unknown, annotation);
        };

        let shape = match type_params.params.first() {
            Some(payload) => self.resolve_ts_type(payload.as_ref(), ctx),
            None => TypeShape::Unknown,
        };

        if let Some(TsType::TsLitType(lit)) = type_params.params.get(1).map(|p| p.as_ref()) {
            if let TsLit::Bool(required) = &lit.lit {
                annotation.required = Some(required.value);
            }
        }
        if let Some(TsType::TsLitType(lit)) = type_params.params.get(2).map(|p| p.as_ref()) {
            if let TsLit::Str(namespace) = &lit.lit {
                annotation.namespace = Some(namespace.value.to_string());
            }
        }
        if let Some(TsType::TsLitType(lit)) = type_params.params.get(3).map(|p| p.as_ref()) {
            if let TsLit::Str(text) = &lit.lit {
                // Position 3 is the media type on body wrappers and the
                // schema format on parameter wrappers
                if kind == MarkerKind::Body {
                    annotation.media_type = Some(text.value.to_string());
                } else {
                    annotation.format = Some(text.value.to_string());
                }
            }
        }

        (shape, annotation)
    }

    fn resolve_ts_type(&mut self, ty: &'g TsType, ctx: &ResolveCtx<'g>) -> TypeShape {
        match ty {
            TsType::TsKeywordType(keyword) => match keyword.kind {
                TsKeywordTypeKind::TsStringKeyword | TsKeywordTypeKind::TsSymbolKeyword => {
                    TypeShape::Primitive(PrimitiveKind::String)
                }
                TsKeywordTypeKind::TsNumberKeyword | TsKeywordTypeKind::TsBigIntKeyword => {
                    TypeShape::Primitive(PrimitiveKind::Number)
                }
                TsKeywordTypeKind::TsBooleanKeyword => TypeShape::Primitive(PrimitiveKind::Boolean),
                TsKeywordTypeKind::TsObjectKeyword => TypeShape::Object(ObjectShape::default()),
                _ => TypeShape::Unknown,
            },
            TsType::TsLitType(lit) => match &lit.lit {
                TsLit::Str(s) => TypeShape::Enum(vec![LiteralValue::Str(s.value.to_string())]),
                TsLit::Number(n) => TypeShape::Enum(vec![LiteralValue::Num(n.value)]),
                TsLit::Bool(_) => TypeShape::Primitive(PrimitiveKind::Boolean),
                _ => TypeShape::Unknown,
            },
            TsType::TsArrayType(array) => TypeShape::Array(Box::new(
                self.resolve_ts_type(array.elem_type.as_ref(), ctx),
            )),
            TsType::TsTypeLit(type_lit) => {
                TypeShape::Object(self.resolve_members(&type_lit.members, ctx))
            }
            TsType::TsTypeRef(type_ref) => self.resolve_type_ref(type_ref, ctx),
            TsType::TsUnionOrIntersectionType(union_or_intersection) => {
                use swc_ecma_ast::TsUnionOrIntersectionType::*;
                match union_or_intersection {
                    TsUnionType(union) => self.resolve_union(&union.types, ctx),
                    TsIntersectionType(intersection) => {
                        let members = intersection
                            .types
                            .iter()
                            .map(|member| self.resolve_ts_type(member.as_ref(), ctx))
                            .collect();
                        TypeShape::Intersection(members)
                    }
                }
            }
            TsType::TsParenthesizedType(paren) => {
                self.resolve_ts_type(paren.type_ann.as_ref(), ctx)
            }
            _ => TypeShape::Unknown,
        }
    }

    fn resolve_union(&mut self, types: &'g [Box<TsType>], ctx: &ResolveCtx<'g>) -> TypeShape {
        // `T | null` and `T | undefined` collapse to T
        let significant: Vec<&'g TsType> = types
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !is_null_or_undefined(t))
            .collect();

        if significant.is_empty() {
            return TypeShape::Unknown;
        }
        if significant.len() == 1 {
            return self.resolve_ts_type(significant[0], ctx);
        }

        if significant.iter().all(|t| literal_value(t).is_some()) {
            let values = significant.iter().filter_map(|t| literal_value(t)).collect();
            return TypeShape::Enum(values);
        }

        let members = significant
            .into_iter()
            .map(|t| self.resolve_ts_type(t, ctx))
            .collect();
        TypeShape::Union(members)
    }

    fn resolve_type_ref(&mut self, type_ref: &'g TsTypeRef, ctx: &ResolveCtx<'g>) -> TypeShape {
        let type_args = type_ref.type_params.as_deref();

        match &type_ref.type_name {
            TsEntityName::Ident(ident) => {
                let name = ident.sym.as_ref();

                // An applied generic parameter resolves to its argument,
                // in the argument's own module context
                if let Some((module, substituted)) = ctx.substitutions.get(name) {
                    let sub_ctx = ResolveCtx::plain(module);
                    return self.resolve_ts_type(substituted, &sub_ctx);
                }

                if name == "Array" || name == "ReadonlyArray" {
                    let element = match type_args.and_then(|args| args.params.first()) {
                        Some(arg) => self.resolve_ts_type(arg.as_ref(), ctx),
                        None => TypeShape::Unknown,
                    };
                    return TypeShape::Array(Box::new(element));
                }

                // A marker wrapper in plain type position unwraps to its
                // payload; the metadata has no consumer here
                if let Some(kind) = MarkerKind::from_name(name) {
                    let (shape, _) = self.unwrap_marker(kind, type_ref, ctx);
                    return shape;
                }

                self.resolve_reference(ctx, name, type_args, false)
            }
            TsEntityName::TsQualifiedName(qualified) => {
                // Only `ns.Member` against a namespace import is supported
                let TsEntityName::Ident(left) = &qualified.left else {
                    return TypeShape::Unknown;
                };
                let member = qualified.right.sym.as_ref();
                match self
                    .graph
                    .find_namespace_member(ctx.module, left.sym.as_ref(), member)
                {
                    Some(found) => self.resolve_found(found, member, type_args, ctx, false),
                    None => {
                        warn!(
                            "Could not resolve type reference '{}.{}' in {}",
                            left.sym.as_ref(),
                            member,
                            ctx.module.display()
                        );
                        TypeShape::Unknown
                    }
                }
            }
        }
    }

    /// Resolve a named reference. When `want_full` is false, shapes that
    /// register as standalone schemas come back as a `NamedRef`; extends
    /// merging passes true to obtain the parent's full field list.
    fn resolve_reference(
        &mut self,
        ctx: &ResolveCtx<'g>,
        use_name: &str,
        type_args: Option<&'g TsTypeParamInstantiation>,
        want_full: bool,
    ) -> TypeShape {
        match self.graph.find_declaration(ctx.module, use_name) {
            Some(found) => self.resolve_found(found, use_name, type_args, ctx, want_full),
            None => {
                warn!(
                    "Could not resolve type reference '{}' in {}",
                    use_name,
                    ctx.module.display()
                );
                TypeShape::Unknown
            }
        }
    }

    fn resolve_found(
        &mut self,
        found: FoundDeclaration<'g>,
        use_name: &str,
        type_args: Option<&'g TsTypeParamInstantiation>,
        call_ctx: &ResolveCtx<'g>,
        want_full: bool,
    ) -> TypeShape {
        let decl_module = found.module.canonical_path.as_path();
        let cache_key = format!(
            "{}::{}<{}>",
            decl_module.display(),
            use_name,
            args_key(type_args, call_ctx)
        );

        // A reference that is still being resolved points back to itself
        if self.resolving_stack.contains(&cache_key) {
            debug!("Breaking resolution cycle at {}", cache_key);
            return TypeShape::NamedRef {
                module: decl_module.to_path_buf(),
                name: use_name.to_string(),
                namespace: None,
            };
        }

        let full = if let Some(cached) = self.type_cache.get(&cache_key) {
            debug!("Reference {} found in cache", cache_key);
            cached.clone()
        } else {
            self.resolving_stack.insert(cache_key.clone());
            let resolved = self.resolve_declaration(found, type_args, call_ctx);
            self.resolving_stack.remove(&cache_key);

            self.type_cache.insert(cache_key, resolved.clone());
            if is_registrable(&resolved) {
                self.definitions.insert(
                    (decl_module.to_path_buf(), use_name.to_string()),
                    resolved.clone(),
                );
            }
            resolved
        };

        if want_full || !is_registrable(&full) {
            full
        } else {
            TypeShape::NamedRef {
                module: decl_module.to_path_buf(),
                name: use_name.to_string(),
                namespace: None,
            }
        }
    }

    fn resolve_declaration(
        &mut self,
        found: FoundDeclaration<'g>,
        type_args: Option<&'g TsTypeParamInstantiation>,
        call_ctx: &ResolveCtx<'g>,
    ) -> TypeShape {
        let decl_module = found.module.canonical_path.as_path();

        match found.decl {
            TypeDeclaration::Alias(alias) => {
                let ctx = self.declaration_ctx(
                    decl_module,
                    alias.type_params.as_deref(),
                    type_args,
                    call_ctx,
                );
                self.resolve_ts_type(alias.type_ann.as_ref(), &ctx)
            }
            TypeDeclaration::Interface(interface) => {
                let ctx = self.declaration_ctx(
                    decl_module,
                    interface.type_params.as_deref(),
                    type_args,
                    call_ctx,
                );
                self.resolve_interface(interface, &ctx)
            }
            TypeDeclaration::Enum(ts_enum) => resolve_enum_members(ts_enum),
            TypeDeclaration::Class(class) => {
                let ctx = self.declaration_ctx(
                    decl_module,
                    class.type_params.as_deref(),
                    type_args,
                    call_ctx,
                );
                TypeShape::Object(self.resolve_class(class, &ctx))
            }
        }
    }

    /// Build the context for resolving a declaration body: positional
    /// generic arguments, or their declared defaults, become substitutions.
    fn declaration_ctx(
        &self,
        decl_module: &'g Path,
        type_params: Option<&'g swc_ecma_ast::TsTypeParamDecl>,
        type_args: Option<&'g TsTypeParamInstantiation>,
        call_ctx: &ResolveCtx<'g>,
    ) -> ResolveCtx<'g> {
        let mut substitutions = HashMap::new();

        if let Some(params) = type_params {
            for (index, param) in params.params.iter().enumerate() {
                match type_args.and_then(|args| args.params.get(index)) {
                    Some(arg) => {
                        substitutions
                            .insert(param.name.sym.to_string(), (call_ctx.module, arg.as_ref()));
                    }
                    None => {
                        if let Some(default) = param.default.as_deref() {
                            substitutions
                                .insert(param.name.sym.to_string(), (decl_module, default));
                        }
                    }
                }
            }
        }

        ResolveCtx {
            module: decl_module,
            substitutions,
        }
    }

    fn resolve_interface(
        &mut self,
        interface: &'g TsInterfaceDecl,
        ctx: &ResolveCtx<'g>,
    ) -> TypeShape {
        let own = self.resolve_members(&interface.body.body, ctx);

        if interface.extends.is_empty() {
            return TypeShape::Object(own);
        }

        let mut merged = ObjectShape::default();
        for parent in &interface.extends {
            if let Some(parent_fields) = self.resolve_parent_fields(parent, ctx) {
                for field in parent_fields {
                    merge_field(&mut merged, field);
                }
            }
        }
        for field in own.fields {
            merge_field(&mut merged, field);
        }

        TypeShape::Object(merged)
    }

    /// Resolve one `extends` clause to its full field list, if it refers
    /// to an object-shaped declaration.
    fn resolve_parent_fields(
        &mut self,
        parent: &'g TsExprWithTypeArgs,
        ctx: &ResolveCtx<'g>,
    ) -> Option<Vec<FieldShape>> {
        let Expr::Ident(ident) = parent.expr.as_ref() else {
            return None;
        };
        let shape =
            self.resolve_reference(ctx, ident.sym.as_ref(), parent.type_args.as_deref(), true);
        match shape {
            TypeShape::Object(object) => Some(object.fields),
            _ => None,
        }
    }

    fn resolve_members(
        &mut self,
        members: &'g [TsTypeElement],
        ctx: &ResolveCtx<'g>,
    ) -> ObjectShape {
        let mut fields = Vec::new();

        for member in members {
            let TsTypeElement::TsPropertySignature(property) = member else {
                continue;
            };
            let Some(name) = prop_key_name(&property.key) else {
                continue;
            };

            let (shape, metadata) = match property.type_ann.as_deref() {
                Some(type_ann) => self.resolve_annotated_inner(type_ann.type_ann.as_ref(), ctx),
                None => (TypeShape::Unknown, None),
            };

            fields.push(build_field(name, shape, property.optional, metadata));
        }

        ObjectShape { fields }
    }

    fn resolve_class(&mut self, class: &'g Class, ctx: &ResolveCtx<'g>) -> ObjectShape {
        let mut merged = ObjectShape::default();

        // The superclass contributes its fields first
        if let Some(Expr::Ident(ident)) = class.super_class.as_deref() {
            let shape = self.resolve_reference(
                ctx,
                ident.sym.as_ref(),
                class.super_type_params.as_deref(),
                true,
            );
            if let TypeShape::Object(object) = shape {
                for field in object.fields {
                    merge_field(&mut merged, field);
                }
            }
        }

        for member in &class.body {
            match member {
                // Static members are not part of instance values
                ClassMember::ClassProp(prop) if !prop.is_static => {
                    let Some(name) = class_prop_name(&prop.key) else {
                        continue;
                    };
                    let (shape, metadata) = match prop.type_ann.as_deref() {
                        Some(type_ann) => {
                            self.resolve_annotated_inner(type_ann.type_ann.as_ref(), ctx)
                        }
                        None => (TypeShape::Unknown, None),
                    };
                    merge_field(
                        &mut merged,
                        build_field(name, shape, prop.is_optional, metadata),
                    );
                }
                ClassMember::Constructor(constructor) => {
                    // `constructor(public name: string)` parameter properties
                    for param in &constructor.params {
                        let ParamOrTsParamProp::TsParamProp(param_prop) = param else {
                            continue;
                        };
                        let TsParamPropParam::Ident(binding) = &param_prop.param else {
                            continue;
                        };
                        let (shape, metadata) = match binding.type_ann.as_deref() {
                            Some(type_ann) => {
                                self.resolve_annotated_inner(type_ann.type_ann.as_ref(), ctx)
                            }
                            None => (TypeShape::Unknown, None),
                        };
                        merge_field(
                            &mut merged,
                            build_field(binding.id.sym.to_string(), shape, false, metadata),
                        );
                    }
                }
                _ => {}
            }
        }

        merged
    }
}

/// Shapes registered as standalone schemas and referenced by `$ref`.
fn is_registrable(shape: &TypeShape) -> bool {
    matches!(
        shape,
        TypeShape::Object(_) | TypeShape::Enum(_) | TypeShape::Union(_) | TypeShape::Intersection(_)
    )
}

fn build_field(
    name: String,
    shape: TypeShape,
    optional_syntax: bool,
    metadata: Option<(MarkerKind, Annotation)>,
) -> FieldShape {
    let mut required = !optional_syntax;
    let mut format = None;
    let mut shape = shape;

    if let Some((kind, annotation)) = metadata {
        if required {
            required = annotation.required.unwrap_or_else(|| kind.default_required());
        }
        format = annotation.format;
        // A namespace on a field wrapper re-points the reference into that
        // namespace's registry group
        if let Some(namespace) = annotation.namespace {
            if let TypeShape::NamedRef {
                namespace: ref mut slot,
                ..
            } = shape
            {
                *slot = Some(namespace);
            }
        }
    }

    FieldShape {
        name,
        shape,
        required,
        format,
    }
}

/// Insert `field`, replacing any same-named field in place so a subtype
/// member overrides its inherited counterpart without reordering.
fn merge_field(object: &mut ObjectShape, field: FieldShape) {
    match object.fields.iter_mut().find(|f| f.name == field.name) {
        Some(existing) => *existing = field,
        None => object.fields.push(field),
    }
}

fn resolve_enum_members(ts_enum: &swc_ecma_ast::TsEnumDecl) -> TypeShape {
    let mut values = Vec::new();
    let mut auto_value = 0.0;

    for member in &ts_enum.members {
        match member.init.as_deref() {
            Some(Expr::Lit(swc_ecma_ast::Lit::Str(s))) => {
                values.push(LiteralValue::Str(s.value.to_string()));
            }
            Some(Expr::Lit(swc_ecma_ast::Lit::Num(n))) => {
                values.push(LiteralValue::Num(n.value));
                auto_value = n.value + 1.0;
            }
            _ => {
                values.push(LiteralValue::Num(auto_value));
                auto_value += 1.0;
            }
        }
    }

    TypeShape::Enum(values)
}

fn prop_key_name(key: &Expr) -> Option<String> {
    match key {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Lit(swc_ecma_ast::Lit::Str(s)) => Some(s.value.to_string()),
        _ => None,
    }
}

fn class_prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn is_null_or_undefined(ty: &TsType) -> bool {
    matches!(
        ty,
        TsType::TsKeywordType(keyword) if matches!(
            keyword.kind,
            TsKeywordTypeKind::TsNullKeyword | TsKeywordTypeKind::TsUndefinedKeyword
        )
    )
}

fn literal_value(ty: &TsType) -> Option<LiteralValue> {
    match ty {
        TsType::TsLitType(lit) => match &lit.lit {
            TsLit::Str(s) => Some(LiteralValue::Str(s.value.to_string())),
            TsLit::Number(n) => Some(LiteralValue::Num(n.value)),
            _ => None,
        },
        _ => None,
    }
}

/// Render generic arguments into a stable cache-key fragment. Arguments
/// are qualified by the calling module so equal spellings from different
/// modules never collide.
fn args_key(type_args: Option<&TsTypeParamInstantiation>, ctx: &ResolveCtx<'_>) -> String {
    let Some(args) = type_args else {
        return String::new();
    };
    let rendered: Vec<String> = args
        .params
        .iter()
        .map(|arg| format!("{}@{}", type_text(arg.as_ref()), ctx.module.display()))
        .collect();
    rendered.join(",")
}

/// Compact textual rendering of a type, used only for cache keys.
fn type_text(ty: &TsType) -> String {
    match ty {
        TsType::TsKeywordType(keyword) => format!("{:?}", keyword.kind),
        TsType::TsTypeRef(type_ref) => {
            let name = match &type_ref.type_name {
                TsEntityName::Ident(ident) => ident.sym.to_string(),
                TsEntityName::TsQualifiedName(qualified) => {
                    format!("<qualified>.{}", qualified.right.sym)
                }
            };
            match type_ref.type_params.as_deref() {
                Some(args) => {
                    let inner: Vec<String> =
                        args.params.iter().map(|a| type_text(a.as_ref())).collect();
                    format!("{}<{}>", name, inner.join(","))
                }
                None => name,
            }
        }
        TsType::TsArrayType(array) => format!("{}[]", type_text(array.elem_type.as_ref())),
        TsType::TsLitType(lit) => match &lit.lit {
            TsLit::Str(s) => format!("'{}'", s.value),
            TsLit::Number(n) => format!("{}", n.value),
            TsLit::Bool(b) => format!("{}", b.value),
            _ => "?".to_string(),
        },
        TsType::TsUnionOrIntersectionType(union_or_intersection) => {
            use swc_ecma_ast::TsUnionOrIntersectionType::*;
            match union_or_intersection {
                TsUnionType(union) => union
                    .types
                    .iter()
                    .map(|t| type_text(t.as_ref()))
                    .collect::<Vec<_>>()
                    .join("|"),
                TsIntersectionType(intersection) => intersection
                    .types
                    .iter()
                    .map(|t| type_text(t.as_ref()))
                    .collect::<Vec<_>>()
                    .join("&"),
            }
        }
        _ => "?".to_string(),
    }
}
