use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use swc_ecma_ast::{
    BlockStmt, BlockStmtOrExpr, CallExpr, Callee, Decl, DefaultDecl, Expr, Lit, Module,
    ModuleDecl, ModuleItem, ObjectLit, Pat, Prop, PropName, PropOrSpread, Stmt, TsEntityName,
    TsInterfaceDecl, TsPropertySignature, TsType, TsTypeElement, TsUnionOrIntersectionType,
    VarDecl, VarDeclOrExpr, VarDeclarator,
};

use crate::error::Result;
use crate::graph::{ModuleGraph, SourceModule, TypeDeclaration};
use crate::schema_generator::{example_ref, Schema, SchemaGenerator};
use crate::type_resolver::{Annotation, MarkerKind};

/// Media type used wherever a route or wrapper does not pick one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// HTTP methods a route declaration may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Parses the `method` route option, case-insensitively.
    pub fn parse(name: &str) -> Option<HttpMethod> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Lowercase name, as used for path item keys.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

/// A route declaration extracted from an entry module.
#[derive(Debug, Clone)]
pub struct ExtractedRoute {
    /// Path template exactly as written in the route options, e.g. `/user/{id}`
    pub path: String,
    pub method: HttpMethod,
    /// Tags from the route options; empty when none were given
    pub tags: Vec<String>,
    pub parameters: Vec<ExtractedParameter>,
    pub request_body: Option<ExtractedBody>,
    /// Declared responses in source order
    pub responses: Vec<ExtractedResponse>,
}

/// A request parameter discovered through a marker wrapper on a property
/// of the handler's request type.
#[derive(Debug, Clone)]
pub struct ExtractedParameter {
    /// Property name the wrapper was attached to
    pub name: String,
    /// OpenAPI location: `path`, `query` or `header`
    pub location: String,
    pub schema: Schema,
    pub required: bool,
}

/// A request body discovered through a body wrapper.
#[derive(Debug, Clone)]
pub struct ExtractedBody {
    pub schema: Schema,
    pub required: bool,
    pub media_type: String,
}

/// One declared response of a route handler.
#[derive(Debug, Clone)]
pub struct ExtractedResponse {
    /// Status code as written in the source, e.g. `200`
    pub status: String,
    /// Description text; absent when the declaration names none
    pub description: Option<String>,
    pub media_type: String,
    /// Schema of the response value; `None` for `null` responses
    pub schema: Option<Schema>,
    /// `$ref` pointer into `components.examples`, when an example is named
    pub example: Option<String>,
}

/// Finds route declarations in the entry modules and turns each into an
/// [`ExtractedRoute`].
///
/// A route declaration is any call to the `Path` wrapper (with or without
/// the `Lil` prefix), wherever it appears in an entry module. The wrapped
/// handler is never executed; parameters and the request body come from
/// the wrapper markers on its request parameter type, and responses come
/// from the `Response` calls inside its body.
pub struct OperationExtractor<'a, 'g> {
    graph: &'g ModuleGraph,
    generator: &'a mut SchemaGenerator<'g>,
}

/// Where a handler-local variable gets its type from.
enum LocalType<'g> {
    /// An explicit annotation or cast, e.g. `const u: User` or `{} as User`
    Annotated(&'g TsType),
    /// Another identifier, e.g. `new User()` or an aliasing `const b = a`
    Named(String),
}

impl<'a, 'g> OperationExtractor<'a, 'g> {
    pub fn new(graph: &'g ModuleGraph, generator: &'a mut SchemaGenerator<'g>) -> Self {
        debug!("Initializing OperationExtractor");
        OperationExtractor { graph, generator }
    }

    /// Extracts every route declared in the entry modules, in entry order
    /// then source order. Modules reachable only through imports contribute
    /// types, never routes.
    pub fn extract(&mut self) -> Result<Vec<ExtractedRoute>> {
        let mut routes = Vec::new();
        for root in self.graph.roots() {
            let module = match self.graph.get(root) {
                Some(module) => module,
                None => continue,
            };
            let sink = AstSink::collect_module(&module.syntax_tree);
            let route_calls: Vec<&CallExpr> = sink
                .calls
                .iter()
                .copied()
                .filter(|call| call_name(call).map_or(false, is_route_marker))
                .collect();
            debug!(
                "Found {} route call(s) in {}",
                route_calls.len(),
                root.display()
            );
            for call in route_calls {
                if let Some(route) = self.extract_route(module, call)? {
                    routes.push(route);
                }
            }
        }
        Ok(routes)
    }

    fn extract_route(
        &mut self,
        module: &'g SourceModule,
        call: &'g CallExpr,
    ) -> Result<Option<ExtractedRoute>> {
        let module_path = module.canonical_path.as_path();
        if call.args.len() < 2 {
            warn!(
                "Skipping route call without handler and options in {}",
                module_path.display()
            );
            return Ok(None);
        }
        let handler = unwrap_parens(&call.args[0].expr);
        let options = match unwrap_parens(&call.args[call.args.len() - 1].expr) {
            Expr::Object(object) => object,
            _ => {
                warn!(
                    "Skipping route call whose options are not an object literal in {}",
                    module_path.display()
                );
                return Ok(None);
            }
        };

        let path = match object_prop(options, "path").and_then(string_value) {
            Some(path) => path,
            None => {
                warn!(
                    "Skipping route call without a path option in {}",
                    module_path.display()
                );
                return Ok(None);
            }
        };
        let method_text = match object_prop(options, "method").and_then(string_value) {
            Some(method) => method,
            None => {
                warn!("Skipping route {} without a method option", path);
                return Ok(None);
            }
        };
        let method = match HttpMethod::parse(&method_text) {
            Some(method) => method,
            None => {
                warn!(
                    "Skipping route {} with unsupported method '{}'",
                    path, method_text
                );
                return Ok(None);
            }
        };
        let tags = object_prop(options, "tags")
            .map(string_array)
            .unwrap_or_default();

        debug!("Extracting route {} {}", method.as_str(), path);

        let mut parameters = Vec::new();
        let mut request_body = None;
        if let Some(request_type) = handler_request_type(handler) {
            let mut visited = HashSet::new();
            self.walk_request_type(
                module_path,
                request_type,
                &mut parameters,
                &mut request_body,
                &mut visited,
            )?;
        }

        let sink = AstSink::collect_expr(handler);
        let locals = local_types(&sink.locals);
        let mut responses = Vec::new();
        for response_call in sink
            .calls
            .iter()
            .copied()
            .filter(|call| call_name(call).map_or(false, is_response_marker))
        {
            if let Some(response) = self.extract_response(module_path, response_call, &locals)? {
                responses.push(response);
            }
        }

        Ok(Some(ExtractedRoute {
            path,
            method,
            tags,
            parameters,
            request_body,
            responses,
        }))
    }

    /// Walks a request type looking for wrapper-marked properties. Named
    /// references are followed through the graph, and generic arguments are
    /// scanned too, so `Request<AnimalsRequest>` picks up the markers on
    /// `AnimalsRequest` even when `Request` itself is an external type.
    fn walk_request_type(
        &mut self,
        module: &'g Path,
        ty: &'g TsType,
        parameters: &mut Vec<ExtractedParameter>,
        request_body: &mut Option<ExtractedBody>,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Result<()> {
        match ty {
            TsType::TsTypeLit(literal) => {
                for member in &literal.members {
                    if let TsTypeElement::TsPropertySignature(property) = member {
                        self.walk_request_property(
                            module,
                            property,
                            parameters,
                            request_body,
                            visited,
                        )?;
                    }
                }
            }
            TsType::TsParenthesizedType(paren) => {
                self.walk_request_type(module, &paren.type_ann, parameters, request_body, visited)?;
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
                intersection,
            )) => {
                for part in &intersection.types {
                    self.walk_request_type(module, part, parameters, request_body, visited)?;
                }
            }
            TsType::TsTypeRef(reference) => {
                if let TsEntityName::Ident(ident) = &reference.type_name {
                    let name = ident.sym.as_ref();
                    if let Some(kind) = MarkerKind::from_name(name) {
                        // A wrapper used directly as the request type can
                        // only contribute a body; parameter wrappers need an
                        // enclosing property to name them.
                        if kind == MarkerKind::Body {
                            let (schema, metadata) =
                                self.generator.schema_for_annotated(module, ty)?;
                            if let Some((_, annotation)) = metadata {
                                *request_body = Some(body_from(schema, &annotation));
                            }
                        } else {
                            warn!("Ignoring {} wrapper outside a named property", name);
                        }
                        return Ok(());
                    }
                    self.walk_request_name(module, name, parameters, request_body, visited)?;
                    if let Some(args) = &reference.type_params {
                        for arg in &args.params {
                            self.walk_request_type(
                                module,
                                arg,
                                parameters,
                                request_body,
                                visited,
                            )?;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Follows a named request type to its declaration and walks it.
    fn walk_request_name(
        &mut self,
        module: &'g Path,
        name: &str,
        parameters: &mut Vec<ExtractedParameter>,
        request_body: &mut Option<ExtractedBody>,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Result<()> {
        let found = match self.graph.find_declaration(module, name) {
            Some(found) => found,
            None => return Ok(()),
        };
        let key = (found.module.canonical_path.clone(), name.to_string());
        if !visited.insert(key) {
            return Ok(());
        }
        let decl_path = found.module.canonical_path.as_path();
        match found.decl {
            TypeDeclaration::Interface(interface) => {
                self.walk_request_interface(decl_path, interface, parameters, request_body, visited)
            }
            TypeDeclaration::Alias(alias) => self.walk_request_type(
                decl_path,
                &alias.type_ann,
                parameters,
                request_body,
                visited,
            ),
            _ => Ok(()),
        }
    }

    fn walk_request_interface(
        &mut self,
        module: &'g Path,
        interface: &'g TsInterfaceDecl,
        parameters: &mut Vec<ExtractedParameter>,
        request_body: &mut Option<ExtractedBody>,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Result<()> {
        for parent in &interface.extends {
            if let Expr::Ident(parent_ident) = parent.expr.as_ref() {
                self.walk_request_name(
                    module,
                    parent_ident.sym.as_ref(),
                    parameters,
                    request_body,
                    visited,
                )?;
            }
        }
        for member in &interface.body.body {
            if let TsTypeElement::TsPropertySignature(property) = member {
                self.walk_request_property(module, property, parameters, request_body, visited)?;
            }
        }
        Ok(())
    }

    /// Inspects one request property: a wrapper becomes a parameter or the
    /// request body, anything structured is recursed into, and the wrapper
    /// metadata decides requiredness, namespace and format.
    fn walk_request_property(
        &mut self,
        module: &'g Path,
        property: &'g TsPropertySignature,
        parameters: &mut Vec<ExtractedParameter>,
        request_body: &mut Option<ExtractedBody>,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Result<()> {
        let ty = match &property.type_ann {
            Some(annotation) => annotation.type_ann.as_ref(),
            None => return Ok(()),
        };
        let name = match prop_key(&property.key) {
            Some(name) => name,
            None => return Ok(()),
        };

        if let Some(kind) = marker_kind_of(ty) {
            let (schema, metadata) = self.generator.schema_for_annotated(module, ty)?;
            let annotation = metadata.map(|(_, annotation)| annotation).unwrap_or_default();
            match kind {
                MarkerKind::Body => {
                    *request_body = Some(body_from(schema, &annotation));
                }
                MarkerKind::RequiredProp => {}
                _ => {
                    if let Some(location) = kind.location() {
                        // Route parameters are required no matter what the
                        // wrapper says.
                        let required = if kind == MarkerKind::Route {
                            true
                        } else {
                            annotation.required.unwrap_or_else(|| kind.default_required())
                        };
                        parameters.push(ExtractedParameter {
                            name,
                            location: location.to_string(),
                            schema,
                            required,
                        });
                    }
                }
            }
            return Ok(());
        }

        match ty {
            TsType::TsTypeLit(_)
            | TsType::TsTypeRef(_)
            | TsType::TsParenthesizedType(_)
            | TsType::TsUnionOrIntersectionType(_) => {
                self.walk_request_type(module, ty, parameters, request_body, visited)
            }
            _ => Ok(()),
        }
    }

    fn extract_response(
        &mut self,
        module: &'g Path,
        call: &'g CallExpr,
        locals: &HashMap<String, LocalType<'g>>,
    ) -> Result<Option<ExtractedResponse>> {
        if call.args.len() < 2 {
            warn!("Skipping response call without value and options");
            return Ok(None);
        }
        let options = match unwrap_parens(&call.args[call.args.len() - 1].expr) {
            Expr::Object(object) => object,
            _ => {
                warn!("Skipping response call whose options are not an object literal");
                return Ok(None);
            }
        };
        let status = match object_prop(options, "statusCode").and_then(status_text) {
            Some(status) => status,
            None => {
                warn!("Skipping response without a statusCode option");
                return Ok(None);
            }
        };
        let description = object_prop(options, "description").and_then(string_value);
        let namespace = object_prop(options, "namespace").and_then(string_value);
        let media_type = object_prop(options, "mediaType")
            .and_then(string_value)
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
        let example = object_prop(options, "example")
            .and_then(string_value)
            .map(|name| example_ref(namespace.as_deref(), &name));

        let schema =
            self.response_schema(module, &call.args[0].expr, namespace.as_deref(), locals)?;

        Ok(Some(ExtractedResponse {
            status,
            description,
            media_type,
            schema,
            example,
        }))
    }

    /// Derives the schema of a response value expression. Recognized forms
    /// are `new T()`, a cast, a local identifier traced back to one of
    /// those, and `null` (no schema). Anything else yields no schema.
    fn response_schema(
        &mut self,
        module: &'g Path,
        value: &'g Expr,
        namespace: Option<&str>,
        locals: &HashMap<String, LocalType<'g>>,
    ) -> Result<Option<Schema>> {
        match unwrap_parens(value) {
            Expr::Lit(Lit::Null(_)) => Ok(None),
            Expr::Ident(ident) if ident.sym.as_ref() == "undefined" => Ok(None),
            Expr::New(new_expr) => match unwrap_parens(&new_expr.callee) {
                Expr::Ident(ident) => Ok(Some(self.generator.schema_for_ident(
                    module,
                    ident.sym.as_ref(),
                    namespace,
                )?)),
                _ => {
                    warn!("Skipping schema for constructed response value without a plain name");
                    Ok(None)
                }
            },
            Expr::TsAs(as_expr) => Ok(Some(self.generator.schema_for_type(
                module,
                &as_expr.type_ann,
                namespace,
            )?)),
            Expr::TsTypeAssertion(assertion) => Ok(Some(self.generator.schema_for_type(
                module,
                &assertion.type_ann,
                namespace,
            )?)),
            Expr::Ident(ident) => {
                self.traced_schema(module, ident.sym.as_ref(), namespace, locals)
            }
            _ => {
                warn!("Skipping schema for unsupported response value expression");
                Ok(None)
            }
        }
    }

    /// Traces a response identifier through the handler's local bindings to
    /// an annotated type or a constructed name.
    fn traced_schema(
        &mut self,
        module: &'g Path,
        name: &str,
        namespace: Option<&str>,
        locals: &HashMap<String, LocalType<'g>>,
    ) -> Result<Option<Schema>> {
        let mut current = name.to_string();
        // Alias chains are short in practice; the bound guards against
        // `const a = b; const b = a;` style loops.
        for _ in 0..8 {
            match locals.get(&current) {
                Some(LocalType::Annotated(ty)) => {
                    return Ok(Some(self.generator.schema_for_type(module, *ty, namespace)?));
                }
                Some(LocalType::Named(next)) => {
                    if *next == current {
                        break;
                    }
                    current = next.clone();
                }
                None => break,
            }
        }
        Ok(Some(self.generator.schema_for_ident(
            module, &current, namespace,
        )?))
    }
}

fn body_from(schema: Schema, annotation: &Annotation) -> ExtractedBody {
    ExtractedBody {
        schema,
        required: annotation.required.unwrap_or(true),
        media_type: annotation
            .media_type
            .clone()
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string()),
    }
}

/// The type annotation of the handler's first parameter, when it has one.
fn handler_request_type(handler: &Expr) -> Option<&TsType> {
    let param = match handler {
        Expr::Arrow(arrow) => arrow.params.first()?,
        Expr::Fn(fn_expr) => &fn_expr.function.params.first()?.pat,
        _ => return None,
    };
    match param {
        Pat::Ident(binding) => binding
            .type_ann
            .as_ref()
            .map(|annotation| annotation.type_ann.as_ref()),
        _ => None,
    }
}

fn marker_kind_of(ty: &TsType) -> Option<MarkerKind> {
    if let TsType::TsTypeRef(reference) = ty {
        if let TsEntityName::Ident(ident) = &reference.type_name {
            return MarkerKind::from_name(ident.sym.as_ref());
        }
    }
    None
}

fn call_name(call: &CallExpr) -> Option<&str> {
    match &call.callee {
        Callee::Expr(callee) => match callee.as_ref() {
            Expr::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

fn is_route_marker(name: &str) -> bool {
    name.strip_prefix("Lil").unwrap_or(name) == "Path"
}

fn is_response_marker(name: &str) -> bool {
    name.strip_prefix("Lil").unwrap_or(name) == "Response"
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        _ => expr,
    }
}

fn prop_key(key: &Expr) -> Option<String> {
    match key {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Lit(Lit::Str(text)) => Some(text.value.to_string()),
        _ => None,
    }
}

/// Looks up a property by name in an object literal.
fn object_prop<'e>(object: &'e ObjectLit, name: &str) -> Option<&'e Expr> {
    object.props.iter().find_map(|prop| match prop {
        PropOrSpread::Prop(prop) => match prop.as_ref() {
            Prop::KeyValue(key_value) => {
                let key = match &key_value.key {
                    PropName::Ident(ident) => ident.sym.as_ref(),
                    PropName::Str(text) => text.value.as_ref(),
                    _ => return None,
                };
                if key == name {
                    Some(key_value.value.as_ref())
                } else {
                    None
                }
            }
            _ => None,
        },
        _ => None,
    })
}

fn string_value(expr: &Expr) -> Option<String> {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Str(text)) => Some(text.value.to_string()),
        _ => None,
    }
}

fn string_array(expr: &Expr) -> Vec<String> {
    match unwrap_parens(expr) {
        Expr::Array(array) => array
            .elems
            .iter()
            .flatten()
            .filter_map(|element| string_value(&element.expr))
            .collect(),
        _ => Vec::new(),
    }
}

/// Status codes keep their source text so `200` never becomes `200.0`.
fn status_text(expr: &Expr) -> Option<String> {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Num(number)) => Some(
            number
                .raw
                .as_ref()
                .map(|raw| raw.to_string())
                .unwrap_or_else(|| (number.value as i64).to_string()),
        ),
        Expr::Lit(Lit::Str(text)) => Some(text.value.to_string()),
        _ => None,
    }
}

/// Builds the local binding table for a handler body. Shadowing keeps the
/// later declaration, matching evaluation order well enough for tracing.
fn local_types<'g>(declarators: &[&'g VarDeclarator]) -> HashMap<String, LocalType<'g>> {
    let mut locals = HashMap::new();
    for declarator in declarators {
        let binding = match &declarator.name {
            Pat::Ident(binding) => binding,
            _ => continue,
        };
        let name = binding.id.sym.to_string();
        if let Some(annotation) = &binding.type_ann {
            locals.insert(name, LocalType::Annotated(&annotation.type_ann));
            continue;
        }
        let init = match &declarator.init {
            Some(init) => unwrap_parens(init),
            None => continue,
        };
        match init {
            Expr::TsAs(as_expr) => {
                locals.insert(name, LocalType::Annotated(&as_expr.type_ann));
            }
            Expr::TsTypeAssertion(assertion) => {
                locals.insert(name, LocalType::Annotated(&assertion.type_ann));
            }
            Expr::New(new_expr) => {
                if let Expr::Ident(ident) = unwrap_parens(&new_expr.callee) {
                    locals.insert(name, LocalType::Named(ident.sym.to_string()));
                }
            }
            Expr::Ident(ident) => {
                locals.insert(name, LocalType::Named(ident.sym.to_string()));
            }
            _ => {}
        }
    }
    locals
}

/// Calls and local variable declarations gathered from one subtree.
#[derive(Default)]
struct AstSink<'g> {
    calls: Vec<&'g CallExpr>,
    locals: Vec<&'g VarDeclarator>,
}

impl<'g> AstSink<'g> {
    fn collect_module(module: &'g Module) -> Self {
        let mut sink = AstSink::default();
        for item in &module.body {
            walk_module_item(item, &mut sink);
        }
        sink
    }

    fn collect_expr(expr: &'g Expr) -> Self {
        let mut sink = AstSink::default();
        walk_expr(expr, &mut sink);
        sink
    }
}

fn walk_module_item<'g>(item: &'g ModuleItem, sink: &mut AstSink<'g>) {
    match item {
        ModuleItem::Stmt(stmt) => walk_stmt(stmt, sink),
        ModuleItem::ModuleDecl(decl) => match decl {
            ModuleDecl::ExportDefaultExpr(export) => walk_expr(&export.expr, sink),
            ModuleDecl::ExportDecl(export) => match &export.decl {
                Decl::Var(var) => walk_var(var, sink),
                Decl::Fn(function) => {
                    if let Some(body) = &function.function.body {
                        walk_block(body, sink);
                    }
                }
                _ => {}
            },
            ModuleDecl::ExportDefaultDecl(export) => {
                if let DefaultDecl::Fn(function) = &export.decl {
                    if let Some(body) = &function.function.body {
                        walk_block(body, sink);
                    }
                }
            }
            _ => {}
        },
    }
}

fn walk_block<'g>(block: &'g BlockStmt, sink: &mut AstSink<'g>) {
    for stmt in &block.stmts {
        walk_stmt(stmt, sink);
    }
}

fn walk_stmt<'g>(stmt: &'g Stmt, sink: &mut AstSink<'g>) {
    match stmt {
        Stmt::Block(block) => walk_block(block, sink),
        Stmt::Expr(expr) => walk_expr(&expr.expr, sink),
        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                walk_expr(arg, sink);
            }
        }
        Stmt::Decl(Decl::Var(var)) => walk_var(var, sink),
        Stmt::Decl(Decl::Fn(function)) => {
            if let Some(body) = &function.function.body {
                walk_block(body, sink);
            }
        }
        Stmt::If(branch) => {
            walk_expr(&branch.test, sink);
            walk_stmt(&branch.cons, sink);
            if let Some(alt) = &branch.alt {
                walk_stmt(alt, sink);
            }
        }
        Stmt::Throw(throw) => walk_expr(&throw.arg, sink),
        Stmt::Try(try_stmt) => {
            walk_block(&try_stmt.block, sink);
            if let Some(handler) = &try_stmt.handler {
                walk_block(&handler.body, sink);
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                walk_block(finalizer, sink);
            }
        }
        Stmt::While(loop_stmt) => {
            walk_expr(&loop_stmt.test, sink);
            walk_stmt(&loop_stmt.body, sink);
        }
        Stmt::DoWhile(loop_stmt) => {
            walk_stmt(&loop_stmt.body, sink);
            walk_expr(&loop_stmt.test, sink);
        }
        Stmt::For(loop_stmt) => {
            match &loop_stmt.init {
                Some(VarDeclOrExpr::VarDecl(var)) => walk_var(var, sink),
                Some(VarDeclOrExpr::Expr(expr)) => walk_expr(expr, sink),
                None => {}
            }
            if let Some(test) = &loop_stmt.test {
                walk_expr(test, sink);
            }
            if let Some(update) = &loop_stmt.update {
                walk_expr(update, sink);
            }
            walk_stmt(&loop_stmt.body, sink);
        }
        Stmt::ForIn(loop_stmt) => {
            walk_expr(&loop_stmt.right, sink);
            walk_stmt(&loop_stmt.body, sink);
        }
        Stmt::ForOf(loop_stmt) => {
            walk_expr(&loop_stmt.right, sink);
            walk_stmt(&loop_stmt.body, sink);
        }
        Stmt::Switch(switch) => {
            walk_expr(&switch.discriminant, sink);
            for case in &switch.cases {
                for stmt in &case.cons {
                    walk_stmt(stmt, sink);
                }
            }
        }
        Stmt::Labeled(labeled) => walk_stmt(&labeled.body, sink),
        _ => {}
    }
}

fn walk_var<'g>(var: &'g VarDecl, sink: &mut AstSink<'g>) {
    for declarator in &var.decls {
        sink.locals.push(declarator);
        if let Some(init) = &declarator.init {
            walk_expr(init, sink);
        }
    }
}

fn walk_expr<'g>(expr: &'g Expr, sink: &mut AstSink<'g>) {
    match expr {
        Expr::Call(call) => {
            sink.calls.push(call);
            if let Callee::Expr(callee) = &call.callee {
                walk_expr(callee, sink);
            }
            for arg in &call.args {
                walk_expr(&arg.expr, sink);
            }
        }
        Expr::New(new_expr) => {
            walk_expr(&new_expr.callee, sink);
            if let Some(args) = &new_expr.args {
                for arg in args {
                    walk_expr(&arg.expr, sink);
                }
            }
        }
        Expr::Array(array) => {
            for element in array.elems.iter().flatten() {
                walk_expr(&element.expr, sink);
            }
        }
        Expr::Object(object) => {
            for prop in &object.props {
                match prop {
                    PropOrSpread::Prop(prop) => {
                        if let Prop::KeyValue(key_value) = prop.as_ref() {
                            walk_expr(&key_value.value, sink);
                        }
                    }
                    PropOrSpread::Spread(spread) => walk_expr(&spread.expr, sink),
                }
            }
        }
        Expr::Paren(paren) => walk_expr(&paren.expr, sink),
        Expr::Arrow(arrow) => match arrow.body.as_ref() {
            BlockStmtOrExpr::BlockStmt(block) => walk_block(block, sink),
            BlockStmtOrExpr::Expr(body) => walk_expr(body, sink),
        },
        Expr::Fn(fn_expr) => {
            if let Some(body) = &fn_expr.function.body {
                walk_block(body, sink);
            }
        }
        Expr::Await(await_expr) => walk_expr(&await_expr.arg, sink),
        Expr::Assign(assign) => walk_expr(&assign.right, sink),
        Expr::Bin(binary) => {
            walk_expr(&binary.left, sink);
            walk_expr(&binary.right, sink);
        }
        Expr::Cond(cond) => {
            walk_expr(&cond.test, sink);
            walk_expr(&cond.cons, sink);
            walk_expr(&cond.alt, sink);
        }
        Expr::Seq(seq) => {
            for expr in &seq.exprs {
                walk_expr(expr, sink);
            }
        }
        Expr::Member(member) => walk_expr(&member.obj, sink),
        Expr::Unary(unary) => walk_expr(&unary.arg, sink),
        Expr::Tpl(template) => {
            for expr in &template.exprs {
                walk_expr(expr, sink);
            }
        }
        Expr::TsAs(as_expr) => walk_expr(&as_expr.expr, sink),
        Expr::TsTypeAssertion(assertion) => walk_expr(&assertion.expr, sink),
        Expr::TsNonNull(non_null) => walk_expr(&non_null.expr, sink),
        Expr::TsConstAssertion(const_assertion) => walk_expr(&const_assertion.expr, sink),
        _ => {}
    }
}
