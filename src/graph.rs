use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use swc_ecma_ast::{
    Class, Decl, DefaultDecl, ExportSpecifier, Expr, ImportSpecifier, Module, ModuleDecl,
    ModuleExportName, ModuleItem, Stmt, TsEnumDecl, TsInterfaceDecl, TsTypeAliasDecl,
};

use crate::error::Error;
use crate::parser::AstParser;

/// Options controlling module specifier resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolutionOptions {
    /// Path-alias table mapping a specifier prefix to a base directory
    /// (e.g. `@dtos` → `./src/dtos`). Longest prefix wins.
    pub aliases: IndexMap<String, PathBuf>,
    /// Abort traversal once more than this many files have been visited.
    pub max_files: Option<usize>,
}

/// Where an imported local name points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `import { X } from './y'` or `import { X as Z } from './y'`
    Named { source: PathBuf, name: String },
    /// `import X from './y'`
    Default { source: PathBuf },
    /// `import * as ns from './y'`
    Namespace { source: PathBuf },
}

/// What an exported name resolves to inside its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Declared in this module under the given local name
    Local(String),
    /// `export { X } from './y'` or `export { X as Z } from './y'`
    ReExport { source: PathBuf, name: String },
    /// `export { default as Z } from './y'`
    ReExportDefault { source: PathBuf },
}

/// A parsed source module together with its import/export tables.
///
/// Created once per unique resolved path and immutable after parse. The
/// binding tables are what later lets the type resolver follow a local name
/// used at a route call site back to the module that declares it.
#[derive(Debug)]
pub struct SourceModule {
    /// Canonical absolute path of the file
    pub canonical_path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: Module,
    /// (specifier text, resolved path) for every resolvable import edge
    pub imports: Vec<(String, PathBuf)>,
    /// Local name → import binding
    pub bindings: IndexMap<String, Binding>,
    /// Exported name → target; the default export is keyed as `default`
    pub exports: IndexMap<String, ExportTarget>,
    /// Sources of `export * from '...'` statements
    pub star_exports: Vec<PathBuf>,
}

/// A type declaration found somewhere in the graph.
#[derive(Debug, Clone, Copy)]
pub enum TypeDeclaration<'a> {
    Interface(&'a TsInterfaceDecl),
    Alias(&'a TsTypeAliasDecl),
    Enum(&'a TsEnumDecl),
    Class(&'a Class),
}

/// A declaration plus the module it lives in.
#[derive(Debug, Clone, Copy)]
pub struct FoundDeclaration<'a> {
    pub module: &'a SourceModule,
    pub decl: TypeDeclaration<'a>,
}

/// Closed module graph built from a set of entry files.
///
/// Built by a work-list traversal: each unvisited file is parsed exactly
/// once, its top-level import/export-from statements are scanned, and every
/// newly resolved specifier is pushed onto the work list. A visited set
/// keyed by canonical path guarantees termination on import cycles.
///
/// Modules are stored in discovery order, which is deterministic for a
/// fixed (sorted) entry list, so every later pipeline stage traverses them
/// in the same order on every run.
#[derive(Debug)]
pub struct ModuleGraph {
    modules: IndexMap<PathBuf, SourceModule>,
    roots: Vec<PathBuf>,
}

impl ModuleGraph {
    /// Builds the closed graph reachable from `roots`.
    ///
    /// A root file that cannot be read or parsed is a fatal error. Imported
    /// files that fail to parse, and relative specifiers that do not map to
    /// a file on disk, are logged as warnings and skipped; references into
    /// them later degrade to empty schemas. Bare (package) specifiers are
    /// treated as external library modules and never traversed.
    pub fn build(roots: &[PathBuf], options: &ResolutionOptions) -> Result<Self> {
        let parser = AstParser::new();
        let mut modules: IndexMap<PathBuf, SourceModule> = IndexMap::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut work_list: VecDeque<PathBuf> = VecDeque::new();
        let mut root_set: HashSet<PathBuf> = HashSet::new();

        let mut root_list: Vec<PathBuf> = Vec::new();
        for root in roots {
            let canonical = root
                .canonicalize()
                .with_context(|| format!("Missing entry file: {}", root.display()))?;
            if root_set.insert(canonical.clone()) {
                root_list.push(canonical.clone());
            }
            work_list.push_back(canonical);
        }

        while let Some(path) = work_list.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }

            if let Some(limit) = options.max_files {
                if visited.len() > limit {
                    return Err(Error::GraphLimitExceeded(limit).into());
                }
            }

            let parsed = match parser.parse_file(&path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    if root_set.contains(&path) {
                        return Err(e);
                    }
                    warn!("Skipping unparseable module {}: {}", path.display(), e);
                    continue;
                }
            };

            let scan = scan_module_items(&parsed.syntax_tree, &path, options);
            for unresolved in &scan.unresolved {
                warn!(
                    "{}",
                    Error::ResolutionError {
                        specifier: unresolved.clone(),
                        importer: path.clone(),
                    }
                );
            }
            for (_, resolved) in &scan.imports {
                work_list.push_back(resolved.clone());
            }

            debug!(
                "Visited module {} ({} import edges)",
                path.display(),
                scan.imports.len()
            );

            modules.insert(
                path.clone(),
                SourceModule {
                    canonical_path: path,
                    syntax_tree: parsed.syntax_tree,
                    imports: scan.imports,
                    bindings: scan.bindings,
                    exports: scan.exports,
                    star_exports: scan.star_exports,
                },
            );
        }

        Ok(ModuleGraph {
            modules,
            roots: root_list,
        })
    }

    pub fn get(&self, path: &Path) -> Option<&SourceModule> {
        self.modules.get(path)
    }

    /// Canonical paths of the entry modules, in the order they were given.
    /// Only these modules are scanned for route declarations.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn modules(&self) -> impl Iterator<Item = &SourceModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolves a local name used inside `module` to the declaration it
    /// refers to, following import and re-export chains across the graph.
    pub fn find_declaration(&self, module: &Path, name: &str) -> Option<FoundDeclaration<'_>> {
        let source_module = self.get(module)?;

        if let Some(decl) = find_local_declaration(source_module, name) {
            return Some(FoundDeclaration {
                module: source_module,
                decl,
            });
        }

        let mut seen = HashSet::new();
        match source_module.bindings.get(name)? {
            Binding::Named { source, name } => self.find_exported(source, name, &mut seen),
            Binding::Default { source } => self.find_exported(source, "default", &mut seen),
            // The namespace object itself is not a type
            Binding::Namespace { .. } => None,
        }
    }

    /// Resolves `ns.Member` where `ns` is a namespace import in `module`.
    pub fn find_namespace_member(
        &self,
        module: &Path,
        namespace: &str,
        member: &str,
    ) -> Option<FoundDeclaration<'_>> {
        let source_module = self.get(module)?;
        match source_module.bindings.get(namespace)? {
            Binding::Namespace { source } => {
                let mut seen = HashSet::new();
                self.find_exported(source, member, &mut seen)
            }
            _ => None,
        }
    }

    fn find_exported<'a>(
        &'a self,
        module: &Path,
        name: &str,
        seen: &mut HashSet<(PathBuf, String)>,
    ) -> Option<FoundDeclaration<'a>> {
        // Re-export chains can be cyclic in broken projects
        if !seen.insert((module.to_path_buf(), name.to_string())) {
            return None;
        }

        let source_module = self.get(module)?;

        if let Some(target) = source_module.exports.get(name) {
            return match target {
                ExportTarget::Local(local) => {
                    if let Some(decl) = find_local_declaration(source_module, local) {
                        return Some(FoundDeclaration {
                            module: source_module,
                            decl,
                        });
                    }
                    // `import { X } from './a'; export { X };` exports an
                    // import binding rather than a local declaration
                    match source_module.bindings.get(local)? {
                        Binding::Named { source, name } => self.find_exported(source, name, seen),
                        Binding::Default { source } => self.find_exported(source, "default", seen),
                        Binding::Namespace { .. } => None,
                    }
                }
                ExportTarget::ReExport { source, name } => self.find_exported(source, name, seen),
                ExportTarget::ReExportDefault { source } => {
                    self.find_exported(source, "default", seen)
                }
            };
        }

        for star_source in &source_module.star_exports {
            if let Some(found) = self.find_exported(star_source, name, seen) {
                return Some(found);
            }
        }

        None
    }
}

struct ScannedModule {
    imports: Vec<(String, PathBuf)>,
    bindings: IndexMap<String, Binding>,
    exports: IndexMap<String, ExportTarget>,
    star_exports: Vec<PathBuf>,
    unresolved: Vec<String>,
}

/// Scans only the top-level import/export statements of a module and
/// resolves their specifiers.
fn scan_module_items(
    module: &Module,
    module_path: &Path,
    options: &ResolutionOptions,
) -> ScannedModule {
    let module_dir = module_path.parent().unwrap_or(Path::new("."));

    let mut imports = Vec::new();
    let mut bindings = IndexMap::new();
    let mut exports = IndexMap::new();
    let mut star_exports = Vec::new();
    let mut unresolved = Vec::new();

    let mut resolve = |specifier: &str,
                       imports: &mut Vec<(String, PathBuf)>,
                       unresolved: &mut Vec<String>|
     -> Option<PathBuf> {
        match resolve_specifier(specifier, module_dir, options) {
            Resolution::File(path) => {
                imports.push((specifier.to_string(), path.clone()));
                Some(path)
            }
            Resolution::External => {
                debug!("External module specifier '{}'", specifier);
                None
            }
            Resolution::NotFound => {
                unresolved.push(specifier.to_string());
                None
            }
        }
    };

    for item in &module.body {
        let decl = match item {
            ModuleItem::ModuleDecl(decl) => decl,
            ModuleItem::Stmt(_) => continue,
        };

        match decl {
            ModuleDecl::Import(import_decl) => {
                let specifier = import_decl.src.value.as_ref();
                let Some(source) = resolve(specifier, &mut imports, &mut unresolved) else {
                    continue;
                };
                for item in &import_decl.specifiers {
                    match item {
                        ImportSpecifier::Named(named) => {
                            let original = named
                                .imported
                                .as_ref()
                                .map(export_name_text)
                                .unwrap_or_else(|| named.local.sym.to_string());
                            bindings.insert(
                                named.local.sym.to_string(),
                                Binding::Named {
                                    source: source.clone(),
                                    name: original,
                                },
                            );
                        }
                        ImportSpecifier::Default(default) => {
                            bindings.insert(
                                default.local.sym.to_string(),
                                Binding::Default {
                                    source: source.clone(),
                                },
                            );
                        }
                        ImportSpecifier::Namespace(namespace) => {
                            bindings.insert(
                                namespace.local.sym.to_string(),
                                Binding::Namespace {
                                    source: source.clone(),
                                },
                            );
                        }
                    }
                }
            }
            ModuleDecl::ExportNamed(named_export) => {
                let source = match &named_export.src {
                    Some(src) => resolve(src.value.as_ref(), &mut imports, &mut unresolved),
                    None => None,
                };
                for specifier in &named_export.specifiers {
                    let ExportSpecifier::Named(named) = specifier else {
                        continue;
                    };
                    let original = export_name_text(&named.orig);
                    let exported = named
                        .exported
                        .as_ref()
                        .map(export_name_text)
                        .unwrap_or_else(|| original.clone());
                    let target = match &source {
                        Some(source) if original == "default" => ExportTarget::ReExportDefault {
                            source: source.clone(),
                        },
                        Some(source) => ExportTarget::ReExport {
                            source: source.clone(),
                            name: original,
                        },
                        None => ExportTarget::Local(original),
                    };
                    exports.insert(exported, target);
                }
            }
            ModuleDecl::ExportAll(export_all) => {
                if let Some(source) =
                    resolve(export_all.src.value.as_ref(), &mut imports, &mut unresolved)
                {
                    star_exports.push(source);
                }
            }
            ModuleDecl::ExportDecl(export_decl) => {
                if let Some(name) = declared_type_name(&export_decl.decl) {
                    exports.insert(name.clone(), ExportTarget::Local(name));
                }
            }
            ModuleDecl::ExportDefaultDecl(default_decl) => {
                let local = match &default_decl.decl {
                    DefaultDecl::Class(class_expr) => class_expr
                        .ident
                        .as_ref()
                        .map(|i| i.sym.to_string())
                        .unwrap_or_else(|| "default".to_string()),
                    DefaultDecl::TsInterfaceDecl(interface) => interface.id.sym.to_string(),
                    DefaultDecl::Fn(_) => continue,
                };
                exports.insert("default".to_string(), ExportTarget::Local(local));
            }
            ModuleDecl::ExportDefaultExpr(default_expr) => {
                // `export default X` as an alias to a declaration above
                if let Expr::Ident(ident) = default_expr.expr.as_ref() {
                    exports.insert(
                        "default".to_string(),
                        ExportTarget::Local(ident.sym.to_string()),
                    );
                }
            }
            _ => {}
        }
    }

    ScannedModule {
        imports,
        bindings,
        exports,
        star_exports,
        unresolved,
    }
}

enum Resolution {
    File(PathBuf),
    External,
    NotFound,
}

/// Resolves an import specifier following the host module system's rules:
/// relative paths and configured aliases map onto the file system (trying
/// the literal path, then `.ts`/`.tsx`, then `index.ts`/`index.tsx` within
/// a directory); bare specifiers are external packages.
fn resolve_specifier(specifier: &str, module_dir: &Path, options: &ResolutionOptions) -> Resolution {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return match try_candidates(&module_dir.join(specifier)) {
            Some(path) => Resolution::File(path),
            None => Resolution::NotFound,
        };
    }

    // Longest alias prefix wins
    let mut best: Option<(&String, &PathBuf)> = None;
    for (prefix, target) in &options.aliases {
        if specifier == prefix || specifier.starts_with(&format!("{}/", prefix)) {
            match best {
                Some((current, _)) if current.len() >= prefix.len() => {}
                _ => best = Some((prefix, target)),
            }
        }
    }
    if let Some((prefix, target)) = best {
        let remainder = specifier[prefix.len()..].trim_start_matches('/');
        let base = if remainder.is_empty() {
            target.clone()
        } else {
            target.join(remainder)
        };
        return match try_candidates(&base) {
            Some(path) => Resolution::File(path),
            None => Resolution::NotFound,
        };
    }

    Resolution::External
}

fn try_candidates(base: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::with_capacity(5);
    if base.extension().is_some() {
        candidates.push(base.to_path_buf());
    }
    candidates.push(with_appended_extension(base, ".ts"));
    candidates.push(with_appended_extension(base, ".tsx"));
    candidates.push(base.join("index.ts"));
    candidates.push(base.join("index.tsx"));

    for candidate in candidates {
        if candidate.is_file() {
            if let Ok(canonical) = candidate.canonicalize() {
                return Some(canonical);
            }
        }
    }
    None
}

fn with_appended_extension(base: &Path, extension: &str) -> PathBuf {
    let mut os_string: OsString = base.as_os_str().to_os_string();
    os_string.push(extension);
    PathBuf::from(os_string)
}

fn export_name_text(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

fn declared_type_name(decl: &Decl) -> Option<String> {
    match decl {
        Decl::TsInterface(interface) => Some(interface.id.sym.to_string()),
        Decl::TsTypeAlias(alias) => Some(alias.id.sym.to_string()),
        Decl::TsEnum(ts_enum) => Some(ts_enum.id.sym.to_string()),
        Decl::Class(class_decl) => Some(class_decl.ident.sym.to_string()),
        _ => None,
    }
}

/// Finds a type declaration by local name inside a single module.
fn find_local_declaration<'a>(
    module: &'a SourceModule,
    name: &str,
) -> Option<TypeDeclaration<'a>> {
    for item in &module.syntax_tree.body {
        let found = match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => match_declaration(decl, name),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => {
                match_declaration(&export_decl.decl, name)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(default_decl)) => {
                match &default_decl.decl {
                    DefaultDecl::Class(class_expr) => {
                        let matches = name == "default"
                            || class_expr
                                .ident
                                .as_ref()
                                .map(|i| i.sym.as_ref() == name)
                                .unwrap_or(false);
                        if matches {
                            Some(TypeDeclaration::Class(class_expr.class.as_ref()))
                        } else {
                            None
                        }
                    }
                    DefaultDecl::TsInterfaceDecl(interface) => {
                        if name == "default" || interface.id.sym.as_ref() == name {
                            Some(TypeDeclaration::Interface(interface.as_ref()))
                        } else {
                            None
                        }
                    }
                    DefaultDecl::Fn(_) => None,
                }
            }
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn match_declaration<'a>(decl: &'a Decl, name: &str) -> Option<TypeDeclaration<'a>> {
    match decl {
        Decl::TsInterface(interface) if interface.id.sym.as_ref() == name => {
            Some(TypeDeclaration::Interface(interface.as_ref()))
        }
        Decl::TsTypeAlias(alias) if alias.id.sym.as_ref() == name => {
            Some(TypeDeclaration::Alias(alias.as_ref()))
        }
        Decl::TsEnum(ts_enum) if ts_enum.id.sym.as_ref() == name => {
            Some(TypeDeclaration::Enum(ts_enum.as_ref()))
        }
        Decl::Class(class_decl) if class_decl.ident.sym.as_ref() == name => {
            Some(TypeDeclaration::Class(class_decl.class.as_ref()))
        }
        _ => None,
    }
}
