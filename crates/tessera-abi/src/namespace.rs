//! # Type Namespace
//!
//! Compiles a validated schema into an immutable arena of concrete types:
//! one entry per builtin, struct, variant, and alias, keyed by declared name.
//! Struct entries carry their flattened codec pipeline (base fields
//! prepended, recursively); variant entries carry their arms in declared
//! order, which is the wire tag order.
//!
//! ## Construction Order
//!
//! Struct ids are reserved up front, then definitions are emitted in
//! dependency order using a ready-set loop: a struct is ready once every
//! struct it references (base or field) has been emitted. When no struct is
//! ready but some remain, the remaining batch is emitted as-is — their
//! references resolve through the pre-reserved ids, which is what makes
//! self-referential and mutually-recursive structs work. Only base
//! inheritance must stay acyclic, because flattening is eager.
//!
//! The finished namespace is shared behind an [`Arc`] and never mutated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tessera_scalars::{AbiValue, ByteCursor, Scalar, ScalarRegistry};

use crate::defs::{Abi, StructDef};
use crate::error::{BuildError, ConvertError, DecodeError, EncodeError, ResolveError};
use crate::fingerprint::AbiFingerprint;
use crate::resolve::{Modifier, ResolvedKind};
use crate::validate::validate;

/// Index of one entry in the namespace arena.
pub(crate) type TypeId = usize;

/// One field of a flattened struct pipeline.
pub(crate) struct FieldCodec {
    pub name: String,
    /// Modifier stack, outermost first.
    pub modifiers: Vec<Modifier>,
    pub leaf: TypeId,
}

pub(crate) struct StructType {
    pub name: String,
    /// Base fields first, own fields after, in wire order.
    pub pipeline: Vec<FieldCodec>,
}

pub(crate) struct VariantArm {
    /// The arm type as declared; structural tags use this spelling.
    pub declared: String,
    pub modifiers: Vec<Modifier>,
    pub leaf: TypeId,
    pub is_struct: bool,
}

pub(crate) struct VariantType {
    pub name: String,
    /// Declared order; position is the wire tag.
    pub arms: Vec<VariantArm>,
}

pub(crate) struct AliasType {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub leaf: TypeId,
}

pub(crate) enum TypeEntry {
    Scalar(Arc<dyn Scalar>),
    Struct(StructType),
    Variant(VariantType),
    Alias(AliasType),
}

impl TypeEntry {
    pub(crate) fn name(&self) -> &str {
        match self {
            TypeEntry::Scalar(s) => s.name(),
            TypeEntry::Struct(s) => &s.name,
            TypeEntry::Variant(v) => &v.name,
            TypeEntry::Alias(a) => &a.name,
        }
    }
}

pub(crate) struct NamespaceInner {
    abi: Abi,
    pub(crate) arena: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
}

/// A compiled, immutable type namespace.
#[derive(Clone)]
pub struct AbiNamespace {
    inner: Arc<NamespaceInner>,
}

/// A named type within a namespace, cheap to clone and hand around.
#[derive(Clone)]
pub struct TypeHandle {
    inner: Arc<NamespaceInner>,
    id: TypeId,
}

// ---------------------------------------------------------------------------
// construction
// ---------------------------------------------------------------------------

struct Builder<'a> {
    abi: &'a Abi,
    scalars: &'a ScalarRegistry,
    arena: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
    pipelines: HashMap<String, Vec<FieldCodec>>,
}

impl<'a> Builder<'a> {
    fn new(abi: &'a Abi, scalars: &'a ScalarRegistry) -> Self {
        Builder {
            abi,
            scalars,
            arena: Vec::new(),
            by_name: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    fn insert(&mut self, name: &str, entry: TypeEntry) -> TypeId {
        let id = self.arena.len();
        self.arena.push(entry);
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Resolve a type reference to its modifier stack and arena leaf.
    fn resolve_leaf(
        &self,
        name: &str,
    ) -> Result<(Vec<Modifier>, TypeId, ResolvedKind), BuildError> {
        let resolved = self.abi.resolve_type(name, self.scalars)?;
        let id = self
            .by_name
            .get(&resolved.resolved_name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownType(resolved.resolved_name.clone()))?;
        Ok((resolved.modifiers, id, resolved.kind))
    }

    fn register_scalars(&mut self) -> Result<(), BuildError> {
        let names: Vec<&'static str> = self.scalars.names().collect();
        for name in names {
            let scalar = self
                .scalars
                .get(name)
                .ok_or_else(|| ResolveError::UnknownType(name.to_owned()))?
                .clone();
            self.insert(name, TypeEntry::Scalar(scalar));
        }
        Ok(())
    }

    /// Reserve arena slots for every struct and variant so that references
    /// resolve before their definitions are emitted.
    fn reserve_declared(&mut self) {
        for sdef in &self.abi.structs {
            self.insert(
                &sdef.name,
                TypeEntry::Struct(StructType {
                    name: sdef.name.clone(),
                    pipeline: Vec::new(),
                }),
            );
        }
        for vdef in &self.abi.variants {
            self.insert(
                &vdef.name,
                TypeEntry::Variant(VariantType {
                    name: vdef.name.clone(),
                    arms: Vec::new(),
                }),
            );
        }
    }

    /// The set of struct names a struct needs emitted before itself.
    fn struct_deps(&self, sdef: &StructDef) -> Result<HashSet<String>, BuildError> {
        let mut deps = HashSet::new();
        if let Some(base) = sdef.base() {
            let resolved = self.abi.resolve_type(base, self.scalars)?;
            deps.insert(resolved.resolved_name);
        }
        for field in &sdef.fields {
            let resolved = self.abi.resolve_type(&field.type_name, self.scalars)?;
            if resolved.is_struct() {
                deps.insert(resolved.resolved_name);
            }
        }
        Ok(deps)
    }

    /// Flatten a struct's pipeline, prepending its base's pipeline.
    fn flatten(
        &mut self,
        sdef: &StructDef,
        active: &mut Vec<String>,
    ) -> Result<Vec<FieldCodec>, BuildError> {
        if let Some(cached) = self.pipelines.get(&sdef.name) {
            return Ok(cached
                .iter()
                .map(|f| FieldCodec {
                    name: f.name.clone(),
                    modifiers: f.modifiers.clone(),
                    leaf: f.leaf,
                })
                .collect());
        }
        if active.iter().any(|seen| seen == &sdef.name) {
            let mut path = active.clone();
            path.push(sdef.name.clone());
            return Err(BuildError::BaseCycle { path });
        }
        active.push(sdef.name.clone());

        let mut pipeline = Vec::new();
        if let Some(base) = sdef.base() {
            let resolved = self.abi.resolve_type(base, self.scalars)?;
            let base_def = self
                .abi
                .struct_named(&resolved.resolved_name)
                .ok_or_else(|| ResolveError::UnknownType(resolved.resolved_name.clone()))?
                .clone();
            pipeline = self.flatten(&base_def, active)?;
        }
        for field in &sdef.fields {
            let (modifiers, leaf, _) = self.resolve_leaf(&field.type_name)?;
            pipeline.push(FieldCodec {
                name: field.name.clone(),
                modifiers,
                leaf,
            });
        }

        active.pop();
        self.pipelines.insert(
            sdef.name.clone(),
            pipeline
                .iter()
                .map(|f| FieldCodec {
                    name: f.name.clone(),
                    modifiers: f.modifiers.clone(),
                    leaf: f.leaf,
                })
                .collect(),
        );
        Ok(pipeline)
    }

    /// Emit all struct definitions in dependency order.
    fn emit_structs(&mut self) -> Result<(), BuildError> {
        let mut deps: HashMap<String, HashSet<String>> = HashMap::new();
        for sdef in &self.abi.structs {
            deps.insert(sdef.name.clone(), self.struct_deps(sdef)?);
        }

        let mut pending: Vec<StructDef> = self.abi.structs.clone();
        let mut emitted: HashSet<String> = HashSet::new();
        while !pending.is_empty() {
            let ready: Vec<StructDef> = pending
                .iter()
                .filter(|s| {
                    deps[&s.name]
                        .iter()
                        .all(|d| emitted.contains(d) || d == &s.name)
                })
                .cloned()
                .collect();
            let batch = if ready.is_empty() {
                // recursive group: pre-reserved ids make forward refs valid
                tracing::debug!(
                    remaining = pending.len(),
                    "emitting recursive struct group as one batch"
                );
                std::mem::take(&mut pending)
            } else {
                pending.retain(|s| !ready.iter().any(|r| r.name == s.name));
                ready
            };
            for sdef in &batch {
                let mut active = Vec::new();
                let pipeline = self.flatten(sdef, &mut active)?;
                let id = self.by_name[&sdef.name];
                self.arena[id] = TypeEntry::Struct(StructType {
                    name: sdef.name.clone(),
                    pipeline,
                });
                emitted.insert(sdef.name.clone());
            }
        }
        Ok(())
    }

    fn emit_variants(&mut self) -> Result<(), BuildError> {
        for vdef in self.abi.variants.clone() {
            let mut arms = Vec::with_capacity(vdef.types.len());
            for declared in &vdef.types {
                let (modifiers, leaf, kind) = self.resolve_leaf(declared)?;
                arms.push(VariantArm {
                    declared: declared.clone(),
                    modifiers,
                    leaf,
                    is_struct: kind == ResolvedKind::Struct,
                });
            }
            let id = self.by_name[&vdef.name];
            self.arena[id] = TypeEntry::Variant(VariantType {
                name: vdef.name.clone(),
                arms,
            });
        }
        Ok(())
    }

    /// Remaining alias names become thin named wrappers over their leaf.
    fn emit_aliases(&mut self) -> Result<(), BuildError> {
        for alias in self.abi.types.clone() {
            if self.by_name.contains_key(&alias.new_type_name) {
                continue;
            }
            let (modifiers, leaf, _) = self.resolve_leaf(&alias.new_type_name)?;
            self.insert(
                &alias.new_type_name,
                TypeEntry::Alias(AliasType {
                    name: alias.new_type_name.clone(),
                    modifiers,
                    leaf,
                }),
            );
        }
        Ok(())
    }
}

impl AbiNamespace {
    /// Compile a schema against the standard scalar registry.
    pub fn build(abi: Abi) -> Result<Self, BuildError> {
        Self::build_with(abi, ScalarRegistry::standard())
    }

    /// Compile a schema against a caller-supplied scalar registry.
    pub fn build_with(abi: Abi, scalars: &ScalarRegistry) -> Result<Self, BuildError> {
        validate(&abi, scalars)?;
        let mut builder = Builder::new(&abi, scalars);
        builder.register_scalars()?;
        builder.reserve_declared();
        builder.emit_structs()?;
        builder.emit_variants()?;
        builder.emit_aliases()?;
        tracing::debug!(
            types = builder.arena.len(),
            fingerprint = %abi.fingerprint(),
            "namespace built"
        );
        let (arena, by_name) = (builder.arena, builder.by_name);
        Ok(AbiNamespace {
            inner: Arc::new(NamespaceInner {
                abi,
                arena,
                by_name,
            }),
        })
    }

    /// The schema this namespace was compiled from.
    pub fn abi(&self) -> &Abi {
        &self.inner.abi
    }

    /// The structural fingerprint of the compiled schema.
    pub fn fingerprint(&self) -> AbiFingerprint {
        self.inner.abi.fingerprint()
    }

    /// Look up a type by its declared (or builtin) name.
    pub fn get(&self, name: &str) -> Option<TypeHandle> {
        self.inner.by_name.get(name).map(|&id| TypeHandle {
            inner: Arc::clone(&self.inner),
            id,
        })
    }

    /// Look up a type, erroring with the requested name on a miss.
    pub fn require(&self, name: &str) -> Result<TypeHandle, ResolveError> {
        self.get(name)
            .ok_or_else(|| ResolveError::UnknownType(name.to_owned()))
    }

    /// The payload type of a declared action.
    pub fn action_type(&self, action: &str) -> Option<TypeHandle> {
        let adef = self.inner.abi.actions.iter().find(|a| a.name == action)?;
        self.get(&adef.type_name)
    }

    /// The row type of a declared table.
    pub fn table_type(&self, table: &str) -> Option<TypeHandle> {
        let tdef = self.inner.abi.tables.iter().find(|t| t.name == table)?;
        self.get(&tdef.type_name)
    }

    /// All names the namespace answers to, builtins included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.by_name.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for AbiNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbiNamespace")
            .field("types", &self.inner.arena.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// handles
// ---------------------------------------------------------------------------

impl TypeHandle {
    /// The declared name of this type.
    pub fn name(&self) -> &str {
        self.inner.arena[self.id].name()
    }

    /// Encode a value to its wire bytes.
    pub fn encode(&self, value: &AbiValue) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.inner.encode_id(self.id, value, &mut out)?;
        Ok(out)
    }

    /// Decode a complete buffer, rejecting trailing bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<AbiValue, DecodeError> {
        let mut cur = ByteCursor::new(bytes);
        let value = self.inner.decode_id(self.id, &mut cur)?;
        if !cur.is_empty() {
            return Err(DecodeError::TrailingBytes {
                site: self.name().to_owned(),
                trailing: cur.remaining(),
            });
        }
        Ok(value)
    }

    /// Decode from a cursor, leaving any following bytes unread.
    ///
    /// Extension fields still consume the rest of the buffer; embed types
    /// carrying extensions last when framing multiple values.
    pub fn decode_from(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, DecodeError> {
        self.inner.decode_id(self.id, cur)
    }

    /// Map a canonical value to the structural interchange form.
    pub fn to_structural(&self, value: &AbiValue) -> Result<AbiValue, ConvertError> {
        self.inner.to_structural_id(self.id, value)
    }

    /// Validate an interchange value and normalize it to canonical form.
    pub fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ConvertError> {
        self.inner.from_structural_id(self.id, value)
    }
}

impl std::fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHandle").field("name", &self.name()).finish()
    }
}
