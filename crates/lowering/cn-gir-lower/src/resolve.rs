//! Cross-module resolution of qualified type checks

use cn_gir::{GirKind, GirModule, TypeTarget};
use cn_raw::{ImportAlias, StructuralError, TranslateError};
use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use tracing::debug;

/// Read-only view of the set of modules known to this run
pub trait ModuleLookup {
    /// Whether a module with this qualified name exists
    fn contains_module(&self, qualified_name: &str) -> bool;
}

impl<S: BuildHasher> ModuleLookup for HashSet<String, S> {
    fn contains_module(&self, qualified_name: &str) -> bool {
        self.contains(qualified_name)
    }
}

impl ModuleLookup for BTreeSet<String> {
    fn contains_module(&self, qualified_name: &str) -> bool {
        self.contains(qualified_name)
    }
}

/// Rewrite every pending type check of `gir` into a qualified one
///
/// Returns the qualified names of the modules the checks refer to.
pub fn resolve_module(
    gir: &mut GirModule,
    imports: &[ImportAlias],
    modules: &impl ModuleLookup,
) -> Result<BTreeSet<String>, TranslateError> {
    let aliases: FxHashMap<&str, &str> = imports
        .iter()
        .map(|import| (import.alias.as_str(), import.module.as_str()))
        .collect();
    let mut referenced = BTreeSet::new();

    for id in gir.pending_type_checks() {
        let GirKind::TypeCheck { target, .. } = &mut gir.node_mut(id).kind else {
            continue;
        };
        let TypeTarget::Pending { alias, name } = target else {
            continue;
        };

        let Some(module) = aliases
            .get(alias.as_str())
            .copied()
            .filter(|module| modules.contains_module(module))
        else {
            return Err(StructuralError::UnresolvedTypeReference {
                alias: alias.clone(),
                name: name.clone(),
            }
            .into());
        };

        let qualified = format!("{module}.{name}");
        debug!(%qualified, "resolved type check");
        referenced.insert(module.to_string());
        *target = TypeTarget::Qualified(qualified);
    }

    ensure_resolved(gir)?;
    Ok(referenced)
}

/// Fail if any type check is still pending
pub fn ensure_resolved(gir: &GirModule) -> Result<(), TranslateError> {
    let Some(&id) = gir.pending_type_checks().first() else {
        return Ok(());
    };
    match gir.kind(id) {
        GirKind::TypeCheck {
            target: TypeTarget::Pending { alias, name },
            ..
        } => Err(StructuralError::PendingTypeReference {
            alias: alias.clone(),
            name: name.clone(),
        }
        .into()),
        _ => Ok(()),
    }
}
