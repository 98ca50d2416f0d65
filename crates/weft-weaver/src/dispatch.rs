//! Per-module transformer dispatch

use crate::classify::CategorizedTypes;
use crate::error::TransformError;
use crate::transform::{Transformer, WeaveContext};

/// Run the transformer over a module's classified types
///
/// Categories are woven in a fixed order: enumerations, interfaces, value
/// types, classes, then delegates. Value types may be used by classes and
/// delegates may take class-typed parameters, so each step only depends on
/// steps before it. Empty categories are skipped. The first failure stops
/// the remaining steps.
pub fn dispatch<T: Transformer + ?Sized>(
    transformer: &mut T,
    cx: &mut WeaveContext<'_>,
    types: &CategorizedTypes,
) -> Result<(), TransformError> {
    if !types.enums.is_empty() {
        transformer.weave_enums(cx, &types.enums)?;
    }
    if !types.interfaces.is_empty() {
        transformer.weave_interfaces(cx, &types.interfaces)?;
    }
    if !types.structs.is_empty() {
        transformer.weave_structs(cx, &types.structs)?;
    }
    if !types.classes.is_empty() {
        transformer.weave_classes(cx, &types.classes)?;
    }
    if !types.delegates.is_empty() || !types.multicast_delegates.is_empty() {
        transformer.weave_delegates(cx, &types.delegates, &types.multicast_delegates)?;
    }
    Ok(())
}
