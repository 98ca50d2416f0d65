//! Transformer seam and the registration transformer
//!
//! A [`Transformer`] rewrites one category of types at a time. The
//! dispatcher calls it once per category, in a fixed order, with the
//! indices of the module's types in that category.

use crate::classify::Category;
use crate::error::TransformError;
use crate::metadata::{ApiMetadata, FieldMetadata, SourceLocation, TypeMetadata};
use crate::resolver::ModuleResolver;
use weft_bytecode::{Module, Registration, SymbolTable, TypeDef};

/// Everything a transformer may read or mutate while weaving one module
pub struct WeaveContext<'a> {
    /// Module being rewritten
    pub module: &'a mut Module,
    /// Metadata record for the module
    pub metadata: &'a mut ApiMetadata,
    /// Batch search path
    pub resolver: &'a ModuleResolver,
    /// Symbol data attached to the module
    pub symbols: Option<&'a SymbolTable>,
}

impl WeaveContext<'_> {
    /// Type at `index`, or an error naming the module
    pub fn type_at(&self, index: usize) -> Result<&TypeDef, TransformError> {
        self.module.types.get(index).ok_or_else(|| {
            TransformError::Failed(format!(
                "type index {} out of range in {}",
                index,
                self.module.name()
            ))
        })
    }
}

/// Category-specific weaving steps
///
/// Every step defaults to doing nothing.
pub trait Transformer {
    /// Weave enumerations
    fn weave_enums(
        &mut self,
        _cx: &mut WeaveContext<'_>,
        _types: &[usize],
    ) -> Result<(), TransformError> {
        Ok(())
    }

    /// Weave interfaces
    fn weave_interfaces(
        &mut self,
        _cx: &mut WeaveContext<'_>,
        _types: &[usize],
    ) -> Result<(), TransformError> {
        Ok(())
    }

    /// Weave value types
    fn weave_structs(
        &mut self,
        _cx: &mut WeaveContext<'_>,
        _types: &[usize],
    ) -> Result<(), TransformError> {
        Ok(())
    }

    /// Weave classes
    fn weave_classes(
        &mut self,
        _cx: &mut WeaveContext<'_>,
        _types: &[usize],
    ) -> Result<(), TransformError> {
        Ok(())
    }

    /// Weave single-cast and multicast delegates together
    fn weave_delegates(
        &mut self,
        _cx: &mut WeaveContext<'_>,
        _delegates: &[usize],
        _multicast: &[usize],
    ) -> Result<(), TransformError> {
        Ok(())
    }
}

impl<T: Transformer + ?Sized> Transformer for &mut T {
    fn weave_enums(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        (**self).weave_enums(cx, types)
    }

    fn weave_interfaces(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        (**self).weave_interfaces(cx, types)
    }

    fn weave_structs(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        (**self).weave_structs(cx, types)
    }

    fn weave_classes(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        (**self).weave_classes(cx, types)
    }

    fn weave_delegates(
        &mut self,
        cx: &mut WeaveContext<'_>,
        delegates: &[usize],
        multicast: &[usize],
    ) -> Result<(), TransformError> {
        (**self).weave_delegates(cx, delegates, multicast)
    }
}

/// Registers every woven type with the host and describes it in metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationTransformer;

impl RegistrationTransformer {
    /// Create a new registration transformer
    pub fn new() -> Self {
        Self
    }

    fn register(
        &self,
        cx: &mut WeaveContext<'_>,
        category: Category,
        types: &[usize],
    ) -> Result<(), TransformError> {
        for &index in types {
            let entry = describe(cx.type_at(index)?, category, cx.symbols);

            if !cx
                .module
                .registrations
                .iter()
                .any(|r| r.type_name == entry.full_name)
            {
                cx.module.registrations.push(Registration {
                    type_name: entry.full_name.clone(),
                    category: category.as_str().to_string(),
                });
            }

            cx.metadata.list_mut(category).push(entry);
        }
        Ok(())
    }
}

impl Transformer for RegistrationTransformer {
    fn weave_enums(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        for &index in types {
            let ty = cx.type_at(index)?;
            if ty.fields.is_empty() {
                return Err(TransformError::Unsupported {
                    type_name: ty.full_name(),
                    reason: "enumeration declares no members".to_string(),
                });
            }
        }
        self.register(cx, Category::Enum, types)
    }

    fn weave_interfaces(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        self.register(cx, Category::Interface, types)
    }

    fn weave_structs(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        self.register(cx, Category::Struct, types)
    }

    fn weave_classes(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        self.register(cx, Category::Class, types)
    }

    fn weave_delegates(
        &mut self,
        cx: &mut WeaveContext<'_>,
        delegates: &[usize],
        multicast: &[usize],
    ) -> Result<(), TransformError> {
        self.register(cx, Category::Delegate, delegates)?;
        self.register(cx, Category::MulticastDelegate, multicast)
    }
}

fn describe(ty: &TypeDef, category: Category, symbols: Option<&SymbolTable>) -> TypeMetadata {
    let full_name = ty.full_name();
    let source = symbols
        .and_then(|s| s.lookup(&full_name))
        .map(|entry| SourceLocation {
            document: entry.document.clone(),
            line: entry.line,
        });

    TypeMetadata {
        name: ty.name.clone(),
        namespace: ty.namespace.clone(),
        full_name,
        category,
        base_type: ty.base.as_ref().map(|b| b.full_name()),
        fields: ty
            .fields
            .iter()
            .map(|f| FieldMetadata {
                name: f.name.clone(),
                type_name: f.type_name.clone(),
            })
            .collect(),
        source,
    }
}
