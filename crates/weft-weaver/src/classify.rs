//! Type classification
//!
//! Every declared type maps to at most one [`Category`]. Classified types
//! are marked with the generated attribute as soon as they are classified.

use crate::config::ReflectionNames;
use serde::{Deserialize, Serialize};
use std::fmt;
use weft_bytecode::{Module, TypeDef, TypeKind};

/// Category of a type exposed to the host runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Reflectable class
    Class,
    /// Reflectable value type
    Struct,
    /// Reflectable enumeration
    Enum,
    /// Reflectable interface
    Interface,
    /// Multicast delegate
    MulticastDelegate,
    /// Single-cast delegate
    Delegate,
}

impl Category {
    /// All categories
    pub const ALL: [Category; 6] = [
        Category::Class,
        Category::Struct,
        Category::Enum,
        Category::Interface,
        Category::MulticastDelegate,
        Category::Delegate,
    ];

    /// Stable lowercase name, as used in registration markers
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Class => "class",
            Category::Struct => "struct",
            Category::Enum => "enum",
            Category::Interface => "interface",
            Category::MulticastDelegate => "multicastDelegate",
            Category::Delegate => "delegate",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a single type declaration
pub fn classify(ty: &TypeDef, names: &ReflectionNames) -> Option<Category> {
    match ty.kind {
        TypeKind::Class if ty.has_attribute(&names.class_attribute) => Some(Category::Class),
        TypeKind::Enum if ty.has_attribute(&names.enum_attribute) => Some(Category::Enum),
        TypeKind::ValueType if ty.has_attribute(&names.struct_attribute) => {
            Some(Category::Struct)
        }
        TypeKind::Interface if ty.has_attribute(&names.interface_attribute) => {
            Some(Category::Interface)
        }
        TypeKind::Class => {
            let base = ty.base.as_ref()?.open_name();
            if base == names.multicast_delegate_base {
                Some(Category::MulticastDelegate)
            } else if base == names.delegate_base {
                Some(Category::Delegate)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Type indices of one module, grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedTypes {
    /// Classes
    pub classes: Vec<usize>,
    /// Value types
    pub structs: Vec<usize>,
    /// Enumerations
    pub enums: Vec<usize>,
    /// Interfaces
    pub interfaces: Vec<usize>,
    /// Multicast delegates
    pub multicast_delegates: Vec<usize>,
    /// Single-cast delegates
    pub delegates: Vec<usize>,
}

impl CategorizedTypes {
    /// Record a classified type
    pub fn push(&mut self, category: Category, index: usize) {
        self.list_mut(category).push(index);
    }

    /// Type indices in a category, in declaration order
    pub fn get(&self, category: Category) -> &[usize] {
        match category {
            Category::Class => &self.classes,
            Category::Struct => &self.structs,
            Category::Enum => &self.enums,
            Category::Interface => &self.interfaces,
            Category::MulticastDelegate => &self.multicast_delegates,
            Category::Delegate => &self.delegates,
        }
    }

    /// Total number of classified types
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|&c| self.get(c).len()).sum()
    }

    /// Check if no type was classified
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<usize> {
        match category {
            Category::Class => &mut self.classes,
            Category::Struct => &mut self.structs,
            Category::Enum => &mut self.enums,
            Category::Interface => &mut self.interfaces,
            Category::MulticastDelegate => &mut self.multicast_delegates,
            Category::Delegate => &mut self.delegates,
        }
    }
}

/// Classify every type of a module, in declaration order
///
/// Each classified type gets the generated attribute before this returns.
pub fn classify_module(module: &mut Module, names: &ReflectionNames) -> CategorizedTypes {
    let mut categorized = CategorizedTypes::default();

    for (index, ty) in module.types.iter_mut().enumerate() {
        if let Some(category) = classify(ty, names) {
            ty.add_attribute_once(&names.generated_attribute);
            categorized.push(category, index);
        }
    }

    categorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use weft_bytecode::TypeRef;

    fn names() -> ReflectionNames {
        ReflectionNames::default()
    }

    fn host_base(name: &str) -> TypeRef {
        TypeRef::external("Weft.Host", "Weft", name)
    }

    #[test]
    fn test_attribute_driven_categories() {
        let names = names();
        let cases = [
            (TypeKind::Class, "Weft.HostClass", Category::Class),
            (TypeKind::ValueType, "Weft.HostStruct", Category::Struct),
            (TypeKind::Enum, "Weft.HostEnum", Category::Enum),
            (TypeKind::Interface, "Weft.HostInterface", Category::Interface),
        ];

        for (kind, attribute, expected) in cases {
            let ty = TypeDef::new("Game", "T", kind).with_attribute(attribute);
            assert_eq!(classify(&ty, &names), Some(expected));
        }
    }

    #[test]
    fn test_attribute_must_match_kind() {
        let names = names();
        let ty = TypeDef::new("Game", "T", TypeKind::ValueType).with_attribute("Weft.HostClass");
        assert_eq!(classify(&ty, &names), None);

        let ty = TypeDef::new("Game", "T", TypeKind::Interface).with_attribute("Weft.HostEnum");
        assert_eq!(classify(&ty, &names), None);
    }

    #[test]
    fn test_delegates_by_base_type() {
        let names = names();

        let multicast = TypeDef::new("Game", "OnDamage", TypeKind::Class)
            .with_base(host_base("MulticastDelegate`1"));
        assert_eq!(classify(&multicast, &names), Some(Category::MulticastDelegate));

        let single = TypeDef::new("Game", "OnQuery", TypeKind::Class)
            .with_base(host_base("Delegate`2"));
        assert_eq!(classify(&single, &names), Some(Category::Delegate));

        let plain = TypeDef::new("Game", "Thing", TypeKind::Class)
            .with_base(TypeRef::external("System.Runtime", "System", "Object"));
        assert_eq!(classify(&plain, &names), None);

        let no_base = TypeDef::new("Game", "Loose", TypeKind::Class);
        assert_eq!(classify(&no_base, &names), None);
    }

    #[test]
    fn test_class_attribute_wins_over_delegate_base() {
        let ty = TypeDef::new("Game", "Both", TypeKind::Class)
            .with_attribute("Weft.HostClass")
            .with_base(host_base("Delegate`1"));
        assert_eq!(classify(&ty, &names()), Some(Category::Class));
    }

    #[test]
    fn test_classify_module_marks_classified_types_only() {
        let mut module = Module::new("Game", "1.0.0");
        module.types.push(
            TypeDef::new("Game", "Player", TypeKind::Class).with_attribute("Weft.HostClass"),
        );
        module.types.push(TypeDef::new("Game", "Util", TypeKind::Class));
        module.types.push(
            TypeDef::new("Game", "Color", TypeKind::Enum).with_attribute("Weft.HostEnum"),
        );

        let categorized = classify_module(&mut module, &names());

        assert_eq!(categorized.classes, vec![0]);
        assert_eq!(categorized.enums, vec![2]);
        assert_eq!(categorized.len(), 2);
        assert!(module.types[0].has_attribute("Weft.Generated"));
        assert!(!module.types[1].has_attribute("Weft.Generated"));
        assert!(module.types[2].has_attribute("Weft.Generated"));
    }

    #[test]
    fn test_reclassification_does_not_duplicate_marker() {
        let mut module = Module::new("Game", "1.0.0");
        module.types.push(
            TypeDef::new("Game", "Player", TypeKind::Class).with_attribute("Weft.HostClass"),
        );

        let first = classify_module(&mut module, &names());
        let second = classify_module(&mut module, &names());

        assert_eq!(first, second);
        let markers = module.types[0]
            .attributes
            .iter()
            .filter(|a| *a == "Weft.Generated")
            .count();
        assert_eq!(markers, 1);
    }

    #[test]
    fn test_categories_are_disjoint() {
        let mut module = Module::new("Game", "1.0.0");
        let kinds = [TypeKind::Class, TypeKind::ValueType, TypeKind::Enum, TypeKind::Interface];
        let attributes = [
            "Weft.HostClass",
            "Weft.HostStruct",
            "Weft.HostEnum",
            "Weft.HostInterface",
        ];
        let bases = [None, Some("MulticastDelegate`1"), Some("Delegate`1")];

        let mut n = 0;
        for kind in kinds {
            for attribute in attributes {
                for base in bases {
                    let mut ty =
                        TypeDef::new("Game", &format!("T{}", n), kind).with_attribute(attribute);
                    if let Some(base) = base {
                        ty = ty.with_base(host_base(base));
                    }
                    module.types.push(ty);
                    n += 1;
                }
            }
        }

        let categorized = classify_module(&mut module, &names());

        let mut seen = HashSet::new();
        for category in Category::ALL {
            for &index in categorized.get(category) {
                assert!(seen.insert(index), "type {} classified twice", index);
            }
        }
        assert_eq!(seen.len(), categorized.len());
    }

    #[test]
    fn test_custom_reflection_names() {
        let names = ReflectionNames {
            class_attribute: "Host.Exposed".to_string(),
            ..ReflectionNames::default()
        };
        let ty = TypeDef::new("Game", "Player", TypeKind::Class).with_attribute("Host.Exposed");
        assert_eq!(classify(&ty, &names), Some(Category::Class));

        let default_attr =
            TypeDef::new("Game", "Player", TypeKind::Class).with_attribute("Weft.HostClass");
        assert_eq!(classify(&default_attr, &names), None);
    }
}
