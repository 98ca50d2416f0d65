//! Type declarations

use crate::encoder::{BytecodeReader, BytecodeWriter, DecodeError};

/// Declared kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeKind {
    /// Reference type (class)
    Class = 0,
    /// Value type (struct)
    ValueType = 1,
    /// Enumeration
    Enum = 2,
    /// Interface
    Interface = 3,
}

impl TypeKind {
    /// Convert to the on-disk tag
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Convert from the on-disk tag
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Class),
            1 => Some(Self::ValueType),
            2 => Some(Self::Enum),
            3 => Some(Self::Interface),
            _ => None,
        }
    }
}

/// Reference to a type, possibly declared in another module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Name of the module declaring the type (`None` for the current module)
    pub scope: Option<String>,
    /// Namespace
    pub namespace: String,
    /// Type name, including any generic arity suffix (e.g. ``Delegate`1``)
    pub name: String,
}

impl TypeRef {
    /// Create a reference to a type in another module
    pub fn external(scope: &str, namespace: &str, name: &str) -> Self {
        Self {
            scope: Some(scope.to_string()),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// `Namespace.Name`, or just `Name` in the global namespace
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }

    /// Full name with any generic arity suffix removed
    pub fn open_name(&self) -> String {
        let name = match self.name.split_once('`') {
            Some((base, _)) => base,
            None => &self.name,
        };
        full_name(&self.namespace, name)
    }

    fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_opt_string(self.scope.as_deref());
        writer.emit_string(&self.namespace);
        writer.emit_string(&self.name);
    }

    fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            scope: reader.read_opt_string()?,
            namespace: reader.read_string()?,
            name: reader.read_string()?,
        })
    }
}

/// Field declared on a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Full name of the field type
    pub type_name: String,
}

/// A type declared in a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Namespace
    pub namespace: String,
    /// Type name
    pub name: String,
    /// Declared kind
    pub kind: TypeKind,
    /// Base type, if any
    pub base: Option<TypeRef>,
    /// Full names of attached attributes, in declaration order
    pub attributes: Vec<String>,
    /// Declared fields (enum members for enumerations)
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Create a type with no base, attributes, or fields
    pub fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            base: None,
            attributes: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Set the base type
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Attach an attribute
    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attributes.push(attribute.to_string());
        self
    }

    /// Add a field
    pub fn with_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self
    }

    /// `Namespace.Name`, or just `Name` in the global namespace
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }

    /// Check whether an attribute is attached
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    /// Attach an attribute unless it is already present
    ///
    /// Returns `true` if the attribute was added.
    pub fn add_attribute_once(&mut self, attribute: &str) -> bool {
        if self.has_attribute(attribute) {
            return false;
        }
        self.attributes.push(attribute.to_string());
        true
    }

    pub(crate) fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_string(&self.namespace);
        writer.emit_string(&self.name);
        writer.emit_u8(self.kind.to_u8());

        match &self.base {
            Some(base) => {
                writer.emit_u8(1);
                base.encode(writer);
            }
            None => writer.emit_u8(0),
        }

        writer.emit_u32(self.attributes.len() as u32);
        for attribute in &self.attributes {
            writer.emit_string(attribute);
        }

        writer.emit_u32(self.fields.len() as u32);
        for field in &self.fields {
            writer.emit_string(&field.name);
            writer.emit_string(&field.type_name);
        }
    }

    pub(crate) fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let namespace = reader.read_string()?;
        let name = reader.read_string()?;

        let offset = reader.position();
        let tag = reader.read_u8()?;
        let kind = TypeKind::from_u8(tag).ok_or(DecodeError::InvalidTag {
            what: "type kind",
            tag,
            offset,
        })?;

        let base = if reader.read_bool()? {
            Some(TypeRef::decode(reader)?)
        } else {
            None
        };

        let attribute_count = reader.read_count()?;
        let mut attributes = Vec::with_capacity(attribute_count);
        for _ in 0..attribute_count {
            attributes.push(reader.read_string()?);
        }

        let field_count = reader.read_count()?;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(FieldDef {
                name: reader.read_string()?,
                type_name: reader.read_string()?,
            });
        }

        Ok(Self {
            namespace,
            name,
            kind,
            base,
            attributes,
            fields,
        })
    }
}

fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}
