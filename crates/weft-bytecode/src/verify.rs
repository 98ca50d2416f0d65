//! Structural module verification

use crate::module::Module;
use std::collections::HashSet;

/// Module verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Two types share a full name
    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),

    /// A module is referenced more than once
    #[error("Duplicate module reference: {0}")]
    DuplicateReference(String),

    /// The module references its own identity
    #[error("Module references itself: {0}")]
    SelfReference(String),

    /// A registration names a type the module does not declare
    #[error("Registration for undeclared type: {0}")]
    UnknownRegistration(String),

    /// A type is registered more than once
    #[error("Type registered more than once: {0}")]
    DuplicateRegistration(String),

    /// Module validation error
    #[error("Module validation error: {0}")]
    ModuleValidation(String),
}

/// Verify a module's structural invariants
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    module.validate().map_err(VerifyError::ModuleValidation)?;

    let mut type_names = HashSet::new();
    for ty in &module.types {
        let name = ty.full_name();
        if !type_names.insert(name.clone()) {
            return Err(VerifyError::DuplicateType(name));
        }
    }

    let own = module.identity.full_name();
    let mut references = HashSet::new();
    for reference in &module.references {
        let name = reference.full_name();
        if name == own {
            return Err(VerifyError::SelfReference(name));
        }
        if !references.insert(name.clone()) {
            return Err(VerifyError::DuplicateReference(name));
        }
    }

    let mut registered = HashSet::new();
    for registration in &module.registrations {
        if !type_names.contains(&registration.type_name) {
            return Err(VerifyError::UnknownRegistration(
                registration.type_name.clone(),
            ));
        }
        if !registered.insert(registration.type_name.as_str()) {
            return Err(VerifyError::DuplicateRegistration(
                registration.type_name.clone(),
            ));
        }
    }

    Ok(())
}
