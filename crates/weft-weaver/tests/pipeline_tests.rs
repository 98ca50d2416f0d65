//! End-to-end weaving batches on disk

use std::fs;
use std::path::{Path, PathBuf};
use weft_bytecode::{
    flags, symbol_path_for, verify_module, Module, ModuleIdentity, SymbolTable, TypeDef,
    TypeKind, TypeRef,
};
use weft_weaver::{
    ApiMetadata, BatchRequest, ErrorKind, LoadOrderManifest, RegistrationTransformer,
    TransformError, Transformer, WeaveContext, Weaver, WeaverConfig, WeaverError,
};

struct Workspace {
    _temp: tempfile::TempDir,
    bin: PathBuf,
    lib: PathBuf,
    out: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let bin = temp.path().join("bin");
        let lib = temp.path().join("lib");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(&lib).unwrap();
        let out = temp.path().join("woven");
        Self {
            _temp: temp,
            bin,
            lib,
            out,
        }
    }

    fn target(&self, module: &Module) -> String {
        let path = self.bin.join(format!("{}.wbc", module.name()));
        module.write_to(&path).unwrap();
        path.display().to_string()
    }

    fn reference(&self, module: &Module) -> String {
        let path = self.lib.join(format!("{}.wbc", module.name()));
        module.write_to(&path).unwrap();
        path.display().to_string()
    }

    fn request(&self, references: Vec<String>, targets: Vec<String>) -> BatchRequest {
        BatchRequest {
            references,
            targets,
            output_dir: self.out.clone(),
        }
    }

    fn files(&self) -> Vec<String> {
        if !self.out.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(&self.out)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn manifest(&self) -> LoadOrderManifest {
        let json = fs::read_to_string(self.out.join("weft.assemblyloadorder.json")).unwrap();
        serde_json::from_str(&json).unwrap()
    }
}

fn game_module(name: &str, references: &[&str]) -> Module {
    let mut module = Module::new(name, "1.0.0");
    for reference in references {
        module.references.push(ModuleIdentity::new(reference, "1.0.0"));
    }
    module.types.push(
        TypeDef::new(name, "Actor", TypeKind::Class)
            .with_attribute("Weft.HostClass")
            .with_field("Name", "System.String"),
    );
    module.types.push(
        TypeDef::new(name, "Team", TypeKind::Enum)
            .with_attribute("Weft.HostEnum")
            .with_field("Red", "System.Int32"),
    );
    module.types.push(
        TypeDef::new(name, "OnSpawn", TypeKind::Class)
            .with_base(TypeRef::external("Weft.Host", "Weft", "MulticastDelegate`1")),
    );
    module.types.push(TypeDef::new(name, "Internal", TypeKind::Class));
    module
}

fn generated_count(module: &Module, type_name: &str) -> usize {
    module
        .types
        .iter()
        .filter(|t| t.name == type_name)
        .flat_map(|t| t.attributes.iter())
        .filter(|a| *a == "Weft.Generated")
        .count()
}

fn host_module() -> Module {
    Module::new("Weft.Host", "1.0.0")
}

#[test]
fn test_single_module_output_shape() {
    let ws = Workspace::new();
    let references = vec![ws.reference(&host_module())];
    let targets = vec![ws.target(&game_module("Game", &["Weft.Host"]))];

    let report = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(references.clone(), targets))
        .unwrap();

    assert_eq!(
        ws.files(),
        vec!["Game.metadata.json", "Game.wbc", "weft.assemblyloadorder.json"]
    );
    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.load_order, vec!["Game"]);
    assert_eq!(ws.manifest().assembly_names, vec!["Game"]);

    let json = fs::read_to_string(ws.out.join("Game.metadata.json")).unwrap();
    let metadata: ApiMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(metadata.assembly_name, "Game");
    assert_eq!(metadata.references, references);
    assert_eq!(metadata.classes.len(), 1);
    assert_eq!(metadata.enums.len(), 1);
    assert_eq!(metadata.delegates.len(), 1);
}

#[test]
fn test_markers_and_registrations_written() {
    let ws = Workspace::new();
    let targets = vec![ws.target(&game_module("Game", &[]))];

    Weaver::with_config(WeaverConfig::default()).run(&ws.request(Vec::new(), targets)).unwrap();

    let woven = Module::read_from(&ws.out.join("Game.wbc")).unwrap();
    assert!(woven.has_flag(flags::WOVEN));
    assert_eq!(woven.registrations.len(), 3);

    let marked: Vec<&str> = woven
        .types
        .iter()
        .filter(|t| t.has_attribute("Weft.Generated"))
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(marked, vec!["Actor", "Team", "OnSpawn"]);
    for name in ["Actor", "Team", "OnSpawn"] {
        assert_eq!(generated_count(&woven, name), 1, "{}", name);
    }
    assert_eq!(generated_count(&woven, "Internal"), 0);
}

#[test]
fn test_reweaving_woven_output_changes_nothing() {
    let ws = Workspace::new();
    let targets = vec![ws.target(&game_module("Game", &[]))];
    Weaver::with_config(WeaverConfig::default()).run(&ws.request(Vec::new(), targets)).unwrap();

    let rewoven_dir = ws.out.with_file_name("rewoven");
    let request = BatchRequest {
        references: Vec::new(),
        targets: vec![ws.out.join("Game.wbc").display().to_string()],
        output_dir: rewoven_dir.clone(),
    };
    let report = Weaver::with_config(WeaverConfig::default()).run(&request).unwrap();
    assert_eq!(report.load_order, vec!["Game"]);

    let first = Module::read_from(&ws.out.join("Game.wbc")).unwrap();
    let rewoven = Module::read_from(&rewoven_dir.join("Game.wbc")).unwrap();
    assert!(verify_module(&rewoven).is_ok());
    assert_eq!(rewoven.registrations, first.registrations);
    assert_eq!(rewoven.registrations.len(), 3);
    for name in ["Actor", "Team", "OnSpawn"] {
        assert_eq!(generated_count(&rewoven, name), 1, "{}", name);
    }
}

#[test]
fn test_targets_sharing_a_file_stem_rejected() {
    let ws = Workspace::new();
    let first_dir = ws.bin.join("a");
    let second_dir = ws.bin.join("b");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();

    let first = first_dir.join("Game.wbc");
    let second = second_dir.join("Game.wbc");
    game_module("Game", &[]).write_to(&first).unwrap();
    let mut newer = game_module("Game", &[]);
    newer.identity = ModuleIdentity::new("Game", "2.0.0");
    newer.write_to(&second).unwrap();

    let targets = vec![first.display().to_string(), second.display().to_string()];
    let error = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap_err();

    assert!(matches!(error, WeaverError::DuplicateOutput { .. }));
    assert_eq!(error.kind(), ErrorKind::Configuration);
    let message = error.to_string();
    assert!(message.contains(&first.display().to_string()), "{}", message);
    assert!(message.contains(&second.display().to_string()), "{}", message);
    assert!(!ws.out.exists());
}

#[test]
fn test_target_listed_twice_rejected() {
    let ws = Workspace::new();
    let target = ws.target(&game_module("Game", &[]));

    let error = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), vec![target.clone(), target]))
        .unwrap_err();

    match &error {
        WeaverError::DuplicateOutput { stem, first, second } => {
            assert_eq!(stem, "Game");
            assert_eq!(first, second);
        }
        other => panic!("expected duplicate output, got {:?}", other),
    }
    assert!(!ws.out.exists());
}

#[test]
fn test_dependency_order_in_manifest() {
    let ws = Workspace::new();
    let targets = vec![
        ws.target(&game_module("App", &["Game"])),
        ws.target(&game_module("Game", &["Core"])),
        ws.target(&game_module("Core", &[])),
    ];

    let report = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap();

    assert_eq!(report.load_order, vec!["Core", "Game", "App"]);
    assert_eq!(ws.manifest().assembly_names, vec!["Core", "Game", "App"]);
}

#[test]
fn test_cyclic_batch_still_woven() {
    let ws = Workspace::new();
    let targets = vec![
        ws.target(&game_module("Left", &["Right"])),
        ws.target(&game_module("Right", &["Left"])),
    ];

    let report = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap();
    assert_eq!(report.load_order, vec!["Left", "Right"]);
}

struct FailOnModule(&'static str);

impl Transformer for FailOnModule {
    fn weave_classes(
        &mut self,
        cx: &mut WeaveContext<'_>,
        types: &[usize],
    ) -> Result<(), TransformError> {
        if cx.module.name() == self.0 {
            return Err(TransformError::Failed("injected failure".to_string()));
        }
        RegistrationTransformer::new().weave_classes(cx, types)
    }
}

#[test]
fn test_second_module_failure_promotes_nothing() {
    let ws = Workspace::new();
    let targets = vec![
        ws.target(&game_module("Core", &[])),
        ws.target(&game_module("Game", &["Core"])),
    ];

    let mut weaver = Weaver::new(WeaverConfig::default(), FailOnModule("Game"));
    let error = weaver.run(&ws.request(Vec::new(), targets)).unwrap_err();

    match &error {
        WeaverError::Batch { module, source } => {
            assert_eq!(module, "Game");
            assert!(matches!(**source, WeaverError::Transform { .. }));
        }
        other => panic!("expected batch error, got {:?}", other),
    }
    assert_eq!(error.kind(), ErrorKind::Transform);
    // Core was staged successfully but must not be promoted
    assert!(ws.files().is_empty());
}

#[test]
fn test_empty_enum_fails_batch() {
    let ws = Workspace::new();
    let mut module = Module::new("Game", "1.0.0");
    module.types.push(
        TypeDef::new("Game", "Nothing", TypeKind::Enum).with_attribute("Weft.HostEnum"),
    );
    let targets = vec![ws.target(&module)];

    let error = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transform);
    assert!(!ws.out.join("weft.assemblyloadorder.json").exists());
}

#[test]
fn test_missing_target_fails_before_loading() {
    let ws = Workspace::new();
    let missing = ws.bin.join("Missing.wbc");
    let targets = vec![
        ws.target(&game_module("Game", &[])),
        missing.display().to_string(),
    ];

    let error = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert!(error.to_string().contains("Missing.wbc"));
    assert!(!ws.out.exists());
}

#[test]
fn test_missing_reference_directory_is_configuration_error() {
    let ws = Workspace::new();
    let references = vec![ws.lib.join("absent").join("Weft.Host.wbc").display().to_string()];
    let targets = vec![ws.target(&game_module("Game", &[]))];

    let error = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(references, targets))
        .unwrap_err();

    assert!(matches!(error, WeaverError::ReferenceDirNotFound(_)));
    assert_eq!(error.kind(), ErrorKind::Configuration);
}

#[test]
fn test_glue_module_skipped_without_breaking_order() {
    let ws = Workspace::new();
    let targets = vec![
        ws.target(&game_module("Game", &["ProjectGlue"])),
        ws.target(&game_module("ProjectGlue", &["Core"])),
        ws.target(&game_module("Core", &[])),
    ];

    let report = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), targets))
        .unwrap();

    assert_eq!(report.load_order, vec!["Core", "Game"]);
    assert_eq!(report.skipped, vec!["ProjectGlue"]);
    assert_eq!(ws.manifest().assembly_names, vec!["Core", "Game"]);
    assert!(!ws.files().iter().any(|f| f.starts_with("ProjectGlue")));
}

#[test]
fn test_symbols_promoted_with_module() {
    let ws = Workspace::new();
    let target = ws.target(&game_module("Game", &[]));
    SymbolTable::new("Game")
        .with_entry("Game.Actor", "Actor.cs", 12)
        .write_to(&symbol_path_for(Path::new(&target)))
        .unwrap();

    let report = Weaver::with_config(WeaverConfig::default())
        .run(&ws.request(Vec::new(), vec![target]))
        .unwrap();

    assert_eq!(report.outputs.len(), 3);
    assert!(ws.out.join("Game.wsym").is_file());

    let json = fs::read_to_string(ws.out.join("Game.metadata.json")).unwrap();
    let metadata: ApiMetadata = serde_json::from_str(&json).unwrap();
    let actor = &metadata.classes[0];
    assert_eq!(actor.source.as_ref().map(|s| s.line), Some(12));
}

#[test]
fn test_stale_staging_from_previous_run_removed() {
    let ws = Workspace::new();
    let stale = ws.out.join(".weft-staging");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("Old.wbc"), b"leftover").unwrap();
    let targets = vec![ws.target(&game_module("Game", &[]))];

    Weaver::with_config(WeaverConfig::default()).run(&ws.request(Vec::new(), targets)).unwrap();

    assert!(!stale.exists());
    assert!(!ws.out.join("Old.wbc").exists());
}
