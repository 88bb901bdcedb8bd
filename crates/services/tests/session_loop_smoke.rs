use std::fs;

use flashcard_core::model::{ModuleName, QuestionId, TagFilter, TagName};
use flashcard_core::time::fixed_now;
use services::{Clock, ModuleService, SessionError, SessionLoopService};
use storage::repository::Storage;

fn services(storage: &Storage) -> (ModuleService, SessionLoopService) {
    let modules = ModuleService::new(storage.modules.clone(), storage.progress.clone());
    let loop_svc = SessionLoopService::new(Clock::fixed(fixed_now()), storage.progress.clone());
    (modules, loop_svc)
}

#[test]
fn first_review_writes_fresh_progress_file() {
    let modules_dir = tempfile::tempdir().unwrap();
    let progress_dir = tempfile::tempdir().unwrap();
    fs::write(modules_dir.path().join("math.txt"), "Q: 2+2?\nA: 4\nQ: 3+3?\n").unwrap();

    let storage = Storage::filesystem(modules_dir.path(), progress_dir.path());
    let (modules, loop_svc) = services(&storage);
    let math = ModuleName::new("math").unwrap();

    assert_eq!(modules.list_modules().unwrap(), vec![math.clone()]);
    let selection = modules.open_module(&math).unwrap();
    assert_eq!(selection.questions().len(), 1);
    assert!(!progress_dir.path().join("math.json").exists());

    let mut session = loop_svc
        .start_session(selection, TagFilter::All, 10)
        .unwrap();
    assert_eq!(session.len(), 1);
    let id = QuestionId::from("0");
    session.reveal(&id).unwrap();
    loop_svc.mark_correct(&mut session, &id).unwrap();

    let raw = fs::read_to_string(progress_dir.path().join("math.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"0": {"correct": 1, "incorrect": 0, "tags": []}})
    );
}

#[test]
fn tag_filter_selects_from_stored_progress() {
    let modules_dir = tempfile::tempdir().unwrap();
    let progress_dir = tempfile::tempdir().unwrap();
    fs::write(modules_dir.path().join("math.txt"), "Q: 2+2?\nA: 4\n").unwrap();
    fs::write(
        progress_dir.path().join("math.json"),
        r#"{"0": {"correct": 3, "incorrect": 1, "tags": ["Important"]}}"#,
    )
    .unwrap();

    let storage = Storage::filesystem(modules_dir.path(), progress_dir.path());
    let (modules, loop_svc) = services(&storage);
    let selection = modules.open_module(&ModuleName::new("math").unwrap()).unwrap();

    let important = TagFilter::Tag(TagName::new("Important").unwrap());
    let later = TagFilter::Tag(TagName::new("Review Later").unwrap());
    assert_eq!(selection.available(&important).len(), 1);
    assert!(selection.available(&later).is_empty());

    let err = loop_svc
        .start_session(selection.clone(), later, 5)
        .unwrap_err();
    assert!(matches!(err, SessionError::Empty));

    let session = loop_svc.start_session(selection, important, 5).unwrap();
    let record = session.record(&QuestionId::from("0")).unwrap();
    assert_eq!((record.correct(), record.incorrect()), (3, 1));
}

#[test]
fn resampling_keeps_changes_from_previous_session() {
    let modules_dir = tempfile::tempdir().unwrap();
    let progress_dir = tempfile::tempdir().unwrap();
    fs::write(
        modules_dir.path().join("bio.txt"),
        "Q: cell?\nA: unit\nQ: dna?\nA: code\n",
    )
    .unwrap();

    let storage = Storage::filesystem(modules_dir.path(), progress_dir.path());
    let (modules, loop_svc) = services(&storage);
    let selection = modules.open_module(&ModuleName::new("bio").unwrap()).unwrap();

    let mut session = loop_svc.start_session(selection, TagFilter::All, 2).unwrap();
    let later = TagName::new("Review Later").unwrap();
    let id = QuestionId::from("1");
    loop_svc
        .set_tags(&mut session, &id, vec![later.clone()])
        .unwrap();

    let next = loop_svc
        .start_session(session.into_selection(), TagFilter::Tag(later), 2)
        .unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next.cards()[0].id(), &id);
}

#[test]
fn missing_module_folder_reports_no_modules() {
    let root = tempfile::tempdir().unwrap();
    let storage = Storage::filesystem(root.path().join("absent"), root.path());
    let (modules, _) = services(&storage);
    assert!(matches!(
        modules.list_modules(),
        Err(services::ModuleError::NoModules { .. })
    ));
}

#[test]
fn malformed_progress_aborts_module_load() {
    let modules_dir = tempfile::tempdir().unwrap();
    let progress_dir = tempfile::tempdir().unwrap();
    fs::write(modules_dir.path().join("math.txt"), "Q: 2+2?\nA: 4\n").unwrap();
    fs::write(progress_dir.path().join("math.json"), "oops").unwrap();

    let storage = Storage::filesystem(modules_dir.path(), progress_dir.path());
    let (modules, _) = services(&storage);
    let err = modules
        .open_module(&ModuleName::new("math").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        services::ModuleError::Storage(storage::StorageError::Parse { .. })
    ));
    assert_eq!(
        fs::read_to_string(progress_dir.path().join("math.json")).unwrap(),
        "oops"
    );
}
