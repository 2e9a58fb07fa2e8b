use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fsb_core::{BackupStore, Game, StoreConfig, StoreError};
use tempfile::TempDir;

// Fake roaming dir with an Elden Ring install: <id>/ER0000.sl2 (+ .bak, + junk)
fn fixture() -> (TempDir, BackupStore) {
    let d = tempfile::tempdir().unwrap();
    let saves = d.path().join("Roaming");
    let profile = saves.join("EldenRing/76561198000000000");
    fs::create_dir_all(&profile).unwrap();
    fs::write(profile.join("ER0000.sl2"), b"slot data").unwrap();
    fs::write(profile.join("ER0000.SL2.BAK"), b"older slot data").unwrap();
    fs::write(profile.join("steam_autocloud.vdf"), b"cloud").unwrap();
    fs::write(saves.join("EldenRing/GraphicsConfig.xml"), b"<x/>").unwrap();
    let store = BackupStore::new(StoreConfig::new(saves.join("FSBackup"), &saves));
    store.setup();
    (d, store)
}

fn contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

fn profile(store: &BackupStore) -> std::path::PathBuf {
    store
        .config()
        .source_path(Game::EldenRing)
        .join("76561198000000000")
}

#[test]
fn setup_creates_folders_for_detected_games_only() {
    let (_d, store) = fixture();
    let cfg = store.config();
    assert!(cfg.backup_root.is_dir());
    assert!(cfg.game_backup_dir(Game::EldenRing).is_dir());
    assert!(!cfg.game_backup_dir(Game::Sekiro).exists());
    assert_eq!(store.get_all_detected_games(), vec![Game::EldenRing]);
}

#[test]
fn setup_is_idempotent_and_picks_up_new_installs() {
    let (_d, store) = fixture();
    let again = store.setup();
    assert!(again.created.is_empty());
    assert!(again.failed.is_empty());
    assert_eq!(again.detected, vec![Game::EldenRing]);

    fs::create_dir_all(store.config().source_path(Game::DarkSoulsIII)).unwrap();
    let third = store.setup();
    assert_eq!(third.created, vec![store.config().game_backup_dir(Game::DarkSoulsIII)]);
    assert_eq!(
        store.get_all_detected_games(),
        vec![Game::DarkSoulsIII, Game::EldenRing]
    );
}

#[test]
fn create_backup_copies_only_save_files_flat() {
    let (_d, store) = fixture();
    let report = store.create_backup(Game::EldenRing, "A").unwrap();
    assert_eq!(report.copied.len(), 2);
    assert_eq!(report.skipped, 2);
    assert!(report.is_clean());

    let snap = contents(&store.config().snapshot_dir(Game::EldenRing, "A"));
    let expected: BTreeMap<_, _> = [
        ("ER0000.SL2.BAK".to_string(), b"older slot data".to_vec()),
        ("ER0000.sl2".to_string(), b"slot data".to_vec()),
    ]
    .into_iter()
    .collect();
    assert_eq!(snap, expected);
}

#[test]
fn create_backup_without_saves_makes_empty_snapshot() {
    let (_d, store) = fixture();
    let src = store.config().source_path(Game::Sekiro);
    fs::create_dir_all(src.join("0001")).unwrap();
    fs::write(src.join("0001/readme.txt"), b"hi").unwrap();
    store.setup();

    let report = store.create_backup(Game::Sekiro, "empty").unwrap();
    assert!(report.copied.is_empty());
    let dir = store.config().snapshot_dir(Game::Sekiro, "empty");
    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(dir).unwrap().count(), 0);
}

#[test]
fn create_backup_for_missing_install_fails() {
    let (_d, store) = fixture();
    let err = store.create_backup(Game::DarkSoulsII, "A").unwrap_err();
    assert!(matches!(err, StoreError::SourceMissing { game: Game::DarkSoulsII, .. }));
    assert!(!store.config().game_backup_dir(Game::DarkSoulsII).exists());
}

#[test]
fn create_backup_rejects_escaping_names() {
    let (_d, store) = fixture();
    for name in ["../escape", "..", "", "a/b"] {
        assert!(matches!(
            store.create_backup(Game::EldenRing, name),
            Err(StoreError::InvalidSnapshotName(_))
        ));
    }
    assert!(!store.config().backup_root.join("escape").exists());
}

#[test]
fn list_backups_is_sorted_and_ignores_files() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "B").unwrap();
    store.create_backup(Game::EldenRing, "A").unwrap();
    fs::write(store.config().game_backup_dir(Game::EldenRing).join("stray.txt"), b"").unwrap();
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), ["A", "B"]);
}

#[test]
fn list_backups_fails_when_folder_is_gone() {
    let (_d, store) = fixture();
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), Vec::<String>::new());
    assert!(store.get_all_backups(Game::Sekiro).is_err());
}

#[test]
fn rename_moves_content() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    let before = contents(&store.config().snapshot_dir(Game::EldenRing, "A"));

    let report = store.rename_backup(Game::EldenRing, "A", "B").unwrap().unwrap();
    assert!(report.copy.is_clean());
    assert!(report.delete.unwrap().is_clean());
    assert!(!store.config().snapshot_dir(Game::EldenRing, "A").exists());
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "B")), before);
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), ["B"]);
}

#[test]
fn rename_missing_or_same_name_is_noop() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    assert!(store.rename_backup(Game::EldenRing, "ghost", "B").unwrap().is_none());
    assert!(store.rename_backup(Game::EldenRing, "A", "A").unwrap().is_none());
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), ["A"]);
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "A")).len(), 2);
}

#[test]
fn delete_removes_snapshot() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    store.create_backup(Game::EldenRing, "B").unwrap();
    let report = store.delete_backup(Game::EldenRing, "A").unwrap();
    assert_eq!(report.removed, 2);
    assert!(report.snapshot_removed);
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), ["B"]);
    // live saves untouched
    assert!(profile(&store).join("ER0000.sl2").is_file());

    assert!(matches!(
        store.delete_backup(Game::EldenRing, "A"),
        Err(StoreError::SnapshotNotFound { .. })
    ));
}

#[test]
fn load_restores_into_profile_folder() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    let snapshot = contents(&store.config().snapshot_dir(Game::EldenRing, "A"));

    fs::write(profile(&store).join("ER0000.sl2"), b"progress lost").unwrap();
    fs::remove_file(profile(&store).join("ER0000.SL2.BAK")).unwrap();

    let report = store.load_backup(Game::EldenRing, "A").unwrap();
    assert_eq!(report.target, profile(&store));
    assert_eq!(report.copy.copied.len(), 2);
    assert_eq!(fs::read(profile(&store).join("ER0000.sl2")).unwrap(), b"slot data");
    // non-save files in the live folder are left alone
    assert!(profile(&store).join("steam_autocloud.vdf").is_file());

    store.create_backup(Game::EldenRing, "Verify").unwrap();
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "Verify")), snapshot);
}

#[test]
fn load_without_profile_folder_is_reported() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    fs::remove_dir_all(profile(&store)).unwrap();
    assert!(matches!(
        store.load_backup(Game::EldenRing, "A"),
        Err(StoreError::NoProfileDir { .. })
    ));
    assert!(matches!(
        store.load_backup(Game::EldenRing, "missing"),
        Err(StoreError::SnapshotNotFound { .. })
    ));
}

#[test]
fn reports_serialize_for_front_ends() {
    let (_d, store) = fixture();
    let report = store.create_backup(Game::EldenRing, "A").unwrap();
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["copied"].as_array().unwrap().len(), 2);
    assert_eq!(v["failed"], serde_json::json!([]));
    let setup = serde_json::to_value(store.setup()).unwrap();
    assert_eq!(setup["detected"], serde_json::json!(["EldenRing"]));
}

#[test]
fn rename_keeps_old_snapshot_when_copy_fails() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    let before = contents(&store.config().snapshot_dir(Game::EldenRing, "A"));
    // a folder in the way of one save file
    fs::create_dir_all(store.config().snapshot_dir(Game::EldenRing, "B").join("ER0000.sl2")).unwrap();

    let report = store.rename_backup(Game::EldenRing, "A", "B").unwrap().unwrap();
    assert_eq!(report.copy.copied, ["ER0000.SL2.BAK"]);
    assert_eq!(report.copy.failed.len(), 1);
    assert!(report.delete.is_none());
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "A")), before);
    assert_eq!(store.get_all_backups(Game::EldenRing).unwrap(), ["A", "B"]);
}

#[cfg(unix)]
#[test]
fn rename_between_names_of_one_folder_is_noop() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "Boss").unwrap();
    let before = contents(&store.config().snapshot_dir(Game::EldenRing, "Boss"));
    // stands in for a case-insensitive filesystem resolving "boss" to "Boss"
    std::os::unix::fs::symlink(
        store.config().snapshot_dir(Game::EldenRing, "Boss"),
        store.config().snapshot_dir(Game::EldenRing, "boss"),
    )
    .unwrap();

    assert!(store.rename_backup(Game::EldenRing, "Boss", "boss").unwrap().is_none());
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "Boss")), before);
    assert_eq!(contents(&store.config().snapshot_dir(Game::EldenRing, "boss")), before);
}

#[test]
fn setup_records_failed_folder_and_continues() {
    let (_d, store) = fixture();
    let cfg = store.config();
    fs::create_dir_all(cfg.source_path(Game::DarkSoulsIII)).unwrap();
    fs::create_dir_all(cfg.source_path(Game::Sekiro)).unwrap();
    // a plain file where the DarkSoulsIII backup folder should go
    fs::write(cfg.game_backup_dir(Game::DarkSoulsIII), b"").unwrap();

    let report = store.setup();
    assert_eq!(report.detected, vec![Game::DarkSoulsIII, Game::Sekiro, Game::EldenRing]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, cfg.game_backup_dir(Game::DarkSoulsIII));
    assert_eq!(report.created, vec![cfg.game_backup_dir(Game::Sekiro)]);
    assert_eq!(store.get_all_detected_games(), vec![Game::Sekiro, Game::EldenRing]);
}

#[test]
fn delete_reports_snapshot_it_could_not_remove() {
    let (_d, store) = fixture();
    store.create_backup(Game::EldenRing, "A").unwrap();
    let snap = store.config().snapshot_dir(Game::EldenRing, "A");
    fs::create_dir_all(snap.join("extra")).unwrap();

    let report = store.delete_backup(Game::EldenRing, "A").unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.kept_dirs, [snap.join("extra")]);
    assert!(!report.snapshot_removed);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, snap);
    assert!(!report.is_clean());
}
