// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use crate::tests::{create_test_prison, create_test_template};

#[test]
fn test_persistence_initialization() {
    assert!(Persistence::new_in_memory().is_ok());
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Persistence::new_in_memory().unwrap();
    let mut db2 = Persistence::new_in_memory().unwrap();

    db1.upsert_prison(&create_test_prison()).unwrap();

    assert!(db1.get_prison("HEI").unwrap().is_some());
    assert!(db2.get_prison("HEI").unwrap().is_none());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "visit-scheduler-init-{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence.upsert_prison(&create_test_prison()).unwrap();
        persistence
            .upsert_session_template(&create_test_template("tpl-file"))
            .unwrap();
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.get_prison("HEI").unwrap(), Some(create_test_prison()));
    assert!(reopened.get_session_template("tpl-file").unwrap().is_some());

    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}
