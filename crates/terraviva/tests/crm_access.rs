use tempfile::TempDir;
use terraviva::db::{Database, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use terraviva::repository::users;

fn test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("test.db"));
    db.init_schema().expect("schema initializes");
    (dir, db)
}

#[test]
fn schema_init_is_idempotent() {
    let (_dir, db) = test_db();
    db.init_schema().expect("second run is harmless");
    db.init_schema().expect("third run is harmless");
}

#[test]
fn default_user_is_seeded_exactly_once() {
    let (_dir, db) = test_db();

    assert!(db.seed_default_user().expect("first seed"));
    assert!(!db.seed_default_user().expect("second seed is a no-op"));
    assert_eq!(users::count(&db).expect("count"), 1);
}

#[test]
fn seeded_credentials_authenticate() {
    let (_dir, db) = test_db();
    db.seed_default_user().expect("seed");

    let user = users::authenticate(&db, DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
        .expect("authenticate runs")
        .expect("seeded credentials are valid");
    assert_eq!(user.username, "admin");
    assert_eq!(user.display_name, "Administrador Principal");
}

#[test]
fn wrong_password_and_unknown_user_are_rejected_without_error() {
    let (_dir, db) = test_db();
    db.seed_default_user().expect("seed");

    assert!(users::authenticate(&db, DEFAULT_ADMIN_USERNAME, "nope")
        .expect("authenticate runs")
        .is_none());
    assert!(users::authenticate(&db, "ghost", DEFAULT_ADMIN_PASSWORD)
        .expect("authenticate runs")
        .is_none());
}

#[test]
fn stored_password_is_not_plaintext() {
    let (_dir, db) = test_db();
    db.seed_default_user().expect("seed");

    let conn = rusqlite::Connection::open(db.path()).expect("open raw connection");
    let hash: String = conn
        .query_row("SELECT password_hash FROM crm_users", [], |row| row.get(0))
        .expect("raw query");
    assert_ne!(hash, DEFAULT_ADMIN_PASSWORD);
    assert!(hash.starts_with("$argon2"), "argon2 PHC string expected");
}
