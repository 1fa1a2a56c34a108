//! Schema-level guarantees checked against an on-disk database:
//! uniqueness, author references, comment ordering, orphaned comments
//! and user restoration from session ids.

use chrono::{Duration, Utc};
use rusqlite::Connection;
use tempfile::TempDir;

use folio::auth::{AuthUser, LoginManager, SqliteUserLoader, UserLoader};
use folio::db::models::{NewPost, NewUser, User};
use folio::db::posts::PostDeletePolicy;
use folio::db::{self, comments, is_unique_violation, posts, tokens, users};
use folio::state::DbPool;

fn create_test_pool() -> (TempDir, DbPool) {
    let temp_dir = TempDir::new().unwrap();
    let pool = db::create_pool(&temp_dir.path().join("test.db"), 2).unwrap();
    db::run_migrations(&pool).expect("Failed to run migrations");
    (temp_dir, pool)
}

fn insert_user(conn: &Connection, name: &str) -> User {
    users::create(
        conn,
        &NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "$2b$04$placeholderhash".to_string(),
            image_file: None,
        },
    )
    .unwrap()
}

fn post(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "content".to_string(),
        content_type: "plain".to_string(),
    }
}

fn foreign_key_problems(conn: &Connection) -> Vec<(String, i64)> {
    let mut stmt = conn.prepare("PRAGMA foreign_key_check").unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect()
}

#[test]
fn usernames_and_emails_are_unique() {
    let (_temp, pool) = create_test_pool();
    let conn = pool.get().unwrap();
    insert_user(&conn, "alice");

    let same_name = users::create(
        &conn,
        &NewUser {
            username: "alice".into(),
            email: "new@example.com".into(),
            password: "h".into(),
            image_file: None,
        },
    );
    assert!(is_unique_violation(&same_name.unwrap_err()));

    let same_email = users::create(
        &conn,
        &NewUser {
            username: "alice2".into(),
            email: "alice@example.com".into(),
            password: "h".into(),
            image_file: None,
        },
    );
    assert!(is_unique_violation(&same_email.unwrap_err()));
}

#[test]
fn every_post_references_an_existing_author() {
    let (_temp, pool) = create_test_pool();
    let conn = pool.get().unwrap();
    let alice = insert_user(&conn, "alice");
    let bob = insert_user(&conn, "bob");

    posts::create(&conn, alice.id, &post("a")).unwrap();
    posts::create(&conn, bob.id, &post("b")).unwrap();
    assert!(posts::create(&conn, 4242, &post("ghost")).is_err());

    assert!(foreign_key_problems(&conn).is_empty());
    for serialized in posts::serialize_all(&conn).unwrap() {
        let author = users::find_by_id(&conn, serialized.user).unwrap().unwrap();
        assert_eq!(serialized.username, author.username);
    }
}

#[test]
fn comments_never_increase_in_date() {
    let (_temp, pool) = create_test_pool();
    let conn = pool.get().unwrap();
    let alice = insert_user(&conn, "alice");
    let p = posts::create(&conn, alice.id, &post("thread")).unwrap();

    let base = Utc::now();
    for offset in [3, -10, 7, 0, -2] {
        comments::create_at(
            &conn,
            alice.id,
            p.id,
            &format!("at {offset}"),
            base + Duration::minutes(offset),
        )
        .unwrap();
    }

    let listed = comments::list_for_post(&conn, p.id).unwrap();
    assert_eq!(listed.len(), 5);
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].date_posted >= pair[1].date_posted));
}

#[test]
fn deleting_a_post_orphans_its_comments() {
    let (_temp, pool) = create_test_pool();
    let conn = pool.get().unwrap();
    let alice = insert_user(&conn, "alice");
    let p = posts::create(&conn, alice.id, &post("doomed")).unwrap();
    let c = comments::create(&conn, alice.id, p.id, "left behind").unwrap();

    assert!(posts::delete(&conn, p.id, PostDeletePolicy::RetainComments).unwrap());

    assert!(posts::find_by_id(&conn, p.id).unwrap().is_none());
    assert_eq!(comments::find_by_id(&conn, c.id).unwrap(), Some(c));
    assert_eq!(foreign_key_problems(&conn), vec![("comment".to_string(), 1)]);
}

#[test]
fn token_values_are_unique() {
    let (_temp, pool) = create_test_pool();
    let conn = pool.get().unwrap();
    let alice = insert_user(&conn, "alice");
    let bob = insert_user(&conn, "bob");
    let later = Utc::now() + Duration::hours(1);

    tokens::create(&conn, alice.id, "shared", later).unwrap();
    let err = tokens::create(&conn, bob.id, "shared", later).unwrap_err();
    assert!(is_unique_violation(&err));
}

#[test]
fn loader_treats_bad_ids_as_absent() {
    let (_temp, pool) = create_test_pool();
    let alice = insert_user(&pool.get().unwrap(), "alice");
    let loader = SqliteUserLoader::new(pool);

    assert_eq!(loader.load_user("not-a-number").unwrap(), None);
    assert_eq!(loader.load_user("999999").unwrap(), None);
    assert_eq!(
        loader.load_user(&alice.id.to_string()).unwrap(),
        Some(alice)
    );
}

#[test]
fn login_manager_round_trips_user_id() {
    let (_temp, pool) = create_test_pool();
    let alice = insert_user(&pool.get().unwrap(), "alice");
    let manager = LoginManager::new(SqliteUserLoader::new(pool));

    let session_id = alice.get_id().unwrap();
    let identity = manager.restore(Some(&session_id)).unwrap();
    assert!(identity.is_authenticated());
    assert_eq!(identity.into_user(), Some(alice));

    assert!(manager.restore(Some("999999")).unwrap().is_anonymous());
}
