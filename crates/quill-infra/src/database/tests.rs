use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
use uuid::Uuid;

use quill_core::domain::{Group, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, FollowRepository, GroupRepository, PostFilter, PostRepository};

use super::entity::{group, post};
use super::postgres_base::map_db_err;
use super::{PostgresFollowRepository, PostgresGroupRepository, PostgresPostRepository};

fn post_model(author_id: Uuid, text: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        author_id,
        group_id: None,
        text: text.to_owned(),
        image: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author_id = Uuid::new_v4();
    let model = post_model(author_id, "Test post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
    assert_eq!(post.text, "Test post");
    assert!(post.group_id.is_none());
}

#[tokio::test]
async fn test_list_posts_keeps_query_order() {
    let author_id = Uuid::new_v4();
    let newest = post_model(author_id, "newest");
    let oldest = post_model(author_id, "oldest");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![newest, oldest]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let posts = repo
        .list(&PostFilter::Author(author_id), 0, 10)
        .await
        .unwrap();

    let texts: Vec<_> = posts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["newest", "oldest"]);
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![group::Model {
            id: Uuid::new_v4(),
            title: "Group 1".to_owned(),
            slug: "g1".to_owned(),
            description: "First".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);

    let group: Group = repo.find_by_slug("g1").await.unwrap().unwrap();
    assert_eq!(group.slug, "g1");
    assert_eq!(group.title, "Group 1");
}

#[tokio::test]
async fn test_unfollow_reports_removed_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);
    let (user, author) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(repo.remove(user, author).await.unwrap());
    assert!(!repo.remove(user, author).await.unwrap());
}

#[test]
fn test_map_db_err_names_violated_field() {
    let err = DbErr::Query(RuntimeErr::Internal(
        "duplicate key value violates unique constraint \"idx-groups-slug\"".to_owned(),
    ));

    match map_db_err(err) {
        RepoError::Constraint { field, .. } => assert_eq!(field, "slug"),
        other => panic!("expected constraint error, got {other:?}"),
    }
}

#[test]
fn test_map_db_err_falls_back_to_query() {
    let err = DbErr::Custom("boom".to_owned());
    assert!(matches!(map_db_err(err), RepoError::Query(_)));
}
