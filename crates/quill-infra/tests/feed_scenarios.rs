//! End-to-end feed behaviour over the in-memory store, cache and renderer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use quill_core::domain::validation::{COMMENT_SENTINEL_TEXT, POST_SENTINEL_TEXT};
use quill_core::domain::{CommentDraft, Group, GroupDraft, Post, PostDraft, User};
use quill_core::ports::{BaseRepository, Cache};
use quill_core::services::{
    EditOutcome, EntryLoader, FeedService, FollowGraph, GroupService, HOME_CACHE_MAX_PAGE,
    HOME_CACHE_PREFIX, PostService,
};
use quill_core::{DomainError, FeedConfig, PageNumber, TextPolicy};
use quill_infra::{InMemoryCache, InMemoryStore, JsonRenderer};

struct Blog {
    store: Arc<InMemoryStore>,
    cache: Arc<InMemoryCache>,
    feeds: FeedService,
    posts: PostService,
    follows: FollowGraph,
    groups: GroupService,
}

impl Blog {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let follows = FollowGraph::new(store.clone(), store.clone());
        let feeds = FeedService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            follows.clone(),
            cache.clone(),
            Arc::new(JsonRenderer::new()),
            &FeedConfig::default(),
        );
        let posts = PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            EntryLoader::new(store.clone(), store.clone()),
            TextPolicy::default(),
        );
        let groups = GroupService::new(store.clone());

        Self {
            store,
            cache,
            feeds,
            posts,
            follows,
            groups,
        }
    }

    async fn user(&self, username: &str) -> User {
        self.store
            .save(User::new(username.to_string(), "hash".to_string()))
            .await
            .unwrap()
    }

    async fn group(&self, title: &str, slug: &str) -> Group {
        self.groups
            .create_group(GroupDraft {
                title: title.to_string(),
                slug: slug.to_string(),
                description: String::new(),
            })
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, text: &str) -> Post {
        self.posts
            .create_post(author.id, PostDraft::new(text))
            .await
            .unwrap()
    }
}

fn texts(items: &[quill_core::domain::PostEntry]) -> Vec<&str> {
    items.iter().map(|entry| entry.text.as_str()).collect()
}

fn rendered_texts(body: &str) -> Vec<String> {
    let value: Value = serde_json::from_str(body).unwrap();
    value["context"]["page_obj"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn home_feed_lists_newest_first() {
    let blog = Blog::new();
    let author = blog.user("leo").await;

    blog.post(&author, "first").await;
    blog.post(&author, "second").await;
    blog.post(&author, "third").await;

    let page = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert_eq!(texts(&page.items), vec!["third", "second", "first"]);
    assert_eq!(page.total, 3);
    assert!(!page.has_next);
}

#[tokio::test]
async fn grouped_post_appears_only_in_its_group() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    let g1 = blog.group("Group one", "g1").await;
    blog.group("Group two", "g2").await;

    blog.posts
        .create_post(author.id, PostDraft::new("P1").in_group(g1.id))
        .await
        .unwrap();
    blog.post(&author, "P2").await;

    let home = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert_eq!(texts(&home.items), vec!["P2", "P1"]);

    let feed = blog
        .feeds
        .group_feed("g1", PageNumber::FIRST)
        .await
        .unwrap();
    assert_eq!(texts(&feed.page_obj.items), vec!["P1"]);
    assert_eq!(feed.page_obj.items[0].group.as_ref().unwrap().slug, "g1");

    let other = blog
        .feeds
        .group_feed("g2", PageNumber::FIRST)
        .await
        .unwrap();
    assert!(other.page_obj.is_empty());

    let profile = blog
        .feeds
        .profile_feed("leo", None, PageNumber::FIRST)
        .await
        .unwrap();
    assert_eq!(texts(&profile.page_obj.items), vec!["P2", "P1"]);
}

#[tokio::test]
async fn thirteen_posts_span_two_pages() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    let g1 = blog.group("Group one", "g1").await;
    for i in 0..11 {
        blog.posts
            .create_post(author.id, PostDraft::new(format!("grouped {i}")).in_group(g1.id))
            .await
            .unwrap();
    }
    for i in 0..2 {
        blog.post(&author, &format!("loose {i}")).await;
    }

    let first = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first.items[0].text, "loose 1");
    assert!(first.has_next);

    let second = blog.feeds.home_feed(PageNumber::new(2)).await.unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second.items[2].text, "grouped 0");
    assert!(!second.has_next);
    assert!(second.has_previous);

    let overflow = blog.feeds.home_feed(PageNumber::new(99)).await.unwrap();
    assert_eq!(overflow.number, 2);
    assert_eq!(overflow.len(), 3);

    let group_first = blog
        .feeds
        .group_feed("g1", PageNumber::FIRST)
        .await
        .unwrap();
    assert_eq!(group_first.page_obj.len(), 10);
    assert_eq!(group_first.page_obj.items[0].text, "grouped 10");

    let group_second = blog
        .feeds
        .group_feed("g1", PageNumber::new(2))
        .await
        .unwrap();
    assert_eq!(texts(&group_second.page_obj.items), vec!["grouped 0"]);

    let profile = blog
        .feeds
        .profile_feed("leo", None, PageNumber::new(2))
        .await
        .unwrap();
    assert_eq!(profile.post_count, 13);
    assert_eq!(profile.page_obj.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn home_page_is_served_stale_until_expiry() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    blog.post(&author, "before").await;

    let cached = blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert_eq!(rendered_texts(&cached), vec!["before"]);

    blog.post(&author, "after").await;
    let stale = blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert_eq!(stale, cached);

    tokio::time::advance(Duration::from_secs(21)).await;
    let fresh = blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert_eq!(rendered_texts(&fresh), vec!["after", "before"]);
}

#[tokio::test]
async fn clearing_the_cache_shows_new_posts() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    blog.post(&author, "before").await;

    let key = format!("{HOME_CACHE_PREFIX}1");
    blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert!(blog.cache.exists(&key).await);

    blog.post(&author, "after").await;
    blog.feeds.clear_cache().await.unwrap();
    assert!(!blog.cache.exists(&key).await);

    let body = blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert_eq!(rendered_texts(&body), vec!["after", "before"]);
}

#[tokio::test(start_paused = true)]
async fn home_cache_stays_bounded_for_arbitrary_page_numbers() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    blog.post(&author, "only").await;

    for n in 0..5000 {
        blog.feeds
            .render_home(PageNumber::new(1_000_000 + n))
            .await
            .unwrap();
    }
    for n in -20..=200 {
        blog.feeds.render_home(PageNumber::new(n)).await.unwrap();
    }
    assert_eq!(blog.cache.len().await, HOME_CACHE_MAX_PAGE as usize);

    tokio::time::advance(Duration::from_secs(3600)).await;
    blog.feeds.render_home(PageNumber::FIRST).await.unwrap();
    assert_eq!(blog.cache.len().await, 1);
}

#[tokio::test]
async fn following_feed_shows_only_followed_authors() {
    let blog = Blog::new();
    let reader = blog.user("reader").await;
    let followed = blog.user("followed").await;
    let stranger = blog.user("stranger").await;

    assert!(blog.follows.follow(reader.id, followed.id).await.unwrap());
    blog.post(&followed, "from followed").await;
    blog.post(&stranger, "from stranger").await;

    let feed = blog
        .feeds
        .following_feed(reader.id, PageNumber::FIRST)
        .await
        .unwrap();
    assert_eq!(texts(&feed.items), vec!["from followed"]);

    let empty = blog
        .feeds
        .following_feed(stranger.id, PageNumber::FIRST)
        .await
        .unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.num_pages, 1);

    let authors = blog.follows.following_feed_authors(reader.id).await.unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].username, "followed");
}

#[tokio::test]
async fn follow_and_unfollow_are_idempotent() {
    let blog = Blog::new();
    let reader = blog.user("reader").await;
    let author = blog.user("author").await;

    assert!(blog.follows.follow(reader.id, author.id).await.unwrap());
    assert!(!blog.follows.follow(reader.id, author.id).await.unwrap());
    assert_eq!(blog.store.follow_count().await, 1);

    assert!(!blog.follows.follow(reader.id, reader.id).await.unwrap());
    assert_eq!(blog.store.follow_count().await, 1);

    assert!(blog.follows.unfollow(reader.id, author.id).await.unwrap());
    assert!(!blog.follows.unfollow(reader.id, author.id).await.unwrap());
    assert_eq!(blog.store.follow_count().await, 0);
}

#[tokio::test]
async fn profile_reports_viewer_follow_state() {
    let blog = Blog::new();
    let reader = blog.user("reader").await;
    let author = blog.user("author").await;

    let before = blog
        .feeds
        .profile_feed("author", Some(reader.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(!before.following);

    blog.follows.follow(reader.id, author.id).await.unwrap();

    let after = blog
        .feeds
        .profile_feed("author", Some(reader.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(after.following);

    let anonymous = blog
        .feeds
        .profile_feed("author", None, PageNumber::FIRST)
        .await
        .unwrap();
    assert!(!anonymous.following);

    let own = blog
        .feeds
        .profile_feed("author", Some(author.id), PageNumber::FIRST)
        .await
        .unwrap();
    assert!(!own.following);
}

#[tokio::test]
async fn sentinel_texts_are_rejected() {
    let blog = Blog::new();
    let author = blog.user("leo").await;

    let err = blog
        .posts
        .create_post(author.id, PostDraft::new("yandex"))
        .await
        .unwrap_err();
    match err {
        DomainError::Validation(errors) => {
            assert_eq!(errors.messages_for("text"), vec![POST_SENTINEL_TEXT]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let post = blog.post(&author, "fine").await;
    let err = blog
        .posts
        .add_comment(author.id, post.id, CommentDraft::new("азазазаз!!!1!1!"))
        .await
        .unwrap_err();
    match err {
        DomainError::Validation(errors) => {
            assert_eq!(errors.messages_for("text"), vec![COMMENT_SENTINEL_TEXT]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(blog.store.comment_count().await, 0);
    let home = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert_eq!(home.total, 1);
}

#[tokio::test]
async fn post_with_unknown_group_is_rejected() {
    let blog = Blog::new();
    let author = blog.user("leo").await;

    let err = blog
        .posts
        .create_post(author.id, PostDraft::new("hello").in_group(Uuid::new_v4()))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => assert!(!errors.messages_for("group").is_empty()),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_a_group_keeps_its_posts() {
    let blog = Blog::new();
    let author = blog.user("leo").await;
    let group = blog.group("Group one", "g1").await;
    let post = blog
        .posts
        .create_post(author.id, PostDraft::new("grouped").in_group(group.id))
        .await
        .unwrap();

    BaseRepository::<Group, Uuid>::delete(blog.store.as_ref(), group.id)
        .await
        .unwrap();

    let kept: Option<Post> = blog.store.find_by_id(post.id).await.unwrap();
    assert_eq!(kept.unwrap().group_id, None);

    let home = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert_eq!(texts(&home.items), vec!["grouped"]);
    assert!(home.items[0].group.is_none());
}

#[tokio::test]
async fn deleting_a_user_removes_their_posts_and_comments() {
    let blog = Blog::new();
    let author = blog.user("author").await;
    let reader = blog.user("reader").await;
    let post = blog.post(&author, "doomed").await;
    blog.posts
        .add_comment(reader.id, post.id, CommentDraft::new("nice"))
        .await
        .unwrap();
    blog.follows.follow(reader.id, author.id).await.unwrap();

    BaseRepository::<User, Uuid>::delete(blog.store.as_ref(), author.id)
        .await
        .unwrap();

    let home = blog.feeds.home_feed(PageNumber::FIRST).await.unwrap();
    assert!(home.is_empty());
    assert_eq!(blog.store.comment_count().await, 0);
    assert_eq!(blog.store.follow_count().await, 0);
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let blog = Blog::new();
    let author = blog.user("author").await;
    let intruder = blog.user("intruder").await;
    let post = blog.post(&author, "original").await;

    let outcome = blog
        .posts
        .edit_post(intruder.id, post.id, PostDraft::new("hijacked"))
        .await
        .unwrap();
    assert!(matches!(outcome, EditOutcome::NotOwner { post_id } if post_id == post.id));

    let outcome = blog
        .posts
        .edit_post(author.id, post.id, PostDraft::new("revised"))
        .await
        .unwrap();
    match outcome {
        EditOutcome::Updated(updated) => assert_eq!(updated.text, "revised"),
        other => panic!("expected update, got {other:?}"),
    }

    let detail = blog.posts.post_detail(post.id).await.unwrap();
    assert_eq!(detail.post.text, "revised");
    assert_eq!(blog.feeds.home_feed(PageNumber::FIRST).await.unwrap().total, 1);
}

#[tokio::test]
async fn post_detail_lists_comments_newest_first() {
    let blog = Blog::new();
    let author = blog.user("author").await;
    let reader = blog.user("reader").await;
    let post = blog.post(&author, "hello").await;
    blog.post(&author, "another").await;

    for text in ["one", "two"] {
        blog.posts
            .add_comment(reader.id, post.id, CommentDraft::new(text))
            .await
            .unwrap();
    }

    let detail = blog.posts.post_detail(post.id).await.unwrap();
    assert_eq!(detail.author_post_count, 2);
    let comments: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(comments, vec!["two", "one"]);
    assert_eq!(detail.comments[0].author.username, "reader");
}

#[tokio::test]
async fn unknown_slug_and_username_are_not_found() {
    let blog = Blog::new();

    let err = blog
        .feeds
        .group_feed("missing", PageNumber::FIRST)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "group", .. }));

    let err = blog
        .feeds
        .profile_feed("ghost", None, PageNumber::FIRST)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "user", .. }));

    let err = blog.posts.post_detail(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "post", .. }));
}

#[tokio::test]
async fn duplicate_group_slug_is_rejected() {
    let blog = Blog::new();
    blog.group("Group one", "g1").await;

    let err = blog
        .groups
        .create_group(GroupDraft {
            title: "Again".to_string(),
            slug: "g1".to_string(),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(blog.groups.list_groups().await.unwrap().len(), 1);
}
