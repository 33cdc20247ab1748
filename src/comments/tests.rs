//! Tests for comments module
//!
//! These tests verify:
//! - Comment validation
//! - Root and reply creation against an in-memory SQLite store
//! - Thread listing, replies and the depth ceiling
//! - Update and soft delete behaviour

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::migrations::test_support::setup_test_db;
    use crate::common::{ServiceError, Validator};
    use crate::posts::models::CreateBlogPostRequest;
    use crate::posts::{PostStore, SqlitePostStore};
    use super::super::models::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
    use super::super::tree::DEFAULT_MAX_REPLY_DEPTH;
    use std::sync::Arc;

    struct Fixture {
        service: CommentService,
        posts: Arc<SqlitePostStore>,
    }

    async fn fixture_with_depth(max_depth: usize) -> Fixture {
        let pool = setup_test_db().await;
        let posts = Arc::new(SqlitePostStore::new(pool.clone()));
        let comments = Arc::new(SqliteCommentStore::new(pool));
        Fixture {
            service: CommentService::new(comments, posts.clone(), max_depth),
            posts,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_depth(DEFAULT_MAX_REPLY_DEPTH).await
    }

    async fn create_post(fixture: &Fixture, title: &str) -> i64 {
        fixture
            .posts
            .create(&CreateBlogPostRequest {
                title: title.to_string(),
                excerpt: "Excerpt".to_string(),
                author: "Rahim".to_string(),
                image: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    fn comment(name: &str, text: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            name: name.to_string(),
            email: None,
            text: text.to_string(),
        }
    }

    fn ids(list: &[CommentResponse]) -> Vec<i64> {
        list.iter().map(|c| c.id).collect()
    }

    // ---- Validation ----

    #[test]
    fn test_create_validation() {
        let valid = comment("Alice", "Great post");
        assert!(valid.validate(&valid).is_valid);

        let blank = comment("  ", "");
        let result = blank.validate(&blank);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "text"]);

        let long_name = comment(&"n".repeat(101), "text");
        assert!(!long_name.validate(&long_name).is_valid);

        let long_text = comment("Alice", &"t".repeat(5001));
        assert!(!long_text.validate(&long_text).is_valid);
    }

    #[test]
    fn test_email_validation() {
        for (email, valid) in [
            (None, true),
            (Some(""), true),
            (Some("alice@example.com"), true),
            (Some("alice.example.com"), false),
        ] {
            let req = CreateCommentRequest {
                email: email.map(str::to_string),
                ..comment("Alice", "Hi")
            };
            assert_eq!(req.validate(&req).is_valid, valid, "{:?}", email);
        }
    }

    #[test]
    fn test_update_validation() {
        let empty = UpdateCommentRequest {
            text: Some("   ".to_string()),
        };
        assert!(!empty.validate(&empty).is_valid);

        let absent = UpdateCommentRequest::default();
        assert!(absent.validate(&absent).is_valid);
    }

    // ---- Creation ----

    #[tokio::test]
    async fn test_alice_and_bob_thread() {
        let fx = fixture().await;
        let post = create_post(&fx, "Saving for Eid").await;

        let alice = fx
            .service
            .create_root(post, comment("Alice", "Great post"))
            .await
            .unwrap();
        let bob = fx
            .service
            .create_reply(alice.id, comment("Bob", "Agreed"))
            .await
            .unwrap();

        let thread = fx.service.list_for_post(post).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].id, alice.id);
        assert_eq!(thread[0].parent_id, None);
        assert_eq!(thread[0].replies.len(), 1);
        assert_eq!(thread[0].replies[0].id, bob.id);
        assert_eq!(thread[0].replies[0].parent_id, Some(alice.id));
        assert_eq!(thread[0].replies[0].text, "Agreed");
    }

    #[tokio::test]
    async fn test_reply_post_id_taken_from_parent() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;
        let other = create_post(&fx, "Second").await;

        let root = fx
            .service
            .create_root(post, comment("Alice", "Root"))
            .await
            .unwrap();

        let body: CreateCommentRequest = serde_json::from_value(serde_json::json!({
            "blog_post_id": other,
            "parent_id": 12345,
            "name": "Bob",
            "text": "Reply",
        }))
        .unwrap();
        let reply = fx.service.create_reply(root.id, body).await.unwrap();

        assert_eq!(reply.blog_post_id, post);
        assert_eq!(reply.parent_id, Some(root.id));
        assert!(fx.service.list_for_post(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_root_on_missing_post_is_not_found() {
        let fx = fixture().await;

        let result = fx.service.create_root(42, comment("Alice", "Hi")).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reply_to_missing_parent_is_not_found() {
        let fx = fixture().await;

        let result = fx.service.create_reply(42, comment("Bob", "Hi")).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_deleted_post_takes_no_new_comments() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;
        let root = fx
            .service
            .create_root(post, comment("Alice", "Hi"))
            .await
            .unwrap();

        assert!(fx.posts.soft_delete(post).await.unwrap());

        let root_result = fx.service.create_root(post, comment("Carol", "Late")).await;
        assert!(matches!(root_result, Err(ServiceError::NotFound(ref e)) if e == "Post"));

        let reply_result = fx.service.create_reply(root.id, comment("Bob", "Late")).await;
        assert!(matches!(reply_result, Err(ServiceError::NotFound(ref e)) if e == "Post"));

        assert!(fx.service.list_for_post(post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_comment_not_stored() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let result = fx.service.create_root(post, comment("Alice", "  ")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert!(fx.service.list_for_post(post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_email_stored_as_absent() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let created = fx
            .service
            .create_root(
                post,
                CreateCommentRequest {
                    email: Some("   ".to_string()),
                    ..comment("Alice", "Hi")
                },
            )
            .await
            .unwrap();

        assert_eq!(created.email, None);
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("replies_truncated").is_none());
    }

    // ---- Reads ----

    #[tokio::test]
    async fn test_list_for_post_returns_roots_with_their_descendants() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let first = fx.service.create_root(post, comment("A", "1")).await.unwrap();
        let second = fx.service.create_root(post, comment("B", "2")).await.unwrap();
        let r1 = fx.service.create_reply(first.id, comment("C", "1.1")).await.unwrap();
        let r11 = fx.service.create_reply(r1.id, comment("D", "1.1.1")).await.unwrap();
        let r2 = fx.service.create_reply(second.id, comment("E", "2.1")).await.unwrap();

        let thread = fx.service.list_for_post(post).await.unwrap();

        assert_eq!(ids(&thread), vec![second.id, first.id]);
        assert_eq!(ids(&thread[0].replies), vec![r2.id]);
        assert_eq!(ids(&thread[1].replies), vec![r1.id]);
        assert_eq!(ids(&thread[1].replies[0].replies), vec![r11.id]);
    }

    #[tokio::test]
    async fn test_get_by_id_includes_subtree() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let root = fx.service.create_root(post, comment("A", "root")).await.unwrap();
        let reply = fx.service.create_reply(root.id, comment("B", "reply")).await.unwrap();

        let tree = fx.service.get_by_id(root.id).await.unwrap();
        assert_eq!(ids(&tree.replies), vec![reply.id]);

        let leaf = fx.service.get_by_id(reply.id).await.unwrap();
        assert!(leaf.replies.is_empty());

        assert!(matches!(
            fx.service.get_by_id(999).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_replies() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let root = fx.service.create_root(post, comment("A", "root")).await.unwrap();
        let first = fx.service.create_reply(root.id, comment("B", "first")).await.unwrap();
        let second = fx.service.create_reply(root.id, comment("C", "second")).await.unwrap();
        let nested = fx.service.create_reply(first.id, comment("D", "nested")).await.unwrap();

        let replies = fx.service.list_replies(root.id).await.unwrap();
        assert_eq!(ids(&replies), vec![first.id, second.id]);
        assert_eq!(ids(&replies[0].replies), vec![nested.id]);

        assert!(matches!(
            fx.service.list_replies(999).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_depth_ceiling_truncates_listing() {
        let fx = fixture_with_depth(2).await;
        let post = create_post(&fx, "First").await;

        let root = fx.service.create_root(post, comment("A", "0")).await.unwrap();
        let l1 = fx.service.create_reply(root.id, comment("B", "1")).await.unwrap();
        let l2 = fx.service.create_reply(l1.id, comment("C", "2")).await.unwrap();
        fx.service.create_reply(l2.id, comment("D", "3")).await.unwrap();

        let thread = fx.service.list_for_post(post).await.unwrap();
        let level2 = &thread[0].replies[0].replies[0];

        assert_eq!(level2.id, l2.id);
        assert!(level2.replies.is_empty());
        assert!(level2.replies_truncated);

        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json[0]["replies"][0]["replies"][0]["replies_truncated"], true);
    }

    // ---- Updates ----

    #[tokio::test]
    async fn test_update_then_get_reflects_new_text() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let original = fx
            .service
            .create_root(
                post,
                CreateCommentRequest {
                    email: Some("alice@example.com".to_string()),
                    ..comment("Alice", "Frist!")
                },
            )
            .await
            .unwrap();

        fx.service
            .update(
                original.id,
                UpdateCommentRequest {
                    text: Some("First!".to_string()),
                },
            )
            .await
            .unwrap();

        let fetched = fx.service.get_by_id(original.id).await.unwrap();
        assert_eq!(fetched.text, "First!");
        assert_eq!(fetched.name, original.name);
        assert_eq!(fetched.email, original.email);
        assert_eq!(fetched.blog_post_id, original.blog_post_id);
        assert_eq!(fetched.parent_id, original.parent_id);
        assert_eq!(fetched.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_text_and_missing_comment() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;
        let root = fx.service.create_root(post, comment("A", "keep")).await.unwrap();

        let empty = fx
            .service
            .update(
                root.id,
                UpdateCommentRequest {
                    text: Some(String::new()),
                },
            )
            .await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));
        assert_eq!(fx.service.get_by_id(root.id).await.unwrap().text, "keep");

        let missing = fx
            .service
            .update(
                999,
                UpdateCommentRequest {
                    text: Some("x".to_string()),
                },
            )
            .await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_hides_comment_and_keeps_replies_addressable() {
        let fx = fixture().await;
        let post = create_post(&fx, "First").await;

        let root = fx.service.create_root(post, comment("A", "root")).await.unwrap();
        let reply = fx.service.create_reply(root.id, comment("B", "reply")).await.unwrap();

        fx.service.delete(root.id).await.unwrap();

        assert!(matches!(
            fx.service.get_by_id(root.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.delete(root.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(fx.service.list_for_post(post).await.unwrap().is_empty());

        let orphan = fx.service.get_by_id(reply.id).await.unwrap();
        assert_eq!(orphan.parent_id, Some(root.id));
    }
}
