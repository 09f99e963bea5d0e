use wp_client::{ClientError, CommentQuery, Post, WordPressClient};

fn live_client() -> WordPressClient {
    let url = std::env::var("WP_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/xmlrpc.php".to_string());
    let user = std::env::var("WP_USER").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("WP_PASSWORD").unwrap_or_else(|_| "password".to_string());
    WordPressClient::connect(url, user, password).expect("client must build")
}

#[test]
#[ignore = "requires running WordPress with XML-RPC enabled"]
fn xmlrpc_smoke_flow() {
    let mut client = live_client();

    let blogs = client
        .get_users_blogs()
        .expect("getUsersBlogs must succeed")
        .collect::<Result<Vec<_>, _>>()
        .expect("blogs must decode");
    assert!(!blogs.is_empty());
    client.select_blog(blogs[0].id);

    let methods = client
        .supported_methods()
        .expect("supportedMethods must succeed");
    assert!(methods.iter().any(|m| m == "metaWeblog.newPost"));

    let categories = client
        .get_category_list(true)
        .expect("getCategories must succeed")
        .to_vec();
    let category_ids: Vec<i64> = categories.iter().take(1).map(|c| c.id).collect();

    let draft = Post {
        title: "smoke title".to_string(),
        description: "smoke content".to_string(),
        categories: category_ids,
        ..Post::default()
    };
    let post_id = client.new_post(&draft, false).expect("newPost must succeed");

    let fetched = client.get_post(post_id).expect("getPost must succeed");
    assert_eq!(fetched.id, post_id);
    assert_eq!(fetched.title, "smoke title");

    let edited = Post {
        title: "smoke title updated".to_string(),
        ..fetched
    };
    client
        .edit_post(post_id, &edited, true)
        .expect("editPost must succeed");

    let last = client.get_last_post().expect("getRecentPosts must succeed");
    assert_eq!(last.id, post_id);

    client
        .get_comments(&CommentQuery {
            post_id,
            ..CommentQuery::default()
        })
        .expect("getComments must succeed")
        .for_each(|comment| {
            comment.expect("comment must decode");
        });

    assert!(client.delete_post(post_id).expect("deletePost must succeed"));

    let after_delete = client.get_post(post_id);
    assert!(matches!(after_delete, Err(ClientError::WordPress(err)) if err.code == 404));
}

#[test]
#[ignore = "requires running WordPress with XML-RPC enabled"]
fn wrong_password_is_a_fault() {
    let url = std::env::var("WP_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/xmlrpc.php".to_string());
    let client = WordPressClient::connect(url, "nobody", "wrong").expect("client must build");

    let err = client.get_user_info().expect_err("login must fail");
    let wp = err.as_wordpress().expect("must be a WordPress fault");
    assert_eq!(wp.code, 403);
}
