//! API integration tests
//!
//! These run against a live server: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:5555/api";

/// Unique suffix so repeated runs do not collide on unique columns
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    format!("{}{}", prefix, nanos % 1_000_000_000)
}

/// Cookie-holding client, required for the session cookie
fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Sign up a fresh user and return the logged-in client with its username
async fn signup_user(prefix: &str) -> (Client, String) {
    let client = new_client();
    let username = unique(prefix);

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret42"
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), 201);
    (client, username)
}

/// Create a library for the given client and return its id
async fn create_library(client: &Client, name: &str, private: bool) -> i64 {
    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": name, "private": private }))
        .send()
        .await
        .expect("Failed to send create library request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse library");
    body["id"].as_i64().expect("No library ID")
}

/// Attach a brand-new book to a library, optionally rated, and return its id
async fn add_new_book(client: &Client, library_id: i64, title: &str, rating: Option<i64>) -> i64 {
    let mut payload = json!({ "title": title, "author": "Test Author" });
    if let Some(r) = rating {
        payload["rating"] = json!(r);
    }

    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signup_then_login() {
    let (_, username) = signup_user("login").await;

    // A fresh client must be able to log in with the same credentials
    let client = new_client();
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": username, "password": "secret42" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], username.as_str());
    assert!(body["password_hash"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_signup_missing_fields() {
    let client = new_client();

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({ "username": unique("nofields") }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_client_error());
}

#[tokio::test]
#[ignore]
async fn test_signup_duplicate_username_and_email() {
    let (_, username) = signup_user("dup").await;

    // Same username, different email
    let client = new_client();
    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@other.example.com", unique("dup")),
            "password": "secret42"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Username already taken");

    // Different username, same email
    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "username": unique("dup"),
            "email": format!("{}@example.com", username),
            "password": "secret42"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
#[ignore]
async fn test_login_failures_are_distinct() {
    let (_, username) = signup_user("badpw").await;
    let client = new_client();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": unique("ghost"), "password": "secret42" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "No such user");

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Incorrect password");
}

#[tokio::test]
#[ignore]
async fn test_logout_clears_session() {
    let (client, _) = signup_user("logout").await;

    let response = client
        .post(format!("{}/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/user_session", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // Logout again: still 204
    let response = client
        .post(format!("{}/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_user_session_includes_libraries() {
    let (client, username) = signup_user("sess").await;
    let library_id = create_library(&client, "Session Shelf", false).await;
    add_new_book(&client, library_id, &unique("Sess Book "), Some(4)).await;

    let response = client
        .get(format!("{}/user_session", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["username"], username.as_str());

    let libraries = body["libraries"].as_array().expect("No libraries array");
    assert_eq!(libraries.len(), 1);
    assert_eq!(libraries[0]["id"].as_i64(), Some(library_id));

    let books = libraries[0]["books"].as_array().expect("No books array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["rating"]["userRating"].as_i64(), Some(4));
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/libraries", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_library_name_bounds() {
    let (client, _) = signup_user("name").await;

    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": "ab" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": "abc" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_rename_and_delete_library() {
    let (client, _) = signup_user("ren").await;
    let library_id = create_library(&client, "Before Rename", false).await;

    let response = client
        .patch(format!("{}/libraries/{}", BASE_URL, library_id))
        .json(&json!({ "name": "After Rename" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "After Rename");

    let response = client
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/libraries/{}", BASE_URL, library_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_private_library_hidden_from_others() {
    let (owner, _) = signup_user("owner").await;
    let private_id = create_library(&owner, "Private Shelf", true).await;
    let public_id = create_library(&owner, "Public Shelf", false).await;

    // Owner sees their private library
    let response = owner
        .get(format!("{}/libraries/{}", BASE_URL, private_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Another session gets 404 for the private one, 200 for the public one
    let (other, _) = signup_user("other").await;
    let response = other
        .get(format!("{}/libraries/{}", BASE_URL, private_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = other
        .get(format!("{}/libraries/{}", BASE_URL, public_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_foreign_library_not_modifiable() {
    let (owner, _) = signup_user("fown").await;
    let library_id = create_library(&owner, "Owned Shelf", false).await;

    let (other, _) = signup_user("foth").await;
    let response = other
        .patch(format!("{}/libraries/{}", BASE_URL, library_id))
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = other
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_pairing_conflict_and_readd() {
    let (client, _) = signup_user("pair").await;
    let library_id = create_library(&client, "Pairing Shelf", false).await;
    let book_id = add_new_book(&client, library_id, &unique("Paired Book "), None).await;

    // Second attach of the same book conflicts
    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Remove, then re-add succeeds
    let response = client
        .delete(format!("{}/libraries/{}/books/{}", BASE_URL, library_id, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_add_book_unknown_id() {
    let (client, _) = signup_user("unk").await;
    let library_id = create_library(&client, "Unknown Shelf", false).await;

    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .json(&json!({ "book_id": 999_999_999 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_rating_bounds_on_add_and_update() {
    let (client, _) = signup_user("bound").await;
    let library_id = create_library(&client, "Bounds Shelf", false).await;

    // Out-of-range initial rating is rejected
    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, library_id))
        .json(&json!({ "title": unique("Bad Rating "), "rating": 6 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Boundary values are accepted on add
    let low_id = add_new_book(&client, library_id, &unique("One Star "), Some(1)).await;
    add_new_book(&client, library_id, &unique("Five Stars "), Some(5)).await;

    // Out-of-range update is rejected
    for bad in [0, 6] {
        let response = client
            .patch(format!("{}/libraries/{}/books/{}", BASE_URL, library_id, low_id))
            .json(&json!({ "rating": bad }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 400);
    }

    // Missing rating is rejected
    let response = client
        .patch(format!("{}/libraries/{}/books/{}", BASE_URL, library_id, low_id))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Boundary update is accepted
    let response = client
        .patch(format!("{}/libraries/{}/books/{}", BASE_URL, library_id, low_id))
        .json(&json!({ "rating": 5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rating"]["userRating"].as_i64(), Some(5));
}

#[tokio::test]
#[ignore]
async fn test_global_rating_average() {
    let title = unique("Shared Book ");

    // First user creates and rates the book 3
    let (first, _) = signup_user("avg1").await;
    let first_lib = create_library(&first, "Avg Shelf One", false).await;
    let book_id = add_new_book(&first, first_lib, &title, Some(3)).await;

    // Second user attaches the same book and rates it 5
    let (second, _) = signup_user("avg2").await;
    let second_lib = create_library(&second, "Avg Shelf Two", false).await;
    let response = second
        .post(format!("{}/libraries/{}/books", BASE_URL, second_lib))
        .json(&json!({ "book_id": book_id, "rating": 5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rating"]["globalRating"].as_f64(), Some(4.0));
    assert_eq!(body["rating"]["userRating"].as_i64(), Some(5));

    // An unrated book reports null, not zero
    let unrated_id = add_new_book(&second, second_lib, &unique("Unrated "), None).await;
    let response = second
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    let unrated = books
        .as_array()
        .expect("No books array")
        .iter()
        .find(|b| b["id"].as_i64() == Some(unrated_id))
        .expect("Unrated book missing from catalog");
    assert!(unrated["rating"]["globalRating"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_library_delete_leaves_books_intact() {
    let title = unique("Survivor ");

    let (first, _) = signup_user("del1").await;
    let first_lib = create_library(&first, "Doomed Shelf", false).await;
    let book_id = add_new_book(&first, first_lib, &title, Some(4)).await;

    let (second, _) = signup_user("del2").await;
    let second_lib = create_library(&second, "Surviving Shelf", false).await;
    let response = second
        .post(format!("{}/libraries/{}/books", BASE_URL, second_lib))
        .json(&json!({ "book_id": book_id, "rating": 2 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Delete the first library
    let response = first
        .delete(format!("{}/libraries/{}", BASE_URL, first_lib))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Book still exists and the second library's association survives
    let response = second
        .get(format!("{}/libraries/{}", BASE_URL, second_lib))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let books = body["books"].as_array().expect("No books array");
    let survivor = books
        .iter()
        .find(|b| b["id"].as_i64() == Some(book_id))
        .expect("Book lost with the deleted library");
    assert_eq!(survivor["rating"]["userRating"].as_i64(), Some(2));
    // The deleted library's rating no longer feeds the global average
    assert_eq!(survivor["rating"]["globalRating"].as_f64(), Some(2.0));
}

#[tokio::test]
#[ignore]
async fn test_min_rating_filter() {
    let (client, _) = signup_user("minr").await;
    let library_id = create_library(&client, "Min Rating Shelf", false).await;
    let five_id = add_new_book(&client, library_id, &unique("Top Book "), Some(5)).await;
    let three_id = add_new_book(&client, library_id, &unique("Mid Book "), Some(3)).await;

    let response = client
        .get(format!("{}/min_rating/5", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let books: Value = response.json().await.expect("Failed to parse response");
    let ids: Vec<i64> = books
        .as_array()
        .expect("No books array")
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();

    assert!(ids.contains(&five_id));
    assert!(!ids.contains(&three_id));
}

#[tokio::test]
#[ignore]
async fn test_many_ratings_filter() {
    let title = unique("Popular ");

    let (first, _) = signup_user("many1").await;
    let first_lib = create_library(&first, "Many Shelf One", false).await;
    let book_id = add_new_book(&first, first_lib, &title, Some(4)).await;

    let (second, _) = signup_user("many2").await;
    let second_lib = create_library(&second, "Many Shelf Two", false).await;
    let response = second
        .post(format!("{}/libraries/{}/books", BASE_URL, second_lib))
        .json(&json!({ "book_id": book_id, "rating": 5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Rated by two pairings: present at threshold 2
    let response = second
        .get(format!("{}/many_ratings/2", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let books: Value = response.json().await.expect("Failed to parse response");
    let ids: Vec<i64> = books
        .as_array()
        .expect("No books array")
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert!(ids.contains(&book_id));

    // Absent at threshold 3
    let response = second
        .get(format!("{}/many_ratings/3", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    let ids: Vec<i64> = books
        .as_array()
        .expect("No books array")
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert!(!ids.contains(&book_id));
}

#[tokio::test]
#[ignore]
async fn test_create_catalog_book() {
    let (client, _) = signup_user("cat").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": unique("Catalog Book ") }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["author"], "Unknown");
    assert!(body["rating"]["globalRating"].is_null());

    // Future published year is rejected
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": unique("Future Book "), "published_year": 3000 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_rating_applies_across_own_libraries() {
    let (client, _) = signup_user("multi").await;
    let first_lib = create_library(&client, "Multi Shelf One", false).await;
    let second_lib = create_library(&client, "Multi Shelf Two", false).await;

    let book_id = add_new_book(&client, first_lib, &unique("Twice Shelved "), Some(2)).await;
    let response = client
        .post(format!("{}/libraries/{}/books", BASE_URL, second_lib))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Rating through one library updates both association rows
    let response = client
        .patch(format!("{}/libraries/{}/books/{}", BASE_URL, first_lib, book_id))
        .json(&json!({ "rating": 4 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["rating"]["userRating"].as_i64(), Some(4));
    // Both rows now carry 4, so the global mean is 4 as well
    assert_eq!(body["rating"]["globalRating"].as_f64(), Some(4.0));
}
