//! Sign-in flow and member-only pages over HTTP.
//!
//! The identity provider is a mock issuer started next to each storefront.
//!
//! Run with: cargo test -p gemline-integration-tests

#![allow(clippy::unwrap_used)]

use gemline_core::entities::{Product, Record};
use gemline_integration_tests::{TestContext, product};
use gemline_storefront::content_store::ContentStore;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

fn catalog() -> Vec<serde_json::Value> {
    vec![
        product("ring-1", "Aurora Diamond Ring", 2450, true),
        product("chain-1", "Trade Rope Chain", 180, false),
    ]
}

#[tokio::test]
async fn test_gated_page_returns_after_sign_in() {
    let ctx = TestContext::spawn(catalog()).await;

    let prompt = ctx.get("/upload").await;
    assert_eq!(prompt.url().path(), "/auth");
    assert!(
        prompt
            .text()
            .await
            .unwrap()
            .contains("Sign in to upload products")
    );

    let landed = ctx.sign_in("wholesaler").await;
    assert_eq!(landed.status(), StatusCode::OK);
    assert_eq!(landed.url().path(), "/upload");
    assert!(landed.text().await.unwrap().contains("Upload Product"));
}

#[tokio::test]
async fn test_sign_in_defaults_to_dashboard() {
    let ctx = TestContext::spawn(catalog()).await;

    let landed = ctx.sign_in("premium-retailer").await;
    assert_eq!(landed.url().path(), "/dashboard");
    let body = landed.text().await.unwrap();
    assert!(body.contains("Ada!"));
    assert!(body.contains("Premium Retailer Dashboard"));

    // Already signed in: the sign-in page forwards to the dashboard.
    assert_eq!(ctx.get("/auth").await.url().path(), "/dashboard");
}

#[tokio::test]
async fn test_dashboard_renders_empty_when_store_is_down() {
    let ctx = TestContext::spawn_unreachable().await;

    let landed = ctx.sign_in("wholesaler").await;
    assert_eq!(landed.status(), StatusCode::OK);
    assert_eq!(landed.url().path(), "/dashboard");
    let body = landed.text().await.unwrap();
    assert_eq!(body.matches(r#"<span class="stat-value">0</span>"#).count(), 3);
    assert!(body.contains("No products yet."));
    assert!(body.contains("You're all caught up."));

    let catalog = ctx.get("/catalog").await;
    assert_eq!(catalog.status(), StatusCode::OK);
    assert!(
        catalog
            .text()
            .await
            .unwrap()
            .contains("No products found matching your criteria.")
    );
}

#[tokio::test]
async fn test_members_see_member_only_products() {
    let ctx = TestContext::spawn(catalog()).await;
    ctx.sign_in("public").await;

    let body = ctx.get("/catalog").await.text().await.unwrap();
    assert!(body.contains("Aurora Diamond Ring"));
    assert!(body.contains("Trade Rope Chain"));
}

#[tokio::test]
async fn test_profile_shows_member_details() {
    let ctx = TestContext::spawn(Vec::new()).await;
    ctx.sign_in("intermediate-retailer").await;

    let resp = ctx.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("ada@gemline.io"));
    assert!(body.contains("January 5, 2024"));
}

#[tokio::test]
async fn test_forged_state_is_rejected() {
    let ctx = TestContext::spawn(Vec::new()).await;

    let resp = ctx
        .get("/auth/callback?code=mock-auth-code&state=forged")
        .await;
    assert_eq!(resp.url().path(), "/auth");
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Sign-in failed, please try again")
    );

    assert_eq!(ctx.get("/dashboard").await.url().path(), "/auth");
}

#[tokio::test]
async fn test_provider_error_is_reported() {
    let ctx = TestContext::spawn(Vec::new()).await;
    let resp = ctx
        .get("/auth/callback?error=access_denied&error_description=User+cancelled")
        .await;

    assert_eq!(resp.url().path(), "/auth");
    assert!(resp.text().await.unwrap().contains("Sign-in was cancelled"));
}

#[tokio::test]
async fn test_logout_ends_session_at_provider() {
    let ctx = TestContext::spawn(Vec::new()).await;
    ctx.sign_in("premium-retailer").await;
    assert_eq!(ctx.get("/dashboard").await.url().path(), "/dashboard");

    let resp = ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.url().path(), "/");
    assert_eq!(ctx.issuer.logout_count(), 1);

    assert_eq!(ctx.get("/dashboard").await.url().path(), "/auth");
}

#[tokio::test]
async fn test_upload_creates_pending_product() {
    let ctx = TestContext::spawn(catalog()).await;
    ctx.sign_in("wholesaler").await;

    let form = Form::new()
        .text("name", "Opal Halo Ring")
        .text("sku", "JWL-654321-OPAL")
        .text("description", "Ethiopian opal in a diamond halo.")
        .text("price", "640.00")
        .text("visible_to_public", "on")
        .text("visible_to_wholesalers", "on")
        .part(
            "images",
            Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .file_name("opal.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );

    let resp = ctx
        .client
        .post(ctx.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Opal Halo Ring was submitted and is pending approval.")
    );

    let products = ctx.store.get_all(Product::COLLECTION).await.unwrap();
    let created = products
        .iter()
        .find(|p| p["sku"] == "JWL-654321-OPAL")
        .unwrap();
    assert_eq!(created["productName"], "Opal Halo Ring");
    assert_eq!(created["moderationStatus"], "pending");
    assert_eq!(created["isVisibleToPublic"], true);
    assert_eq!(created["isVisibleToRetailers"], false);
    assert_eq!(created["isVisibleToWholesalers"], true);
    assert_eq!(created["imageCount"], 1);
}

#[tokio::test]
async fn test_upload_without_images_is_rejected() {
    let ctx = TestContext::spawn(Vec::new()).await;
    ctx.sign_in("wholesaler").await;

    let form = Form::new()
        .text("name", "Opal Halo Ring")
        .text("sku", "JWL-654321-OPAL")
        .text("description", "Ethiopian opal in a diamond halo.")
        .text("price", "640.00");

    let resp = ctx
        .client
        .post(ctx.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.store.get_all(Product::COLLECTION).await.unwrap().is_empty());
}
