//! End-to-end behaviour of the resolution layer against the in-memory page.

use std::sync::Arc;

use locator_core::{
    union_query, ColumnPolicy, ExpressionList, LocatorError, ResolveOptions, Resolver, Scope,
    StaticElement, StaticPage,
};

fn list(items: &[&str]) -> ExpressionList {
    ExpressionList::new(items.iter().copied()).expect("non-empty list")
}

fn login_button() -> ExpressionList {
    list(&[
        r#"[data-test="login-button"]"#,
        "#login-button",
        r#"[type="submit"]"#,
    ])
}

#[tokio::test]
async fn login_button_resolves_without_touching_later_fallbacks() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new("#user-name"),
        StaticElement::new("#login-button").matching(r#"[type="submit"]"#),
    ]));
    let resolver = Resolver::new(page.clone());

    let handle = resolver
        .resolve_required(&Scope::Document, &login_button(), ResolveOptions::interactive())
        .await
        .expect("login button resolves");

    assert_eq!(handle.element, StaticPage::element_ref(1));
    assert_eq!(handle.expression, "#login-button");
    assert_eq!(handle.expression_index, 1);
    assert_eq!(page.query_count(r#"[data-test="login-button"]"#), 1);
    assert_eq!(page.query_count("#login-button"), 1);
    assert_eq!(page.query_count(r#"[type="submit"]"#), 0);
}

#[tokio::test]
async fn first_expression_that_passes_wins_over_document_order() {
    // The later expression matches an earlier DOM node; list order still wins.
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".legacy"),
        StaticElement::new("[data-test=\"title\"]"),
    ]));
    let resolver = Resolver::new(page.clone());

    let handle = resolver
        .resolve_required(
            &Scope::Document,
            &list(&["[data-test=\"title\"]", ".legacy"]),
            ResolveOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(handle.element, StaticPage::element_ref(1));
    assert_eq!(page.query_count(".legacy"), 0);
}

#[tokio::test]
async fn missing_element_is_absent_or_not_found() {
    let page = Arc::new(StaticPage::new(vec![StaticElement::new(".title").hidden()]));
    let resolver = Resolver::new(page);
    let expressions = list(&[".shopping_cart_badge", ".title"]);

    let optional = resolver
        .resolve_optional(&Scope::Document, &expressions)
        .await
        .unwrap();
    assert!(optional.is_none());

    let err = resolver
        .resolve_required(&Scope::Document, &expressions, ResolveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LocatorError::LocatorNotFound {
            expressions: vec![".shopping_cart_badge".to_string(), ".title".to_string()],
        }
    );
    assert!(err.to_string().contains(".shopping_cart_badge, .title"));
}

#[tokio::test]
async fn optional_resolution_is_idempotent() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".b").hidden(),
        StaticElement::new(".a"),
        StaticElement::new(".b"),
    ]));
    let resolver = Resolver::new(page);
    let expressions = list(&[".b", ".a"]);

    let first = resolver
        .resolve_optional(&Scope::Document, &expressions)
        .await
        .unwrap();
    let second = resolver
        .resolve_optional(&Scope::Document, &expressions)
        .await
        .unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn union_of_repeated_expressions() {
    let combined = union_query(["a", "b", "a"]);
    assert_eq!(combined.members(), ["a", "b"]);
    assert_eq!(combined.as_str(), "a,b");
}

#[tokio::test]
async fn collection_reads_follow_document_order() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".inventory_item_name").text(" Sauce Labs Backpack "),
        StaticElement::new("[data-test=\"inventory-item-name\"]").text("Sauce Labs Bike Light\n"),
        StaticElement::new(".inventory_item_name").text("\tSauce Labs Onesie"),
    ]));
    let resolver = Resolver::new(page.clone());
    let names = list(&["[data-test=\"inventory-item-name\"]", ".inventory_item_name"]);

    let collection = resolver.resolve_collection(&Scope::Document, &names);
    assert_eq!(page.total_queries(), 0, "collections are lazy");
    assert_eq!(collection.count().await.unwrap(), 3);

    let trimmed = resolver
        .read_texts(&Scope::Document, &names, true)
        .await
        .unwrap();
    assert_eq!(
        trimmed,
        ["Sauce Labs Backpack", "Sauce Labs Bike Light", "Sauce Labs Onesie"]
    );

    let raw = resolver
        .read_texts(&Scope::Document, &names, false)
        .await
        .unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[0], " Sauce Labs Backpack ");
    assert_eq!(raw[1], "Sauce Labs Bike Light\n");
}

#[tokio::test]
async fn batch_read_propagates_stale_rows() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".price").text("$1"),
        StaticElement::new(".price").text("$2").failing_text_reads(1),
    ]));
    let resolver = Resolver::new(page);

    let err = resolver
        .read_texts(&Scope::Document, &list(&[".price"]), true)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn text_filter_picks_matching_row() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".inventory_item_name").text("Sauce Labs Backpack"),
        StaticElement::new(".inventory_item_name").text("Sauce Labs Bolt T-Shirt"),
    ]));
    let resolver = Resolver::new(page);

    let first = resolver
        .resolve_collection(&Scope::Document, &list(&[".inventory_item_name"]))
        .filter_has_text("Bolt")
        .first()
        .await
        .unwrap();
    assert_eq!(first, Some(StaticPage::element_ref(1)));
}

fn cart_page(price_rows: usize) -> StaticPage {
    let mut elements = Vec::new();
    let rows = [("Sauce Labs Backpack", "$29.99"), ("Sauce Labs Bike Light", "$9.99"), ("Sauce Labs Onesie", "$7.99")];
    for (row, (name, price)) in rows.iter().enumerate() {
        let row_idx = elements.len();
        elements.push(StaticElement::new(".cart_item"));
        elements.push(StaticElement::new(".inventory_item_name").child_of(row_idx).text(*name));
        if row < price_rows {
            elements.push(StaticElement::new(".inventory_item_price").child_of(row_idx).text(*price));
        }
    }
    // Same classes outside the cart rows must not leak into the columns.
    elements.push(StaticElement::new(".inventory_item_name").text("Recommended"));
    StaticPage::new(elements)
}

#[tokio::test]
async fn paired_columns_zip_within_row_scope() {
    let resolver = Resolver::new(Arc::new(cart_page(3)));
    let rows = resolver.resolve_collection(&Scope::Document, &list(&[".cart_item", "[data-test=\"inventory-item\"]"]));

    let paired = resolver
        .read_columns(
            "cart items",
            &rows.as_scope(),
            &list(&[".inventory_item_name"]),
            &list(&[".inventory_item_price"]),
            ColumnPolicy::Strict,
        )
        .await
        .unwrap();
    assert!(paired.mismatch.is_none());
    assert_eq!(paired.rows.len(), 3);
    assert_eq!(paired.rows[2], ("Sauce Labs Onesie".to_string(), "$7.99".to_string()));
}

#[tokio::test]
async fn mismatched_columns_truncate_or_fail() {
    let resolver = Resolver::new(Arc::new(cart_page(2)));
    let scope = resolver
        .resolve_collection(&Scope::Document, &list(&[".cart_item"]))
        .as_scope();
    let names = list(&[".inventory_item_name"]);
    let prices = list(&[".inventory_item_price"]);

    let lenient = resolver
        .read_columns("cart items", &scope, &names, &prices, ColumnPolicy::Lenient)
        .await
        .unwrap();
    assert_eq!(lenient.rows.len(), 2);
    assert_eq!(lenient.mismatch.map(|m| (m.left, m.right)), Some((3, 2)));

    let strict = resolver
        .read_columns("cart items", &scope, &names, &prices, ColumnPolicy::Strict)
        .await;
    assert!(matches!(
        strict,
        Err(LocatorError::CollectionMismatch { left: 3, right: 2, .. })
    ));
}

#[tokio::test]
async fn read_text_retries_once_after_detach() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".title").text("  Products  ").failing_text_reads(1),
    ]));
    let resolver = Resolver::new(page.clone());

    let text = resolver
        .read_text(&Scope::Document, &list(&[".title"]), true)
        .await
        .unwrap();
    assert_eq!(text.as_deref(), Some("Products"));
    assert_eq!(page.text_read_count(0), 2);
    assert_eq!(page.query_count(".title"), 2);
}

#[tokio::test]
async fn read_text_gives_up_after_second_stale_read() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".title").text("Products").failing_text_reads(2),
    ]));
    let resolver = Resolver::new(page.clone());

    let text = resolver
        .read_text(&Scope::Document, &list(&[".title"]), true)
        .await
        .unwrap();
    assert!(text.is_none());
    assert_eq!(page.text_read_count(0), 2);
}

#[tokio::test]
async fn read_text_respects_trim_flag() {
    let page = Arc::new(StaticPage::new(vec![StaticElement::new("#total").text(" Total: $32.39 ")]));
    let resolver = Resolver::new(page);
    let total = list(&["#total"]);

    let raw = resolver.read_text(&Scope::Document, &total, false).await.unwrap();
    assert_eq!(raw.as_deref(), Some(" Total: $32.39 "));
    let trimmed = resolver.read_text(&Scope::Document, &total, true).await.unwrap();
    assert_eq!(trimmed.as_deref(), Some("Total: $32.39"));
}

#[test]
fn absent_badge_counts_as_zero() {
    let page = Arc::new(StaticPage::new(vec![StaticElement::new(".title").text("Your Cart")]));
    let resolver = Resolver::new(page);
    let badge = list(&[".shopping_cart_badge"]);

    let count = tokio_test::block_on(resolver.read_count(&Scope::Document, &badge)).unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn badge_count_is_parsed() {
    let page = Arc::new(StaticPage::new(vec![StaticElement::new(".shopping_cart_badge").text("2")]));
    let resolver = Resolver::new(page);

    let count = resolver
        .read_count(&Scope::Document, &list(&[".shopping_cart_badge"]))
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn torn_down_scope_counts_as_no_match() {
    let page = Arc::new(StaticPage::new(vec![
        StaticElement::new(".cart_item"),
        StaticElement::new(".remove").child_of(0),
        StaticElement::new(".inventory_item_price").child_of(0).text("$29.99"),
    ]));
    let resolver = Resolver::new(page.clone());

    let row = resolver
        .resolve_required(&Scope::Document, &list(&[".cart_item"]), ResolveOptions::default())
        .await
        .unwrap();
    page.detach(0);

    let err = resolver
        .resolve_required(&row.scope(), &list(&[".remove"]), ResolveOptions::interactive())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LocatorError::LocatorNotFound {
            expressions: vec![".remove".to_string()],
        }
    );

    let price = list(&[".inventory_item_price"]);
    let optional = resolver.resolve_optional(&row.scope(), &price).await.unwrap();
    assert!(optional.is_none());
    let text = resolver.read_text(&row.scope(), &price, true).await.unwrap();
    assert!(text.is_none());
}
