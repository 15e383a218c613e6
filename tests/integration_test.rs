//! 集成測試

use std::collections::HashMap;
use std::sync::Arc;

use bom::auth::{hash_password, session_cookie, GateDecision, LoginOutcome, RequestGate};
use bom::calc::row::{ColumnValue, MaterialRow};
use bom::calc::{
    aggregate_materials, filter_materials, parse_remaining_inputs, parse_search_limit,
    sort_materials, Catalog, MaterialFilter, MemoryStore, ProductFilter, SortConfig,
};
use bom::model::{format_quantity, parse_quantity, FileOwner};
use bom::{AppConfig, BomError, Material, Product, Quantity, SessionAuthManager, Unit};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

struct Seeded {
    catalog: Catalog<MemoryStore>,
    steel: i64,
    glue: i64,
    bolt: i64,
    bike: i64,
    cart: i64,
}

/// 建立一個小型目錄：三個物料、兩個產品
fn seeded_catalog() -> Seeded {
    let mut store = MemoryStore::new();
    let kg = store.insert_unit("kg").unwrap();
    let pcs = store.insert_unit("pcs").unwrap();

    let steel = store
        .insert_material(
            &Material::from_input("Steel", vec!["Сталь".to_string()], Unit::new(kg, "kg"), "sheet")
                .unwrap(),
        )
        .unwrap();
    let glue = store
        .insert_material(&Material::from_input("Glue", vec![], Unit::new(kg, "kg"), "").unwrap())
        .unwrap();
    let bolt = store
        .insert_material(&Material::from_input("bolt M8", vec![], Unit::new(pcs, "pcs"), "").unwrap())
        .unwrap();

    let bike = store.insert_product(&Product::from_input("Bike", "city bike").unwrap()).unwrap();
    store.set_product_material(bike, steel, "2,5").unwrap();
    store.set_product_material(bike, glue, "as needed").unwrap();
    store.set_product_material(bike, bolt, "12").unwrap();

    let cart = store.insert_product(&Product::from_input("Cart", "").unwrap()).unwrap();
    store.set_product_material(cart, bolt, "4").unwrap();

    Seeded {
        catalog: Catalog::new(store),
        steel,
        glue,
        bolt,
        bike,
        cart,
    }
}

#[test]
fn test_catalog_to_requirements_flow() {
    let s = seeded_catalog();

    // 1. 聚合後每個物料只出現一次
    let materials = s.catalog.materials().unwrap();
    assert_eq!(materials.len(), 3);
    let bolt = materials.iter().find(|m| m.id == s.bolt).unwrap();
    let used_in: Vec<i64> = bolt.products.iter().map(|p| p.id).collect();
    assert_eq!(used_in, vec![s.bike, s.cart]);

    // 2. 篩選：被 Cart 使用的物料
    let filter = MaterialFilter::new().with_product_ids(vec![s.cart]);
    let for_cart = s.catalog.browse_materials(&filter, SortConfig::default()).unwrap();
    assert_eq!(for_cart.iter().map(|m| m.id).collect::<Vec<_>>(), vec![s.bolt]);

    // 3. 計算 Bike × 10 的需求
    let remaining = parse_remaining_inputs(vec![(s.steel, "5"), (s.bolt, "30,0")]);
    let report = s.catalog.requirements(s.bike, 10, &remaining).unwrap();

    println!("可計算物料: {}", report.calculable.len());
    for r in &report.calculable {
        println!(
            "  - {} 總需求 {} {} 尚需 {}",
            r.material_name,
            r.total_required_display(),
            r.unit_name,
            r.additional_needed_display()
        );
    }

    let steel = report.calculable.iter().find(|r| r.material_id == s.steel).unwrap();
    assert_eq!(steel.total_required, 25.0);
    assert_eq!(steel.additional_needed, 20.0);
    assert_eq!(steel.can_produce, 2);
    // 每單位用量照輸入時的字串顯示
    assert_eq!(steel.required_per_unit_display(), "2,5");

    let bolt = report.calculable.iter().find(|r| r.material_id == s.bolt).unwrap();
    assert_eq!(bolt.total_required_display(), "120");
    assert_eq!(bolt.can_produce, 2);

    // 4. 文字用量不參與計算
    assert_eq!(report.non_calculable.len(), 1);
    assert_eq!(report.non_calculable[0].id, s.glue);
    assert_eq!(report.max_producible(), Some(2));
    assert_eq!(report.shortfalls().count(), 2);
}

#[test]
fn test_product_browsing() {
    let s = seeded_catalog();

    let filter = ProductFilter::new().with_material_ids(vec![s.steel]);
    let products = s.catalog.browse_products(&filter, SortConfig::default()).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Bike");

    let sorted = s
        .catalog
        .browse_products(&ProductFilter::new(), SortConfig::parse("-name"))
        .unwrap();
    assert_eq!(sorted.iter().map(|p| p.id).collect::<Vec<_>>(), vec![s.cart, s.bike]);
}

#[test]
fn test_search_through_catalog() {
    let s = seeded_catalog();

    let results = s.catalog.search("BIKE", parse_search_limit("")).unwrap();
    assert!(results.materials.is_empty());
    assert_eq!(results.products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![s.bike]);

    // 物料以任一名稱或描述比對
    let results = s.catalog.search("сталь", parse_search_limit("5")).unwrap();
    assert_eq!(results.materials.iter().map(|m| m.id).collect::<Vec<_>>(), vec![s.steel]);
    let results = s.catalog.search("sheet", 10).unwrap();
    assert_eq!(results.materials.len(), 1);

    let filter = MaterialFilter::new().with_query("bolt");
    let found = s.catalog.browse_materials(&filter, SortConfig::default()).unwrap();
    assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![s.bolt]);
}

#[test]
fn test_large_stock_does_not_fail_calculation() {
    let s = seeded_catalog();
    let remaining = parse_remaining_inputs(vec![(s.steel, "1e30"), (s.bolt, "30")]);
    let report = s.catalog.requirements(s.bike, 1, &remaining).unwrap();

    assert_eq!(report.calculable.len(), 2);
    let steel = report.calculable.iter().find(|r| r.material_id == s.steel).unwrap();
    assert_eq!(steel.can_produce, u64::MAX);
    assert_eq!(report.max_producible(), Some(2));
}

#[test]
fn test_oversized_session_ttl_rejected() {
    let raw = r#"{"session":{"ttl_hours":4294967295}}"#;
    assert!(matches!(AppConfig::from_json_str(raw), Err(BomError::IncorrectValue(_))));
}

#[test]
fn test_sort_by_quantity_through_catalog() {
    let s = seeded_catalog();
    // 單獨查看時物料用量取自第一筆產品關聯
    let asc = s.catalog.browse_materials(&MaterialFilter::new(), SortConfig::parse("quantity")).unwrap();
    assert_eq!(asc.last().map(|m| m.id), Some(s.glue));

    let desc = s.catalog.browse_materials(&MaterialFilter::new(), SortConfig::parse("-quantity")).unwrap();
    assert_eq!(desc.first().map(|m| m.id), Some(s.glue));
}

#[test]
fn test_mutation_errors_propagate() {
    let mut s = seeded_catalog();

    // 刪除後查詢回傳 NotFound，不會得到零值物料
    s.catalog.store_mut().delete_material(s.glue).unwrap();
    assert!(matches!(s.catalog.material(s.glue), Err(BomError::NotFound(_))));

    let bike = s.catalog.product(s.bike).unwrap();
    assert!(bike.material(s.glue).is_none());
    assert_eq!(bike.materials.len(), 2);

    assert!(matches!(
        s.catalog.store_mut().insert_product(&Product::new(0, "  ")),
        Err(BomError::MustBeFilled(_))
    ));
    assert!(matches!(
        s.catalog.requirements(s.bike, 0, &HashMap::new()),
        Err(BomError::IncorrectValue(_))
    ));
}

#[test]
fn test_attachments_follow_owner() {
    let mut s = seeded_catalog();
    let owner = FileOwner::Product(s.cart);
    let store = s.catalog.store_mut();
    let photo = store.insert_file(owner, "cart.png", "/uploads/1.png", "image/png", 2048).unwrap();
    store.set_profile_picture(owner, photo).unwrap();

    let attachments = s.catalog.attachments(owner).unwrap();
    assert_eq!(attachments.profile_picture().map(|f| f.id), Some(photo));

    s.catalog.store_mut().delete_product(s.cart).unwrap();
    assert!(matches!(s.catalog.attachments(owner), Err(BomError::NotFound(_))));
}

#[test]
fn test_aggregation_from_dynamic_columns() {
    let kg = Unit::new(1, "kg");
    let mut text_id = MaterialRow::new(1, &kg).with_name("Steel", true);
    text_id.product_id = ColumnValue::Text("7".to_string());
    text_id.product_name = Some("Bike".to_string());
    text_id.quantity = ColumnValue::Decimal(Decimal::new(25, 1));

    let rows = vec![
        text_id,
        MaterialRow::new(2, &kg).with_name("Glue", true).with_product(8, "Cart").with_quantity_text("as needed"),
        MaterialRow::new(3, &kg).with_name("Bolt", true).with_product(7, "Bike").with_quantity(4_i64),
    ];

    let materials = aggregate_materials(&rows).unwrap();

    // 只保留被產品 7 使用的物料
    let filter = MaterialFilter::new().with_product_ids(vec![7]);
    let mut used_by_bike = filter_materials(&materials, &filter);
    assert_eq!(used_by_bike.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);

    sort_materials(&mut used_by_bike, SortConfig::parse("-quantity"));
    assert_eq!(used_by_bike[0].id, 3);
    assert_eq!(used_by_bike[1].quantity, Some(Quantity::Numeric(2.5)));
}

#[test]
fn test_login_authorize_logout() {
    let hash = hash_password("correct horse").unwrap();
    let config = AppConfig::new().with_password_hash(hash);
    let manager = Arc::new(SessionAuthManager::from_config(&config).unwrap());
    let gate = RequestGate::new(Arc::clone(&manager));

    // 1. 錯誤密碼
    assert_eq!(manager.login("battery staple"), Err(BomError::AuthenticationFailed));

    // 2. 正確密碼後立即授權
    let outcome = manager.login("correct horse").unwrap();
    let token = match &outcome {
        LoginOutcome::Session(token) => token.as_str().to_string(),
        LoginOutcome::PublicAccess => panic!("expected a session"),
    };
    assert!(manager.authorize(&token));
    assert!(!manager.authorize("unknown-token"));

    let set_cookie = session_cookie(&token, Duration::hours(24));
    let cookie_header = set_cookie.split(';').next().unwrap();
    assert_eq!(gate.check("/products", Some(cookie_header)), GateDecision::Allow);

    // 3. 登出後失效
    manager.logout(&token);
    assert!(!manager.authorize(&token));
    assert_eq!(gate.check("/products", Some(cookie_header)), GateDecision::RequireLogin);
    assert_eq!(gate.check("/login", None), GateDecision::Allow);
}

#[test]
fn test_session_expires_after_ttl() {
    let hash = hash_password("pw").unwrap();
    let manager = SessionAuthManager::new(Some(hash), Duration::hours(24)).unwrap();
    let issued = Utc.with_ymd_and_hms(2025, 11, 20, 8, 0, 0).unwrap();

    let outcome = manager.login_at("pw", issued).unwrap();
    let token = outcome.token().unwrap().as_str();

    assert!(manager.authorize_at(token, issued + Duration::hours(23)));
    assert!(!manager.authorize_at(token, issued + Duration::hours(24)));
}

#[test]
fn test_public_access_mode() {
    let manager = SessionAuthManager::from_config(&AppConfig::new()).unwrap();
    assert!(manager.authorize("anything"));
    assert_eq!(manager.login("").unwrap(), LoginOutcome::PublicAccess);
}

#[rstest]
#[case("1,5", Some(1.5))]
#[case(" 3 ", Some(3.0))]
#[case("as needed", None)]
#[case("", None)]
fn test_quantity_parsing(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(parse_quantity(input), expected);
}

proptest! {
    #[test]
    fn prop_comma_equals_dot(int in 0u32..100_000, frac in 0u32..1000) {
        let dot = format!("{}.{}", int, frac);
        let comma = format!("{},{}", int, frac);
        prop_assert_eq!(parse_quantity(&dot), parse_quantity(&comma));
    }

    #[test]
    fn prop_format_round_trips_value(value in -1.0e6f64..1.0e6) {
        let formatted = format_quantity(value);
        let reparsed = parse_quantity(&formatted).unwrap();
        prop_assert!((reparsed - value).abs() <= 0.0051);
    }
}
