//! 目錄操作示範：建立資料 → 聚合 → 篩選排序 → 搜尋 → 需求計算 → 登入
//!
//! 執行：`cargo run --example catalog_walkthrough`

use std::sync::Arc;

use anyhow::Context;
use bom::auth::{hash_password, session_cookie, GateDecision, RequestGate};
use bom::calc::{
    parse_remaining_inputs, Catalog, MaterialFilter, MemoryStore, SortConfig, DEFAULT_SEARCH_LIMIT,
};
use bom::telemetry::init_tracing;
use bom::{AppConfig, LogLevel, Material, Product, SessionAuthManager, Unit};

fn main() -> anyhow::Result<()> {
    init_tracing(LogLevel::Info);

    // 1. 建立資料
    let mut store = MemoryStore::new();
    let kg = store.insert_unit("kg")?;
    let pcs = store.insert_unit("pcs")?;

    let frame = store.insert_material(&Material::from_input(
        "Aluminium tube",
        vec!["Алюминиевая труба".to_string()],
        Unit::new(kg, "kg"),
        "6061-T6",
    )?)?;
    let spoke = store.insert_material(&Material::from_input(
        "Spoke",
        vec![],
        Unit::new(pcs, "pcs"),
        "",
    )?)?;
    let grease = store.insert_material(&Material::from_input(
        "Grease",
        vec![],
        Unit::new(kg, "kg"),
        "",
    )?)?;

    let bike = store.insert_product(&Product::from_input("Bike", "city bike")?)?;
    store.set_product_material(bike, frame, "3,2")?;
    store.set_product_material(bike, spoke, "72")?;
    store.set_product_material(bike, grease, "as needed")?;

    let catalog = Catalog::new(store);
    tracing::info!("Step 1: 已建立 {} 個單位", catalog.units()?.len());

    // 2. 篩選排序
    println!("== Materials by quantity (desc) ==");
    for material in catalog.browse_materials(&MaterialFilter::new(), SortConfig::parse("-quantity"))? {
        let quantity = material
            .quantity
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        println!(
            "  #{:<3} {:<20} {:>8} {}",
            material.id,
            material.display_name(),
            quantity,
            material.unit.name
        );
    }

    // 3. 搜尋
    let found = catalog.search("tube", DEFAULT_SEARCH_LIMIT)?;
    println!("== Search \"tube\": {} hit(s) ==", found.len());
    for material in &found.materials {
        println!("  material #{} {}", material.id, material.display_name());
    }

    // 4. 需求計算
    let remaining = parse_remaining_inputs(vec![(frame, "10"), (spoke, "500")]);
    let report = catalog
        .requirements(bike, 5, &remaining)
        .context("requirements for bike")?;

    println!("== Build {} × product #{} ==", report.desired_count, report.product_id);
    for r in &report.calculable {
        println!(
            "  {:<20} per unit {:>6}  total {:>6}  stock {:>6}  missing {:>6}  enough for {}",
            r.material_name,
            r.required_per_unit_display(),
            r.total_required_display(),
            r.remaining_display(),
            r.additional_needed_display(),
            r.can_produce
        );
    }
    for m in &report.non_calculable {
        println!("  {:<20} not calculable", m.display_name());
    }
    if let Some(max) = report.max_producible() {
        println!("  max producible with current stock: {}", max);
    }

    // 5. 登入
    let config = AppConfig::new().with_password_hash(hash_password("demo")?);
    let manager = Arc::new(SessionAuthManager::from_config(&config)?);
    let gate = RequestGate::new(Arc::clone(&manager));

    tracing::info!("Step 5: 登入示範");
    let outcome = manager.login("demo")?;
    let token = outcome.token().context("password is configured")?;
    let set_cookie = session_cookie(token.as_str(), manager.sessions().ttl());
    let cookie = set_cookie.split(';').next().unwrap_or_default();

    assert_eq!(gate.check("/materials", Some(cookie)), GateDecision::Allow);
    manager.logout(token.as_str());
    assert_eq!(gate.check("/materials", Some(cookie)), GateDecision::RequireLogin);
    println!("== Session issued and revoked ==");

    Ok(())
}
