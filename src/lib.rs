//! # BOM
//!
//! 物料清單目錄：資料模型、關聯聚合、篩選排序、需求計算與網頁介面的會話認證

pub mod telemetry;

pub use bom_auth as auth;
pub use bom_calc as calc;
pub use bom_core as model;

pub use bom_auth::{GateDecision, LoginOutcome, RequestGate, SessionAuthManager};
pub use bom_calc::{
    Catalog, CatalogStore, MaterialFilter, MemoryStore, ProductFilter, RequirementsCalculator,
    RequirementsReport, SearchResults, SortConfig,
};
pub use bom_core::{AppConfig, BomError, LogLevel, Material, Product, Quantity, Result, Unit};
