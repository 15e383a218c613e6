//! # BOM Calculation Engine
//!
//! 關聯資料聚合、篩選排序、搜尋與物料需求計算

pub mod aggregate;
pub mod filter;
pub mod memory;
pub mod requirements;
pub mod row;
pub mod search;
pub mod sort;
pub mod store;

// Re-export 主要類型
pub use aggregate::{
    aggregate_materials, aggregate_products, assemble_material, assemble_product,
    RelationAggregator,
};
pub use filter::{
    filter_materials, filter_products, parse_id_list, MaterialFilter, ProductFilter,
    QuantityRange,
};
pub use memory::MemoryStore;
pub use requirements::{
    calculate_requirements, parse_remaining_inputs, CalculationResult, RequirementsCalculator,
    RequirementsReport,
};
pub use row::{ColumnValue, MaterialRow, ProductRow};
pub use search::{
    parse_search_limit, search, search_materials, search_products, SearchResults,
    DEFAULT_SEARCH_LIMIT,
};
pub use sort::{sort_materials, sort_products, SortConfig, SortField, SortOrder};
pub use store::{Catalog, CatalogStore};
