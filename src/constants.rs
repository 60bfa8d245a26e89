pub const RECIPE_COUNT_PER_PAGE: i64 = 6;
pub const PRODUCT_COUNT_PER_PAGE: i64 = 50;

pub const SHOPLIST_HEADER: &str = " Product (unit) - amount";
pub const SHOPLIST_DIVIDER: &str = "------------------------------------";
