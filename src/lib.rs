mod database {
    pub mod actions;
    pub mod error;
    pub mod filter;
    pub mod form;
    pub mod pagination;
    pub mod schema;
    pub mod shoplist;
}
mod authentication {
    pub mod permissions;
    pub mod session;
}
mod constants;

pub use authentication::*;
pub use constants::*;
pub use database::*;
