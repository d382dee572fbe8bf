//! SPINE data model
//!
//! - `types`: roles, feature/function types, addresses
//! - `update`: list reconciliation and field clearing
//! - `data`: function records and the `FunctionData` union

pub mod types;
pub mod update;
pub mod data;

pub use types::*;
pub use update::{
    remove_element_from_item, update_list, Clearable, FieldMask, Merge, Selector, UpdateItem,
};
pub use data::*;
