//! AI flows: each binds a prompt template and output shape to one or more
//! service calls.

pub mod advertisement;
pub mod advertisement_description;
pub mod designed_product;
pub mod sales_potential;
pub mod translation;

pub use advertisement::generate_advertisement;
pub use advertisement_description::generate_advertisement_description;
pub use designed_product::{design_product, design_product_or_fallback};
pub use sales_potential::analyze_sales_potential;
pub use translation::translate_texts;

use crate::{Error, Result};

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
