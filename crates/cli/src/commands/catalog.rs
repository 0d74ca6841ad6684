//! `catalog list`.

use std::io::Write;

use techmart_core::Catalog;

use super::CommandError;

/// Write the catalog as an aligned table, or as JSON.
///
/// # Errors
///
/// Returns an error if writing or serializing fails.
pub fn list(catalog: &Catalog, json: bool, out: &mut impl Write) -> Result<(), CommandError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, catalog)?;
        writeln!(out)?;
        return Ok(());
    }

    let name_width = catalog
        .products()
        .iter()
        .map(|product| product.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    writeln!(out, "{:>4}  {:<name_width$}  {:>10}", "ID", "NAME", "PRICE")?;
    for product in catalog.products() {
        writeln!(
            out,
            "{:>4}  {:<name_width$}  {:>10}",
            product.id.to_string(),
            product.name,
            product.price.to_string(),
        )?;
    }
    Ok(())
}
