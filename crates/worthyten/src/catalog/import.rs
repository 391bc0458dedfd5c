use super::{DeviceCategory, InMemoryCatalog, Product, ProductId};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { row: usize, message: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::InvalidRow { row, message } => {
                write!(f, "catalog row {}: {}", row, message)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads the product list exported from the admin dashboard.
///
/// Expected header: `id,name,brand,category,base_price,display_price`.
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryCatalog, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryCatalog, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let catalog = InMemoryCatalog::new();
        let mut seen = HashSet::new();

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            // header is line 1
            let row = index + 2;
            let product = record?.into_product(row)?;
            if !seen.insert(product.id.0.clone()) {
                return Err(CatalogImportError::InvalidRow {
                    row,
                    message: format!("duplicate product id '{}'", product.id),
                });
            }
            catalog.upsert(product);
        }

        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    name: String,
    brand: String,
    category: String,
    base_price: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    display_price: Option<String>,
}

impl CatalogRow {
    fn into_product(self, row: usize) -> Result<Product, CatalogImportError> {
        if self.id.is_empty() {
            return Err(CatalogImportError::InvalidRow {
                row,
                message: "missing product id".to_string(),
            });
        }

        let category =
            DeviceCategory::parse(&self.category).ok_or_else(|| CatalogImportError::InvalidRow {
                row,
                message: format!("unknown category '{}'", self.category),
            })?;

        if self.base_price < 0 {
            return Err(CatalogImportError::InvalidRow {
                row,
                message: format!("negative base price {}", self.base_price),
            });
        }

        let display_price = self
            .display_price
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| CatalogImportError::InvalidRow {
                    row,
                    message: format!("display price '{raw}' is not an integer"),
                })
            })
            .transpose()?;

        Ok(Product {
            id: ProductId(self.id),
            name: self.name,
            brand: self.brand,
            category,
            base_price: self.base_price,
            display_price,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;
    use std::io::Cursor;

    #[test]
    fn imports_rows_with_optional_display_price() {
        let csv = "id,name,brand,category,base_price,display_price\n\
                   eos-r6,EOS R6,Canon,camera,85000,92000\n\
                   galaxy-s22,Galaxy S22,Samsung,phone,30000,\n";

        let catalog = CatalogImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        let r6 = catalog
            .fetch(&ProductId("eos-r6".to_string()))
            .expect("lookup")
            .expect("present");
        assert_eq!(r6.base_price, 85_000);
        assert_eq!(r6.display_price, Some(92_000));
        let s22 = catalog
            .fetch(&ProductId("galaxy-s22".to_string()))
            .expect("lookup")
            .expect("present");
        assert_eq!(s22.category, DeviceCategory::Phone);
        assert_eq!(s22.display_price, None);
    }

    #[test]
    fn reports_row_number_for_invalid_category() {
        let csv = "id,name,brand,category,base_price,display_price\n\
                   eos-r6,EOS R6,Canon,camera,85000,\n\
                   watch-4,Watch 4,Samsung,wearable,9000,\n";

        let err = CatalogImporter::from_reader(Cursor::new(csv)).expect_err("invalid category");

        match err {
            CatalogImportError::InvalidRow { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("wearable"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_base_price() {
        let csv = "id,name,brand,category,base_price,display_price\n\
                   eos-r6,EOS R6,Canon,camera,lots,\n";

        let err = CatalogImporter::from_reader(Cursor::new(csv)).expect_err("csv error");

        assert!(matches!(err, CatalogImportError::Csv(_)));
    }

    #[test]
    fn rejects_duplicate_product_ids() {
        let csv = "id,name,brand,category,base_price,display_price\n\
                   eos-r6,EOS R6,Canon,camera,85000,\n\
                   iphone-13,iPhone 13,Apple,phone,32000,\n\
                   eos-r6,EOS R6 Mark II,Canon,camera,99000,\n";

        let err = CatalogImporter::from_reader(Cursor::new(csv)).expect_err("duplicate id");

        match err {
            CatalogImportError::InvalidRow { row, message } => {
                assert_eq!(row, 4);
                assert!(message.contains("duplicate product id"));
                assert!(message.contains("eos-r6"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }
}
