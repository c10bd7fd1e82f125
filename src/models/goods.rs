use super::RecordError;
use crate::entities::goods;
use crate::sync::datetime;
use bson::{Document, doc, oid::ObjectId};
use chrono::NaiveDateTime;

/// A stock line. Quantity and unit price are never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodsRecord {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub price_per_unit: f64,
    pub owner_id: Option<i32>,
    pub branch_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl GoodsRecord {
    pub fn from_row(row: &goods::Model) -> Result<Self, RecordError> {
        if row.name.is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if row.quantity < 0 {
            return Err(RecordError::InvalidField {
                field: "quantity",
                value: row.quantity.to_string(),
            });
        }
        if !row.price_per_unit.is_finite() || row.price_per_unit < 0.0 {
            return Err(RecordError::InvalidField {
                field: "price_per_unit",
                value: row.price_per_unit.to_string(),
            });
        }

        Ok(Self {
            name: row.name.clone(),
            description: row.description.clone(),
            category: row.category.clone(),
            quantity: row.quantity,
            price_per_unit: row.price_per_unit,
            owner_id: row.owner_id,
            branch_id: row.branch_id,
            created_at: datetime::parse_source_format(row.created_at.as_deref()),
            updated_at: datetime::parse_source_format(row.updated_at.as_deref()),
        })
    }

    #[must_use]
    pub fn to_document(
        &self,
        owner: Option<ObjectId>,
        sqlite_id: Option<i32>,
        captured_at: NaiveDateTime,
    ) -> Document {
        doc! {
            "name": self.name.clone(),
            "description": self.description.clone(),
            "category": self.category.clone(),
            "quantity": self.quantity,
            "price_per_unit": self.price_per_unit,
            "owner_id": owner,
            "branch_id": self.branch_id,
            "created_at": datetime::to_document(self.created_at.unwrap_or(captured_at)),
            "updated_at": datetime::to_document(self.updated_at.unwrap_or(captured_at)),
            "sqlite_id": sqlite_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(quantity: i32, price: f64) -> goods::Model {
        goods::Model {
            id: 1,
            name: "Pallet Jack".to_string(),
            description: None,
            category: Some("Equipment".to_string()),
            quantity,
            price_per_unit: price,
            owner_id: Some(3),
            branch_id: Some(1),
            created_at: None,
            updated_at: Some("2025-09-01T08:00:00".to_string()),
        }
    }

    #[test]
    fn test_negative_quantity_quarantined() {
        assert!(matches!(
            GoodsRecord::from_row(&row(-1, 10.0)),
            Err(RecordError::InvalidField {
                field: "quantity",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_or_nan_price_quarantined() {
        assert!(GoodsRecord::from_row(&row(1, -0.5)).is_err());
        assert!(GoodsRecord::from_row(&row(1, f64::NAN)).is_err());
    }

    #[test]
    fn test_document_shape() {
        let record = GoodsRecord::from_row(&row(12, 249.5)).unwrap();
        let owner = ObjectId::new();
        let doc = record.to_document(Some(owner), Some(1), datetime::now());

        assert_eq!(doc.get_i32("quantity").unwrap(), 12);
        assert!((doc.get_f64("price_per_unit").unwrap() - 249.5).abs() < f64::EPSILON);
        assert_eq!(doc.get_object_id("owner_id").unwrap(), owner);
        assert!(doc.get_datetime("created_at").is_ok());
        assert!(doc.get_datetime("updated_at").is_ok());
    }
}
