use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

/// Describes one product vertical: where its listing lives, how its products
/// are identified, and which attributes a card shows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchema {
    /// A short name used to select the category, e.g. "wood".
    pub key: String,
    /// The heading shown above the cards, e.g. "Wood Products".
    pub title: String,
    /// The listing endpoint relative to the API base, e.g. "woodRoute/wood".
    pub endpoint: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_images_field")]
    pub images_field: String,
    /// Route of the details page; the product id is appended to it.
    pub detail_route: String,
    /// Route of the page listing the whole category, if the category has one.
    #[serde(default)]
    pub see_all_route: Option<String>,
    /// How many products a preview of this category shows. None means the
    /// category is always listed in full.
    #[serde(default)]
    pub preview_limit: Option<usize>,
    /// The text the image description starts with, e.g. "Wood".
    #[serde(default)]
    pub alt_prefix: Option<String>,
    /// The fields whose values follow the prefix in the image description.
    #[serde(default)]
    pub alt_fields: Vec<String>,
    /// If set, products of this category come in several kinds and this
    /// field says which of `blocks` applies to a product.
    #[serde(default)]
    pub discriminant: Option<String>,
    pub blocks: Vec<AttributeBlock>,
}

/// The attributes a card shows for one kind of product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBlock {
    /// The discriminant value this block is rendered for. Ignored when the
    /// category has no discriminant.
    #[serde(default)]
    pub when: Option<String>,
    pub title_field: String,
    pub attributes: Vec<AttributeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeField {
    pub label: String,
    pub field: String,
}

fn default_id_field() -> String {
    "_id".to_string()
}

fn default_images_field() -> String {
    "images".to_string()
}

impl CategorySchema {
    /// The listing endpoint split into path segments.
    pub fn endpoint_segments(&self) -> impl Iterator<Item = &str> {
        self.endpoint.split('/').filter(|segment| !segment.is_empty())
    }

    /// Picks the attribute block that applies to `product`. A product whose
    /// discriminant matches no block gets no block at all.
    pub fn block_for(&self, product: &Product) -> Option<&AttributeBlock> {
        match &self.discriminant {
            None => self.blocks.first(),
            Some(field) => {
                let kind = product.field_text(field)?;
                self.blocks.iter().find(|block| block.when.as_deref() == Some(kind.as_str()))
            }
        }
    }

    pub fn detail_path(&self, id: &ProductId) -> String {
        format!("{}/{}", self.detail_route.trim_end_matches('/'), id)
    }

    pub fn alt_text(&self, product: &Product) -> String {
        self.alt_prefix
            .iter()
            .cloned()
            .chain(self.alt_fields.iter().map(|field| product.field_text(field).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn wood() -> Self {
        Self {
            key: "wood".to_string(),
            title: "Wood Products".to_string(),
            endpoint: "woodRoute/wood".to_string(),
            id_field: default_id_field(),
            images_field: "images".to_string(),
            detail_route: "/woodview".to_string(),
            see_all_route: Some("/woodall".to_string()),
            preview_limit: Some(4),
            alt_prefix: Some("Wood".to_string()),
            alt_fields: vec!["name".to_string()],
            discriminant: None,
            blocks: vec![AttributeBlock {
                when: None,
                title_field: "wood".to_string(),
                attributes: fields(&[
                    ("Seller Name", "name"),
                    ("Thickness", "thickness"),
                    ("Quantity", "quantity"),
                ]),
            }],
        }
    }

    pub fn pg_hostel() -> Self {
        Self {
            key: "pgHostel".to_string(),
            title: "PG Hostels".to_string(),
            endpoint: "pgHostelRoute/pgHostel".to_string(),
            id_field: default_id_field(),
            images_field: "photos".to_string(),
            detail_route: "/productviewpg".to_string(),
            see_all_route: Some("/pgall".to_string()),
            preview_limit: Some(4),
            alt_prefix: Some("PG Hostel".to_string()),
            alt_fields: vec!["pgHostelName".to_string()],
            discriminant: None,
            blocks: vec![AttributeBlock {
                when: None,
                title_field: "pgHostelName".to_string(),
                attributes: fields(&[
                    ("Location", "location"),
                    ("Total Floor", "totalFloors"),
                    ("Room", "acRoom"),
                    ("Food", "food"),
                    ("Car Parking", "carParking"),
                    ("Monthly Maintenance", "maintenance"),
                ]),
            }],
        }
    }

    pub fn pipe_wires() -> Self {
        Self {
            key: "pipeWires".to_string(),
            title: "Pipe & Wire Products".to_string(),
            endpoint: "pipeWiresRoute/pipewires".to_string(),
            id_field: default_id_field(),
            images_field: "images".to_string(),
            detail_route: "/pipe&wireview".to_string(),
            see_all_route: None,
            preview_limit: None,
            alt_prefix: None,
            alt_fields: vec!["Type".to_string(), "name".to_string()],
            discriminant: Some("Type".to_string()),
            blocks: vec![
                AttributeBlock {
                    when: Some("Pipes".to_string()),
                    title_field: "pipeBrand".to_string(),
                    attributes: fields(&[
                        ("Seller Name", "name"),
                        ("Pipe Type", "pipeType"),
                        ("Diameter", "pipeDiameter"),
                        ("Length", "pipeLength"),
                        ("Quantity", "quantity"),
                    ]),
                },
                AttributeBlock {
                    when: Some("Wires".to_string()),
                    title_field: "wireBrand".to_string(),
                    attributes: fields(&[
                        ("Seller Name", "name"),
                        ("Wire Type", "wireType"),
                        ("Diameter", "wireDiameter"),
                        ("Length", "wireLength"),
                        ("Quantity", "quantity"),
                    ]),
                },
            ],
        }
    }

    /// The categories the marketplace ships with.
    pub fn builtin() -> Vec<Self> {
        vec![Self::wood(), Self::pg_hostel(), Self::pipe_wires()]
    }
}

fn fields(pairs: &[(&str, &str)]) -> Vec<AttributeField> {
    pairs
        .iter()
        .map(|(label, field)| AttributeField { label: label.to_string(), field: field.to_string() })
        .collect()
}
