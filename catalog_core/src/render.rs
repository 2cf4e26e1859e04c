use std::fmt;

use crate::catalog::{CategorySchema, Product, ProductId};

pub const PRICE_UNIT: &str = "RPS";
pub const NO_IMAGES: &str = "No images available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardImages {
    Gallery(Vec<CardImage>),
    /// Shown instead of an empty gallery when a product has no images.
    Placeholder,
}

/// Everything shown for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: ProductId,
    pub images: CardImages,
    pub favourite: bool,
    pub likes: u64,
    /// The attribute block picked for the product. Products whose kind has no
    /// block show neither title, attributes nor price.
    pub block: Option<CardBlock>,
    pub details_route: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlock {
    pub title: String,
    /// Label and value of each attribute, in the order the category lists them.
    pub attributes: Vec<(String, String)>,
    pub price: String,
}

impl Card {
    pub fn build(
        category: &CategorySchema,
        product: &Product,
        favourite: bool,
        likes: u64,
        resolve_asset: impl Fn(&str) -> String,
    ) -> Self {
        let paths = product.images(&category.images_field);
        let images = if paths.is_empty() {
            CardImages::Placeholder
        } else {
            let alt = category.alt_text(product);
            CardImages::Gallery(
                paths
                    .into_iter()
                    .map(|path| CardImage { url: resolve_asset(path), alt: alt.clone() })
                    .collect(),
            )
        };

        let text = |field: &str| product.field_text(field).unwrap_or_default();
        let block = category.block_for(product).map(|block| CardBlock {
            title: text(&block.title_field),
            attributes: block
                .attributes
                .iter()
                .map(|attribute| (attribute.label.clone(), text(&attribute.field)))
                .collect(),
            price: text("price"),
        });

        Self {
            id: product.id().clone(),
            images,
            favourite,
            likes,
            block,
            details_route: category.detail_path(product.id()),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heart = if self.favourite { "♥" } else { "♡" };
        writeln!(f, "{heart} {} Likes", self.likes)?;
        match &self.images {
            CardImages::Placeholder => writeln!(f, "  [{NO_IMAGES}]")?,
            CardImages::Gallery(images) => {
                for image in images {
                    writeln!(f, "  [{}] {}", image.alt, image.url)?;
                }
            }
        }
        if let Some(block) = &self.block {
            writeln!(f, "{}", block.title)?;
            for (label, value) in &block.attributes {
                writeln!(f, "  {label}: {value}")?;
            }
            writeln!(f, "  Price: {} {PRICE_UNIT}", block.price)?;
        }
        write!(f, "  View Details: {}", self.details_route)
    }
}

/// What a product list view shows at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    Loading,
    Error(String),
    Ready { title: String, see_all_route: Option<String>, cards: Vec<Card> },
}

impl RenderedView {
    pub fn cards(&self) -> &[Card] {
        match self {
            Self::Ready { cards, .. } => cards,
            _ => &[],
        }
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::Error(message) => write!(f, "Error: {message}"),
            Self::Ready { title, see_all_route, cards } => {
                write!(f, "{title}")?;
                if let Some(route) = see_all_route {
                    write!(f, "  ➡️ {route}")?;
                }
                for card in cards {
                    write!(f, "\n\n{card}")?;
                }
                Ok(())
            }
        }
    }
}
