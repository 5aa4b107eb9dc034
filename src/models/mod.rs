pub mod delivery_challan;
pub mod invoice;
pub mod purchase_order;
pub mod upload;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use delivery_challan::{DcHeader, DcHeaderField, DcItem, DcItemField, DeliveryChallan};
pub use invoice::{Invoice, InvoiceHeader, InvoiceHeaderField, InvoiceItem, InvoiceItemField};
pub use purchase_order::{
    DeliveryField, DeliveryLot, PoHeader, PoHeaderField, PoItem, PoItemField, PurchaseOrder,
};
pub use upload::{ChunkOutcome, UploadFile, UploadKind, UploadProgress, UploadStatus};

/// 单据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Po,
    Dc,
    Invoice,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Po => write!(f, "po"),
            DocumentKind::Dc => write!(f, "dc"),
            DocumentKind::Invoice => write!(f, "invoice"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "po" => Ok(Self::Po),
            "dc" => Ok(Self::Dc),
            "invoice" => Ok(Self::Invoice),
            _ => Err(format!("Unknown document kind: {}", s)),
        }
    }
}
