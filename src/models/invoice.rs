use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 发票草稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub header: InvoiceHeader,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub po_number: String,
    #[serde(default)]
    pub dc_numbers: Vec<String>,
    pub buyer_name: String,
    pub buyer_gstin: String,
    pub place_of_supply: String,
    pub taxable_value: BigDecimal,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    pub total_invoice_value: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub item_no: u32,
    pub po_item_no: u32,
    pub description: String,
    pub hsn_code: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: BigDecimal,
    pub taxable_value: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum InvoiceHeaderField {
    InvoiceNumber(String),
    InvoiceDate(Option<NaiveDate>),
    PoNumber(String),
    DcNumbers(Vec<String>),
    BuyerName(String),
    BuyerGstin(String),
    PlaceOfSupply(String),
    TaxableValue(BigDecimal),
    CgstAmount(BigDecimal),
    SgstAmount(BigDecimal),
    IgstAmount(BigDecimal),
    TotalInvoiceValue(BigDecimal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum InvoiceItemField {
    PoItemNo(u32),
    Description(String),
    HsnCode(String),
    Quantity(BigDecimal),
    Unit(String),
    Rate(BigDecimal),
    TaxableValue(BigDecimal),
}

impl InvoiceHeader {
    pub fn apply(&mut self, field: InvoiceHeaderField) {
        match field {
            InvoiceHeaderField::InvoiceNumber(v) => self.invoice_number = v,
            InvoiceHeaderField::InvoiceDate(v) => self.invoice_date = v,
            InvoiceHeaderField::PoNumber(v) => self.po_number = v,
            InvoiceHeaderField::DcNumbers(v) => self.dc_numbers = v,
            InvoiceHeaderField::BuyerName(v) => self.buyer_name = v,
            InvoiceHeaderField::BuyerGstin(v) => self.buyer_gstin = v,
            InvoiceHeaderField::PlaceOfSupply(v) => self.place_of_supply = v,
            InvoiceHeaderField::TaxableValue(v) => self.taxable_value = v,
            InvoiceHeaderField::CgstAmount(v) => self.cgst_amount = v,
            InvoiceHeaderField::SgstAmount(v) => self.sgst_amount = v,
            InvoiceHeaderField::IgstAmount(v) => self.igst_amount = v,
            InvoiceHeaderField::TotalInvoiceValue(v) => self.total_invoice_value = v,
        }
    }
}

impl InvoiceItem {
    pub fn new(item_no: u32) -> Self {
        Self {
            item_no,
            po_item_no: 0,
            description: String::new(),
            hsn_code: String::new(),
            quantity: BigDecimal::zero(),
            unit: "NOS".to_string(),
            rate: BigDecimal::zero(),
            taxable_value: BigDecimal::zero(),
        }
    }

    pub fn apply(&mut self, field: InvoiceItemField) {
        match field {
            InvoiceItemField::PoItemNo(v) => self.po_item_no = v,
            InvoiceItemField::Description(v) => self.description = v,
            InvoiceItemField::HsnCode(v) => self.hsn_code = v,
            InvoiceItemField::Quantity(v) => self.quantity = v,
            InvoiceItemField::Unit(v) => self.unit = v,
            InvoiceItemField::Rate(v) => self.rate = v,
            InvoiceItemField::TaxableValue(v) => self.taxable_value = v,
        }
    }
}
