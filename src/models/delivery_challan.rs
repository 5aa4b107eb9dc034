use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 送货单 (Delivery Challan) 草稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryChallan {
    pub header: DcHeader,
    pub items: Vec<DcItem>,
    /// 由 remarks 拆分出的备注列表 (派生数据, 不接受外部输入)
    #[serde(default, skip_deserializing)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcHeader {
    pub dc_number: String,
    pub dc_date: Option<NaiveDate>,
    pub po_number: String,
    pub consignee_name: String,
    pub consignee_address: String,
    pub vehicle_no: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcItem {
    pub dc_item_no: u32,
    pub po_item_no: u32,
    pub lot_no: u32,
    pub material_description: String,
    pub unit: String,
    pub ordered_quantity: BigDecimal,
    pub dispatch_quantity: BigDecimal,
    pub hsn_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DcHeaderField {
    DcNumber(String),
    DcDate(Option<NaiveDate>),
    PoNumber(String),
    ConsigneeName(String),
    ConsigneeAddress(String),
    VehicleNo(String),
    Remarks(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DcItemField {
    PoItemNo(u32),
    LotNo(u32),
    MaterialDescription(String),
    Unit(String),
    OrderedQuantity(BigDecimal),
    DispatchQuantity(BigDecimal),
    HsnCode(String),
}

impl DcHeader {
    pub fn apply(&mut self, field: DcHeaderField) {
        match field {
            DcHeaderField::DcNumber(v) => self.dc_number = v,
            DcHeaderField::DcDate(v) => self.dc_date = v,
            DcHeaderField::PoNumber(v) => self.po_number = v,
            DcHeaderField::ConsigneeName(v) => self.consignee_name = v,
            DcHeaderField::ConsigneeAddress(v) => self.consignee_address = v,
            DcHeaderField::VehicleNo(v) => self.vehicle_no = v,
            DcHeaderField::Remarks(v) => self.remarks = v,
        }
    }
}

impl DcItem {
    pub fn new(dc_item_no: u32) -> Self {
        Self {
            dc_item_no,
            po_item_no: 0,
            lot_no: 0,
            material_description: String::new(),
            unit: "NOS".to_string(),
            ordered_quantity: BigDecimal::zero(),
            dispatch_quantity: BigDecimal::zero(),
            hsn_code: String::new(),
        }
    }

    pub fn apply(&mut self, field: DcItemField) {
        match field {
            DcItemField::PoItemNo(v) => self.po_item_no = v,
            DcItemField::LotNo(v) => self.lot_no = v,
            DcItemField::MaterialDescription(v) => self.material_description = v,
            DcItemField::Unit(v) => self.unit = v,
            DcItemField::OrderedQuantity(v) => self.ordered_quantity = v,
            DcItemField::DispatchQuantity(v) => self.dispatch_quantity = v,
            DcItemField::HsnCode(v) => self.hsn_code = v,
        }
    }
}

impl DeliveryChallan {
    /// 重新从 remarks 派生 notes
    pub fn refresh_notes(&mut self) {
        self.notes = split_remarks(&self.header.remarks);
    }
}

/// 按行拆分备注, 去掉空行和首尾空白
pub fn split_remarks(remarks: &str) -> Vec<String> {
    remarks
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
