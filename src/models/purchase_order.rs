use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 采购订单 (PO) 草稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub header: PoHeader,
    pub items: Vec<PoItem>,
}

/// PO 表头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoHeader {
    pub po_number: String,
    pub po_date: Option<NaiveDate>,
    pub supplier_code: String,
    pub supplier_name: String,
    pub supplier_gstin: String,
    pub department_no: String,
    pub currency: String,
    pub po_value: BigDecimal,
    #[serde(default)]
    pub remarks: String,
}

/// PO 明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoItem {
    pub po_item_no: u32,
    pub material_code: String,
    pub material_description: String,
    pub unit: String,
    pub ordered_quantity: BigDecimal,
    pub po_rate: BigDecimal,
    pub item_value: BigDecimal, // = ordered_quantity × po_rate
    #[serde(default)]
    pub deliveries: Vec<DeliveryLot>,
}

/// 交货批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLot {
    pub lot_no: u32,
    pub ordered_quantity: BigDecimal,
    pub delivered_quantity: BigDecimal,
    pub received_quantity: BigDecimal,
    pub dely_date: Option<NaiveDate>,
    /// 用户手工修改过交货数量 (对账时不得用收货数据覆盖)
    #[serde(default)]
    pub manual_override_dlv_qty: bool,
}

/// PO 表头字段更新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PoHeaderField {
    PoNumber(String),
    PoDate(Option<NaiveDate>),
    SupplierCode(String),
    SupplierName(String),
    SupplierGstin(String),
    DepartmentNo(String),
    Currency(String),
    PoValue(BigDecimal),
    Remarks(String),
}

/// PO 明细字段更新 (item_value 为派生字段, 不可直接修改)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PoItemField {
    MaterialCode(String),
    MaterialDescription(String),
    Unit(String),
    OrderedQuantity(BigDecimal),
    PoRate(BigDecimal),
}

/// 交货批次字段更新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DeliveryField {
    OrderedQuantity(BigDecimal),
    DeliveredQuantity(BigDecimal),
    ReceivedQuantity(BigDecimal),
    DelyDate(Option<NaiveDate>),
}

impl PoHeader {
    pub fn apply(&mut self, field: PoHeaderField) {
        match field {
            PoHeaderField::PoNumber(v) => self.po_number = v,
            PoHeaderField::PoDate(v) => self.po_date = v,
            PoHeaderField::SupplierCode(v) => self.supplier_code = v,
            PoHeaderField::SupplierName(v) => self.supplier_name = v,
            PoHeaderField::SupplierGstin(v) => self.supplier_gstin = v,
            PoHeaderField::DepartmentNo(v) => self.department_no = v,
            PoHeaderField::Currency(v) => self.currency = v,
            PoHeaderField::PoValue(v) => self.po_value = v,
            PoHeaderField::Remarks(v) => self.remarks = v,
        }
    }
}

impl PoItem {
    /// 新增行的默认值: 数量/单价为0, 带一个默认交货批次
    pub fn new(po_item_no: u32) -> Self {
        Self {
            po_item_no,
            material_code: String::new(),
            material_description: String::new(),
            unit: "NOS".to_string(),
            ordered_quantity: BigDecimal::zero(),
            po_rate: BigDecimal::zero(),
            item_value: BigDecimal::zero(),
            deliveries: vec![DeliveryLot::new(1)],
        }
    }

    /// 更新字段; 数量或单价变化时同步重算 item_value
    pub fn apply(&mut self, field: PoItemField) {
        match field {
            PoItemField::MaterialCode(v) => self.material_code = v,
            PoItemField::MaterialDescription(v) => self.material_description = v,
            PoItemField::Unit(v) => self.unit = v,
            PoItemField::OrderedQuantity(v) => {
                self.ordered_quantity = v;
                self.recompute_value();
            }
            PoItemField::PoRate(v) => {
                self.po_rate = v;
                self.recompute_value();
            }
        }
    }

    pub fn recompute_value(&mut self) {
        self.item_value = &self.ordered_quantity * &self.po_rate;
    }

    /// 当前最大批次号, 无批次时为 0
    pub fn max_lot_no(&self) -> u32 {
        self.deliveries.iter().map(|d| d.lot_no).max().unwrap_or(0)
    }
}

impl DeliveryLot {
    pub fn new(lot_no: u32) -> Self {
        Self {
            lot_no,
            ordered_quantity: BigDecimal::zero(),
            delivered_quantity: BigDecimal::zero(),
            received_quantity: BigDecimal::zero(),
            dely_date: None,
            manual_override_dlv_qty: false,
        }
    }

    pub fn apply(&mut self, field: DeliveryField) {
        match field {
            DeliveryField::OrderedQuantity(v) => self.ordered_quantity = v,
            DeliveryField::DeliveredQuantity(v) => {
                self.delivered_quantity = v;
                self.manual_override_dlv_qty = true;
            }
            DeliveryField::ReceivedQuantity(v) => self.received_quantity = v,
            DeliveryField::DelyDate(v) => self.dely_date = v,
        }
    }
}
