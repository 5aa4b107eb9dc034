//! 测试用样例单据

use crate::models::{
    DcHeader, DcItem, DeliveryChallan, DeliveryLot, Invoice, InvoiceHeader, InvoiceItem, PoHeader,
    PoItem, PurchaseOrder,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn lot(lot_no: u32, ordered: &str) -> DeliveryLot {
    DeliveryLot {
        lot_no,
        ordered_quantity: dec(ordered),
        delivered_quantity: dec("0"),
        received_quantity: dec("0"),
        dely_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        manual_override_dlv_qty: false,
    }
}

/// 行号 [1, 3] (2 已被删除), 第二行有两个批次
pub fn sample_po() -> PurchaseOrder {
    PurchaseOrder {
        header: PoHeader {
            po_number: "4102003344".to_string(),
            po_date: NaiveDate::from_ymd_opt(2024, 4, 12),
            supplier_code: "S-1002".to_string(),
            supplier_name: "Bharat Cables".to_string(),
            supplier_gstin: "29ABCDE1234F1Z5".to_string(),
            department_no: "D-07".to_string(),
            currency: "INR".to_string(),
            po_value: dec("1300"),
            remarks: String::new(),
        },
        items: vec![
            PoItem {
                po_item_no: 1,
                material_code: "M-100".to_string(),
                material_description: "Copper wire 2.5 sq mm".to_string(),
                unit: "MTR".to_string(),
                ordered_quantity: dec("100"),
                po_rate: dec("12"),
                item_value: dec("1200"),
                deliveries: vec![lot(1, "100")],
            },
            PoItem {
                po_item_no: 3,
                material_code: "M-300".to_string(),
                material_description: "Cable lug".to_string(),
                unit: "NOS".to_string(),
                ordered_quantity: dec("20"),
                po_rate: dec("5"),
                item_value: dec("100"),
                deliveries: vec![lot(1, "10"), lot(2, "10")],
            },
        ],
    }
}

pub fn sample_dc() -> DeliveryChallan {
    DeliveryChallan {
        header: DcHeader {
            dc_number: "DC-2024-018".to_string(),
            dc_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            po_number: "4102003344".to_string(),
            consignee_name: "Central Stores".to_string(),
            consignee_address: "Plant 2, Peenya".to_string(),
            vehicle_no: "KA-01-AB-1234".to_string(),
            remarks: "Handle with care\n\n  Unload at bay 3 ".to_string(),
        },
        items: vec![DcItem {
            dc_item_no: 1,
            po_item_no: 1,
            lot_no: 1,
            material_description: "Copper wire 2.5 sq mm".to_string(),
            unit: "MTR".to_string(),
            ordered_quantity: dec("100"),
            dispatch_quantity: dec("60"),
            hsn_code: "8544".to_string(),
        }],
        notes: Vec::new(),
    }
}

pub fn sample_invoice() -> Invoice {
    Invoice {
        header: InvoiceHeader {
            invoice_number: "INV-7781".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 5, 3),
            po_number: "4102003344".to_string(),
            dc_numbers: vec!["DC-2024-018".to_string()],
            buyer_name: "Central Stores".to_string(),
            buyer_gstin: "29AAACB0001A1Z2".to_string(),
            place_of_supply: "Karnataka".to_string(),
            taxable_value: dec("720"),
            cgst_amount: dec("64.8"),
            sgst_amount: dec("64.8"),
            igst_amount: dec("0"),
            total_invoice_value: dec("849.6"),
        },
        items: vec![InvoiceItem {
            item_no: 1,
            po_item_no: 1,
            description: "Copper wire 2.5 sq mm".to_string(),
            hsn_code: "8544".to_string(),
            quantity: dec("60"),
            unit: "MTR".to_string(),
            rate: dec("12"),
            taxable_value: dec("720"),
        }],
    }
}
