use crate::models::{DeliveryChallan, Invoice, PurchaseOrder};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::io::Write;

/// 明细导出为 CSV 行
pub trait CsvExport {
    fn csv_header() -> &'static [&'static str];
    fn csv_rows(&self) -> Vec<Vec<String>>;
}

/// 将 Option<NaiveDate> 转换为 CSV 字符串
fn date_to_csv(val: &Option<NaiveDate>) -> String {
    val.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn dec_to_csv(val: &BigDecimal) -> String {
    val.to_string()
}

impl CsvExport for PurchaseOrder {
    fn csv_header() -> &'static [&'static str] {
        &[
            "po_number",
            "po_item_no",
            "material_code",
            "material_description",
            "unit",
            "ordered_quantity",
            "po_rate",
            "item_value",
            "lot_no",
            "lot_ordered_quantity",
            "delivered_quantity",
            "received_quantity",
            "dely_date",
            "manual_override_dlv_qty",
        ]
    }

    /// 每个交货批次一行; 没有批次的明细输出一行空批次
    fn csv_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for item in &self.items {
            let base = vec![
                self.header.po_number.clone(),
                item.po_item_no.to_string(),
                item.material_code.clone(),
                item.material_description.clone(),
                item.unit.clone(),
                dec_to_csv(&item.ordered_quantity),
                dec_to_csv(&item.po_rate),
                dec_to_csv(&item.item_value),
            ];
            if item.deliveries.is_empty() {
                let mut row = base;
                row.extend(std::iter::repeat(String::new()).take(6));
                rows.push(row);
                continue;
            }
            for lot in &item.deliveries {
                let mut row = base.clone();
                row.extend([
                    lot.lot_no.to_string(),
                    dec_to_csv(&lot.ordered_quantity),
                    dec_to_csv(&lot.delivered_quantity),
                    dec_to_csv(&lot.received_quantity),
                    date_to_csv(&lot.dely_date),
                    lot.manual_override_dlv_qty.to_string(),
                ]);
                rows.push(row);
            }
        }
        rows
    }
}

impl CsvExport for DeliveryChallan {
    fn csv_header() -> &'static [&'static str] {
        &[
            "dc_number",
            "dc_date",
            "dc_item_no",
            "po_item_no",
            "lot_no",
            "material_description",
            "unit",
            "ordered_quantity",
            "dispatch_quantity",
            "hsn_code",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|item| {
                vec![
                    self.header.dc_number.clone(),
                    date_to_csv(&self.header.dc_date),
                    item.dc_item_no.to_string(),
                    item.po_item_no.to_string(),
                    item.lot_no.to_string(),
                    item.material_description.clone(),
                    item.unit.clone(),
                    dec_to_csv(&item.ordered_quantity),
                    dec_to_csv(&item.dispatch_quantity),
                    item.hsn_code.clone(),
                ]
            })
            .collect()
    }
}

impl CsvExport for Invoice {
    fn csv_header() -> &'static [&'static str] {
        &[
            "invoice_number",
            "invoice_date",
            "item_no",
            "po_item_no",
            "description",
            "hsn_code",
            "quantity",
            "unit",
            "rate",
            "taxable_value",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        self.items
            .iter()
            .map(|item| {
                vec![
                    self.header.invoice_number.clone(),
                    date_to_csv(&self.header.invoice_date),
                    item.item_no.to_string(),
                    item.po_item_no.to_string(),
                    item.description.clone(),
                    item.hsn_code.clone(),
                    dec_to_csv(&item.quantity),
                    item.unit.clone(),
                    dec_to_csv(&item.rate),
                    dec_to_csv(&item.taxable_value),
                ]
            })
            .collect()
    }
}

/// 导出明细到任意 writer
pub fn export_to_csv<D: CsvExport, W: Write>(doc: &D, output: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(D::csv_header())?;
    for row in doc.csv_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// 导出明细为字符串
pub fn export_to_string<D: CsvExport>(doc: &D) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    export_to_csv(doc, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
