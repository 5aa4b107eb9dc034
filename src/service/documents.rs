use crate::models::{
    DcHeader, DcHeaderField, DcItem, DcItemField, DeliveryChallan, DocumentKind, Invoice,
    InvoiceHeader, InvoiceHeaderField, InvoiceItem, InvoiceItemField, PoHeader, PoHeaderField,
    PoItem, PoItemField, PurchaseOrder,
};

/// 可编辑单据: 表头 + 有序明细
///
/// `DraftStore` 通过该 trait 对 PO / DC / 发票统一提供编辑原语,
/// 各单据只需说明字段如何更新、新行默认值和派生数据。
pub trait DraftDocument: Clone + PartialEq + Send + Sync + 'static {
    type Header: Clone;
    type HeaderField;
    type Item: Clone;
    type ItemField;

    const KIND: DocumentKind;

    fn header(&self) -> &Self::Header;
    fn header_mut(&mut self) -> &mut Self::Header;
    fn items(&self) -> &[Self::Item];
    fn items_mut(&mut self) -> &mut Vec<Self::Item>;

    /// 明细行号 (稳定, 不保证连续)
    fn item_no(item: &Self::Item) -> u32;
    fn new_item(item_no: u32) -> Self::Item;

    fn apply_header_field(header: &mut Self::Header, field: Self::HeaderField);
    fn apply_item_field(item: &mut Self::Item, field: Self::ItemField);

    /// 重新计算派生视图数据 (载入及表头变化后调用)
    fn refresh_derived(&mut self) {}
}

impl DraftDocument for PurchaseOrder {
    type Header = PoHeader;
    type HeaderField = PoHeaderField;
    type Item = PoItem;
    type ItemField = PoItemField;

    const KIND: DocumentKind = DocumentKind::Po;

    fn header(&self) -> &PoHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut PoHeader {
        &mut self.header
    }

    fn items(&self) -> &[PoItem] {
        &self.items
    }

    fn items_mut(&mut self) -> &mut Vec<PoItem> {
        &mut self.items
    }

    fn item_no(item: &PoItem) -> u32 {
        item.po_item_no
    }

    fn new_item(item_no: u32) -> PoItem {
        PoItem::new(item_no)
    }

    fn apply_header_field(header: &mut PoHeader, field: PoHeaderField) {
        header.apply(field);
    }

    fn apply_item_field(item: &mut PoItem, field: PoItemField) {
        item.apply(field);
    }
}

impl DraftDocument for DeliveryChallan {
    type Header = DcHeader;
    type HeaderField = DcHeaderField;
    type Item = DcItem;
    type ItemField = DcItemField;

    const KIND: DocumentKind = DocumentKind::Dc;

    fn header(&self) -> &DcHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut DcHeader {
        &mut self.header
    }

    fn items(&self) -> &[DcItem] {
        &self.items
    }

    fn items_mut(&mut self) -> &mut Vec<DcItem> {
        &mut self.items
    }

    fn item_no(item: &DcItem) -> u32 {
        item.dc_item_no
    }

    fn new_item(item_no: u32) -> DcItem {
        DcItem::new(item_no)
    }

    fn apply_header_field(header: &mut DcHeader, field: DcHeaderField) {
        header.apply(field);
    }

    fn apply_item_field(item: &mut DcItem, field: DcItemField) {
        item.apply(field);
    }

    fn refresh_derived(&mut self) {
        self.refresh_notes();
    }
}

impl DraftDocument for Invoice {
    type Header = InvoiceHeader;
    type HeaderField = InvoiceHeaderField;
    type Item = InvoiceItem;
    type ItemField = InvoiceItemField;

    const KIND: DocumentKind = DocumentKind::Invoice;

    fn header(&self) -> &InvoiceHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut InvoiceHeader {
        &mut self.header
    }

    fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    fn items_mut(&mut self) -> &mut Vec<InvoiceItem> {
        &mut self.items
    }

    fn item_no(item: &InvoiceItem) -> u32 {
        item.item_no
    }

    fn new_item(item_no: u32) -> InvoiceItem {
        InvoiceItem::new(item_no)
    }

    fn apply_header_field(header: &mut InvoiceHeader, field: InvoiceHeaderField) {
        header.apply(field);
    }

    fn apply_item_field(item: &mut InvoiceItem, field: InvoiceItemField) {
        item.apply(field);
    }
}
