use crate::error::DraftError;
use crate::models::{DeliveryField, DeliveryLot, PoItem, PurchaseOrder};
use crate::service::documents::DraftDocument;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// 草稿状态: 未载入 / 已载入
#[derive(Debug, Clone)]
pub enum DraftState<D> {
    Empty,
    Loaded(LoadedDraft<D>),
}

/// 已载入的草稿: 载入时的检查点 + 当前快照
#[derive(Debug, Clone)]
pub struct LoadedDraft<D> {
    original: Arc<D>,
    current: Arc<D>,
    numbering: Numbering,
}

/// 行号水位: 本会话内分配过的最大编号, 保证删除后不复用
#[derive(Debug, Clone, Default)]
struct Numbering {
    item: u32,
    lots: HashMap<u32, u32>, // po_item_no -> 最大批次号
}

impl<D> LoadedDraft<D> {
    pub fn original(&self) -> &Arc<D> {
        &self.original
    }

    pub fn current(&self) -> &Arc<D> {
        &self.current
    }
}

/// 单据草稿容器
///
/// 持有一份正在编辑的单据。每次修改都会生成新的 `Arc` 快照并通过
/// watch 通道通知订阅方, 快照一旦发布就不再变化。修改失败时状态保持原样。
pub struct DraftStore<D: DraftDocument> {
    state: DraftState<D>,
    tx: watch::Sender<Option<Arc<D>>>,
}

pub type PoDraftStore = DraftStore<PurchaseOrder>;
pub type DcDraftStore = DraftStore<crate::models::DeliveryChallan>;
pub type InvoiceDraftStore = DraftStore<crate::models::Invoice>;

impl<D: DraftDocument> Default for DraftStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DraftDocument> DraftStore<D> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: DraftState::Empty,
            tx,
        }
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<D>>> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> &DraftState<D> {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, DraftState::Loaded(_))
    }

    pub fn current(&self) -> Option<Arc<D>> {
        match &self.state {
            DraftState::Empty => None,
            DraftState::Loaded(loaded) => Some(Arc::clone(&loaded.current)),
        }
    }

    pub fn original(&self) -> Option<Arc<D>> {
        match &self.state {
            DraftState::Empty => None,
            DraftState::Loaded(loaded) => Some(Arc::clone(&loaded.original)),
        }
    }

    /// 当前快照是否与载入时不同
    pub fn is_dirty(&self) -> bool {
        match &self.state {
            DraftState::Empty => false,
            DraftState::Loaded(loaded) => {
                !Arc::ptr_eq(&loaded.original, &loaded.current)
                    && *loaded.original != *loaded.current
            }
        }
    }

    /// 整体替换为新获取的单据, 并作为 reset 的检查点
    pub fn load(&mut self, mut snapshot: D) {
        snapshot.refresh_derived();
        let numbering = Numbering {
            item: max_item_no(&snapshot),
            lots: HashMap::new(),
        };
        let snapshot = Arc::new(snapshot);
        tracing::debug!(
            "Loaded {} draft with {} items",
            D::KIND,
            snapshot.items().len()
        );
        self.state = DraftState::Loaded(LoadedDraft {
            original: Arc::clone(&snapshot),
            current: Arc::clone(&snapshot),
            numbering,
        });
        self.tx.send_replace(Some(snapshot));
    }

    /// 丢弃草稿 (离开页面)
    pub fn clear(&mut self) {
        self.state = DraftState::Empty;
        self.tx.send_replace(None);
    }

    /// 丢弃所有修改, 恢复到最近一次 load 的快照
    pub fn reset(&mut self) -> Result<(), DraftError> {
        let DraftState::Loaded(loaded) = &mut self.state else {
            return Err(DraftError::NoDocument);
        };
        loaded.current = Arc::clone(&loaded.original);
        self.tx.send_replace(Some(Arc::clone(&loaded.current)));
        tracing::debug!("Reset {} draft to last loaded snapshot", D::KIND);
        Ok(())
    }

    pub fn set_header(&mut self, header: D::Header) -> Result<(), DraftError> {
        self.modify(|doc, _| {
            *doc.header_mut() = header;
            doc.refresh_derived();
            Ok(())
        })
    }

    pub fn update_header(&mut self, field: D::HeaderField) -> Result<(), DraftError> {
        self.modify(|doc, _| {
            D::apply_header_field(doc.header_mut(), field);
            doc.refresh_derived();
            Ok(())
        })
    }

    /// 按位置更新明细字段 (派生字段在同一快照内完成重算)
    pub fn update_item(&mut self, index: usize, field: D::ItemField) -> Result<(), DraftError> {
        self.modify(|doc, _| {
            let item = item_at(doc.items_mut(), index)?;
            D::apply_item_field(item, field);
            Ok(())
        })
    }

    /// 追加默认明细行, 返回新行号 max(已有行号, 水位) + 1
    pub fn add_item(&mut self) -> Result<u32, DraftError> {
        self.modify(|doc, numbering| {
            let item_no = next_number("item", max_item_no(doc).max(numbering.item))?;
            numbering.item = item_no;
            doc.items_mut().push(D::new_item(item_no));
            Ok(item_no)
        })
    }

    /// 按位置删除明细行
    pub fn remove_item(&mut self, index: usize) -> Result<D::Item, DraftError> {
        self.modify(|doc, _| {
            let items = doc.items_mut();
            if index >= items.len() {
                return Err(DraftError::ItemIndexOutOfRange {
                    index,
                    len: items.len(),
                });
            }
            Ok(items.remove(index))
        })
    }

    /// 在当前快照的副本上执行修改, 成功后才发布新快照
    fn modify<T, F>(&mut self, f: F) -> Result<T, DraftError>
    where
        F: FnOnce(&mut D, &mut Numbering) -> Result<T, DraftError>,
    {
        let DraftState::Loaded(loaded) = &mut self.state else {
            tracing::debug!("Ignoring {} draft update: no document loaded", D::KIND);
            return Err(DraftError::NoDocument);
        };

        let mut next = (*loaded.current).clone();
        let mut numbering = loaded.numbering.clone();
        let out = f(&mut next, &mut numbering)?;

        loaded.current = Arc::new(next);
        loaded.numbering = numbering;
        self.tx.send_replace(Some(Arc::clone(&loaded.current)));
        Ok(out)
    }
}

/// PO 专有: 交货批次的增删改
impl DraftStore<PurchaseOrder> {
    /// 为指定明细追加批次, 返回新批次号
    pub fn add_delivery(&mut self, item_index: usize) -> Result<u32, DraftError> {
        self.modify(|doc, numbering| {
            let item = item_at(&mut doc.items, item_index)?;
            let mark = numbering.lots.entry(item.po_item_no).or_insert(0);
            let lot_no = next_number("lot", item.max_lot_no().max(*mark))?;
            *mark = lot_no;
            item.deliveries.push(DeliveryLot::new(lot_no));
            Ok(lot_no)
        })
    }

    pub fn remove_delivery(
        &mut self,
        item_index: usize,
        delivery_index: usize,
    ) -> Result<DeliveryLot, DraftError> {
        self.modify(|doc, numbering| {
            let item = item_at(&mut doc.items, item_index)?;
            // 记录水位, 删除最大批次后不复用其编号
            let mark = numbering.lots.entry(item.po_item_no).or_insert(0);
            *mark = (*mark).max(item.max_lot_no());
            delivery_at(item, item_index, delivery_index)?;
            Ok(item.deliveries.remove(delivery_index))
        })
    }

    /// 更新批次字段; 修改交货数量会打上手工覆盖标记
    pub fn update_delivery(
        &mut self,
        item_index: usize,
        delivery_index: usize,
        field: DeliveryField,
    ) -> Result<(), DraftError> {
        self.modify(|doc, _| {
            let item = item_at(&mut doc.items, item_index)?;
            delivery_at(item, item_index, delivery_index)?.apply(field);
            Ok(())
        })
    }
}

fn next_number(level: &'static str, last: u32) -> Result<u32, DraftError> {
    last.checked_add(1).ok_or(DraftError::NumberingExhausted { level, last })
}

fn max_item_no<D: DraftDocument>(doc: &D) -> u32 {
    doc.items().iter().map(D::item_no).max().unwrap_or(0)
}

fn item_at<T>(items: &mut [T], index: usize) -> Result<&mut T, DraftError> {
    let len = items.len();
    items
        .get_mut(index)
        .ok_or(DraftError::ItemIndexOutOfRange { index, len })
}

fn delivery_at(
    item: &mut PoItem,
    item_index: usize,
    index: usize,
) -> Result<&mut DeliveryLot, DraftError> {
    let len = item.deliveries.len();
    item.deliveries
        .get_mut(index)
        .ok_or(DraftError::DeliveryIndexOutOfRange {
            item_index,
            index,
            len,
        })
}
