use crate::error::DraftError;
use crate::models::{DeliveryChallan, DeliveryField, DocumentKind, Invoice, PurchaseOrder};
use crate::service::export::{export_to_string, CsvExport};
use crate::service::{DcDraftStore, DraftDocument, DraftStore, InvoiceDraftStore, PoDraftStore};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// 会话操作错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("draft session {0} not found")]
    NotFound(Uuid),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

/// 通用草稿命令
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[serde(bound(
    deserialize = "D: DeserializeOwned, D::Header: DeserializeOwned, D::HeaderField: DeserializeOwned, D::ItemField: DeserializeOwned"
))]
pub enum DraftCommand<D: DraftDocument> {
    Load { document: D },
    SetHeader { header: D::Header },
    UpdateHeader { update: D::HeaderField },
    UpdateItem { index: usize, update: D::ItemField },
    AddItem,
    RemoveItem { index: usize },
    Reset,
}

/// PO 交货批次命令
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeliveryCommand {
    AddDelivery {
        item_index: usize,
    },
    RemoveDelivery {
        item_index: usize,
        delivery_index: usize,
    },
    UpdateDelivery {
        item_index: usize,
        delivery_index: usize,
        update: DeliveryField,
    },
}

enum PoCommand {
    Delivery(DeliveryCommand),
    Draft(DraftCommand<PurchaseOrder>),
}

impl PoCommand {
    /// 按 op 分派解析, 出错时错误信息指向具体字段
    fn from_value(command: Value) -> Result<Self, serde_json::Error> {
        let op = command.get("op").and_then(Value::as_str);
        if matches!(op, Some("add_delivery" | "remove_delivery" | "update_delivery")) {
            Ok(PoCommand::Delivery(serde_json::from_value(command)?))
        } else {
            Ok(PoCommand::Draft(serde_json::from_value(command)?))
        }
    }
}

impl<D: DraftDocument> DraftCommand<D> {
    /// 执行命令; 新增行时返回新行号
    pub fn apply(self, store: &mut DraftStore<D>) -> Result<Option<u32>, DraftError> {
        match self {
            DraftCommand::Load { document } => {
                store.load(document);
                Ok(None)
            }
            DraftCommand::SetHeader { header } => store.set_header(header).map(|_| None),
            DraftCommand::UpdateHeader { update } => store.update_header(update).map(|_| None),
            DraftCommand::UpdateItem { index, update } => {
                store.update_item(index, update).map(|_| None)
            }
            DraftCommand::AddItem => store.add_item().map(Some),
            DraftCommand::RemoveItem { index } => store.remove_item(index).map(|_| None),
            DraftCommand::Reset => store.reset().map(|_| None),
        }
    }
}

impl DeliveryCommand {
    pub fn apply(self, store: &mut PoDraftStore) -> Result<Option<u32>, DraftError> {
        match self {
            DeliveryCommand::AddDelivery { item_index } => store.add_delivery(item_index).map(Some),
            DeliveryCommand::RemoveDelivery {
                item_index,
                delivery_index,
            } => store
                .remove_delivery(item_index, delivery_index)
                .map(|_| None),
            DeliveryCommand::UpdateDelivery {
                item_index,
                delivery_index,
                update,
            } => store
                .update_delivery(item_index, delivery_index, update)
                .map(|_| None),
        }
    }
}

/// 一个独立的编辑会话
pub enum DraftSession {
    Po(PoDraftStore),
    Dc(DcDraftStore),
    Invoice(InvoiceDraftStore),
}

/// 会话视图
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub session_id: Uuid,
    pub kind: DocumentKind,
    pub loaded: bool,
    pub dirty: bool,
    pub document: Option<Value>,
}

fn loaded_store<D: DraftDocument + DeserializeOwned>(
    snapshot: Value,
) -> Result<DraftStore<D>, serde_json::Error> {
    let mut store = DraftStore::new();
    store.load(serde_json::from_value(snapshot)?);
    Ok(store)
}

fn document_value<D: DraftDocument + Serialize>(
    store: &DraftStore<D>,
) -> Result<Option<Value>, serde_json::Error> {
    store
        .current()
        .map(|doc| serde_json::to_value(&*doc))
        .transpose()
}

fn export_store<D: DraftDocument + CsvExport>(
    store: &DraftStore<D>,
) -> Result<String, SessionError> {
    let doc = store.current().ok_or(DraftError::NoDocument)?;
    Ok(export_to_string(&*doc)?)
}

impl DraftSession {
    /// 以获取到的单据快照打开会话
    pub fn open(kind: DocumentKind, snapshot: Value) -> Result<Self, SessionError> {
        Ok(match kind {
            DocumentKind::Po => DraftSession::Po(loaded_store(snapshot)?),
            DocumentKind::Dc => DraftSession::Dc(loaded_store(snapshot)?),
            DocumentKind::Invoice => DraftSession::Invoice(loaded_store(snapshot)?),
        })
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            DraftSession::Po(_) => PurchaseOrder::KIND,
            DraftSession::Dc(_) => DeliveryChallan::KIND,
            DraftSession::Invoice(_) => Invoice::KIND,
        }
    }

    /// 按会话的单据类型解析并执行命令
    pub fn apply(&mut self, command: Value) -> Result<Option<u32>, SessionError> {
        let result = match self {
            DraftSession::Po(store) => match PoCommand::from_value(command)? {
                PoCommand::Delivery(cmd) => cmd.apply(store),
                PoCommand::Draft(cmd) => cmd.apply(store),
            },
            DraftSession::Dc(store) => {
                serde_json::from_value::<DraftCommand<DeliveryChallan>>(command)?.apply(store)
            }
            DraftSession::Invoice(store) => {
                serde_json::from_value::<DraftCommand<Invoice>>(command)?.apply(store)
            }
        };
        Ok(result?)
    }

    pub fn view(&self, session_id: Uuid) -> Result<DraftView, SessionError> {
        let (loaded, dirty, document) = match self {
            DraftSession::Po(s) => (s.is_loaded(), s.is_dirty(), document_value(s)?),
            DraftSession::Dc(s) => (s.is_loaded(), s.is_dirty(), document_value(s)?),
            DraftSession::Invoice(s) => (s.is_loaded(), s.is_dirty(), document_value(s)?),
        };
        Ok(DraftView {
            session_id,
            kind: self.kind(),
            loaded,
            dirty,
            document,
        })
    }

    pub fn export_csv(&self) -> Result<String, SessionError> {
        match self {
            DraftSession::Po(s) => export_store(s),
            DraftSession::Dc(s) => export_store(s),
            DraftSession::Invoice(s) => export_store(s),
        }
    }
}

/// 草稿会话表: 每个窗口/页面一个独立会话
#[derive(Default)]
pub struct DraftSessions {
    sessions: DashMap<Uuid, DraftSession>,
}

impl DraftSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, kind: DocumentKind, snapshot: Value) -> Result<Uuid, SessionError> {
        let session = DraftSession::open(kind, snapshot)?;
        let id = Uuid::new_v4();
        self.sessions.insert(id, session);
        tracing::info!("Opened {} draft session {}", kind, id);
        Ok(id)
    }

    pub fn view(&self, id: Uuid) -> Result<DraftView, SessionError> {
        let session = self.sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        session.view(id)
    }

    /// 在会话上执行命令, 返回 (新行号, 执行后的视图)
    pub fn apply(&self, id: Uuid, command: Value) -> Result<(Option<u32>, DraftView), SessionError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        let created = session.apply(command)?;
        Ok((created, session.view(id)?))
    }

    pub fn export_csv(&self, id: Uuid) -> Result<String, SessionError> {
        let session = self.sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        session.export_csv()
    }

    pub fn close(&self, id: Uuid) -> bool {
        let closed = self.sessions.remove(&id).is_some();
        if closed {
            tracing::info!("Closed draft session {}", id);
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
