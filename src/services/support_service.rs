// src/services/support_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    time::{self, Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::User,
        support::{support_channel_id, ChatMessage, DeskView, NewChatMessage},
    },
    services::{
        session::SessionStore,
        support_desk::{SendOutcome, SupportDesk, SupportIdentity},
    },
};

type SharedDesk = Arc<Mutex<SupportDesk>>;

/// Mesa sem nenhuma requisição nesse intervalo é considerada abandonada.
pub const DESK_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
pub const REAP_EVERY: Duration = Duration::from_secs(60);

struct DeskEntry {
    desk: SharedDesk,
    last_used: Instant,
}

/// Uma mesa de suporte por sessão de desenvolvedor, mais o lado da empresa
/// na mesma conversa.
#[derive(Clone)]
pub struct SupportService {
    store: Arc<dyn RecordStore>,
    identity: SupportIdentity,
    poll_every: Duration,
    desks: Arc<Mutex<HashMap<Uuid, DeskEntry>>>,
}

impl SupportService {
    pub fn new(store: Arc<dyn RecordStore>, identity: SupportIdentity, poll_every: Duration) -> Self {
        Self {
            store,
            identity,
            poll_every,
            desks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // =========================================================================
    //  MESA (painel do desenvolvedor)
    // =========================================================================

    /// Abre (ou reabre) a mesa da sessão e recarrega os canais.
    pub async fn mount(&self, session_id: Uuid) -> DeskView {
        let desk = self.desk_for(session_id).await;
        let mut desk = desk.lock().await;
        desk.mount().await;
        desk.view()
    }

    /// Mesa ainda não aberta aparece como ociosa e vazia.
    pub async fn snapshot(&self, session_id: Uuid) -> DeskView {
        let desk = self.desks.lock().await.get_mut(&session_id).map(|entry| {
            entry.last_used = Instant::now();
            entry.desk.clone()
        });
        match desk {
            Some(desk) => desk.lock().await.view(),
            None => DeskView::default(),
        }
    }

    pub async fn select_channel(&self, session_id: Uuid, company_id: Uuid) -> DeskView {
        let desk = self.desk_for(session_id).await;
        let mut desk = desk.lock().await;
        desk.select_channel(company_id).await;
        desk.view()
    }

    pub async fn send(&self, session_id: Uuid, user: &User, text: &str) -> (SendOutcome, DeskView) {
        let desk = self.desk_for(session_id).await;
        let mut desk = desk.lock().await;
        let outcome = desk.send(text, Some(user)).await;
        (outcome, desk.view())
    }

    /// Fecha a mesa da sessão (logout ou saída da tela de suporte).
    pub async fn close(&self, session_id: Uuid) {
        let entry = self.desks.lock().await.remove(&session_id);
        if let Some(entry) = entry {
            entry.desk.lock().await.close().await;
            tracing::info!("📪 Mesa de suporte da sessão {} fechada.", session_id);
        }
    }

    pub async fn open_desks(&self) -> usize {
        self.desks.lock().await.len()
    }

    async fn desk_for(&self, session_id: Uuid) -> SharedDesk {
        let mut desks = self.desks.lock().await;
        let entry = desks.entry(session_id).or_insert_with(|| DeskEntry {
            desk: Arc::new(Mutex::new(SupportDesk::new(
                self.store.clone(),
                self.identity.clone(),
                self.poll_every,
            ))),
            last_used: Instant::now(),
        });
        entry.last_used = Instant::now();
        entry.desk.clone()
    }

    /// Encerra sessões vencidas e fecha as mesas sem sessão viva ou paradas
    /// há mais de `DESK_IDLE_TIMEOUT`. Devolve quantas mesas foram fechadas.
    pub async fn reap(&self, sessions: &SessionStore) -> usize {
        let expired = sessions.end_expired();
        if !expired.is_empty() {
            tracing::info!("🗑️ {} sessão(ões) vencida(s) removida(s).", expired.len());
        }

        let now = Instant::now();
        let stale: Vec<Uuid> = self
            .desks
            .lock()
            .await
            .iter()
            .filter(|(session_id, entry)| {
                sessions.get(**session_id).is_none()
                    || now.duration_since(entry.last_used) >= DESK_IDLE_TIMEOUT
            })
            .map(|(session_id, _)| *session_id)
            .collect();

        for session_id in &stale {
            self.close(*session_id).await;
        }
        stale.len()
    }

    /// Varredura periódica; roda enquanto o servidor estiver de pé.
    pub async fn run_reaper(self, sessions: SessionStore, every: Duration) {
        let mut ticker = time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let closed = self.reap(&sessions).await;
            if closed > 0 {
                tracing::info!("📪 {} mesa(s) de suporte abandonada(s) fechada(s).", closed);
            }
        }
    }

    // =========================================================================
    //  LADO DA EMPRESA
    // =========================================================================

    pub async fn company_thread(&self, company_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        self.store.list_support_messages(company_id).await
    }

    pub async fn send_to_support(&self, user: &User, text: &str) -> Result<ChatMessage, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let message = NewChatMessage {
            company_id: user.company_id,
            sender_id: user.id,
            sender_name: user.name.clone(),
            receiver_id: self.identity.sender_id,
            channel_id: support_channel_id(user.company_id),
            text: text.to_string(),
        };
        self.store.send_message(&message).await
    }
}
