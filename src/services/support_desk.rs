// src/services/support_desk.rs

//! Mesa de suporte do painel do desenvolvedor.
//!
//! A mesa guarda a lista de canais (um por empresa), a conversa do canal
//! selecionado e um poller que rebusca a conversa a cada intervalo enquanto
//! o canal está aberto. Trocar de canal, fechar a mesa ou descartá-la encerra
//! o poller anterior antes de qualquer outra coisa; nunca há dois vivos.
//!
//! Envios são otimistas: a mensagem entra na conversa local antes da
//! confirmação. Enquanto a criação não termina, o id local fica em
//! `in_flight` e o polling preserva essa cópia; depois disso a lista do
//! servidor substitui a local por inteiro.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::{
    db::RecordStore,
    models::{
        auth::User,
        support::{support_channel_id, ChatMessage, DeskPhase, DeskView, NewChatMessage, SupportChannel},
    },
};

/// Tempo de vida de um aviso na tela.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Quem o suporte é nas mensagens que envia.
#[derive(Debug, Clone)]
pub struct SupportIdentity {
    pub sender_id: Uuid,
    pub sender_name: String,
    // Destinatário fixo (administrador do lado da empresa)
    pub admin_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Texto vazio, nenhum canal ou nenhum usuário: nada foi enviado.
    Ignored,
    Sent(ChatMessage),
    /// A mensagem otimista fica na conversa; o aviso foi levantado.
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Notice {
    key: &'static str,
    raised_at: Instant,
}

#[derive(Debug, Default)]
struct DeskState {
    phase: DeskPhase,
    selected: Option<Uuid>,
    channels: Vec<SupportChannel>,
    messages: Vec<ChatMessage>,
    in_flight: Vec<Uuid>,
    notice: Option<Notice>,
}

impl DeskState {
    fn raise(&mut self, key: &'static str) {
        self.notice = Some(Notice { key, raised_at: Instant::now() });
    }

    fn current_notice(&mut self) -> Option<&'static str> {
        if self.notice.is_some_and(|n| n.raised_at.elapsed() >= NOTICE_TTL) {
            self.notice = None;
        }
        self.notice.map(|n| n.key)
    }

    fn sort_channels(&mut self) {
        self.channels
            .sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    }

    fn touch_preview(&mut self, message: &ChatMessage) {
        let Some(channel) = self
            .channels
            .iter_mut()
            .find(|c| c.company_id == message.company_id)
        else {
            return;
        };
        if channel.last_message_at.is_some_and(|at| at > message.sent_at) {
            return;
        }
        channel.last_message = Some(message.text.clone());
        channel.last_message_at = Some(message.sent_at);
        self.sort_channels();
    }

    /// Troca a conversa pela lista do servidor, mantendo só as cópias
    /// otimistas cuja criação ainda não terminou. Resultado de um canal que
    /// já não está selecionado é descartado.
    fn replace_thread(&mut self, company_id: Uuid, fetched: Vec<ChatMessage>) {
        if self.selected != Some(company_id) {
            return;
        }
        let pending: Vec<ChatMessage> = self
            .messages
            .drain(..)
            .filter(|m| self.in_flight.contains(&m.id))
            .collect();

        if let Some(latest) = fetched.last().cloned() {
            self.touch_preview(&latest);
        }
        self.messages = fetched;
        self.messages.extend(pending);
    }
}

fn lock(state: &Mutex<DeskState>) -> MutexGuard<'_, DeskState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// Conta pollers vivos; sai do contador quando a task termina
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Poller {
    company_id: Uuid,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct SupportDesk {
    store: Arc<dyn RecordStore>,
    identity: SupportIdentity,
    poll_every: Duration,
    state: Arc<Mutex<DeskState>>,
    poller: Option<Poller>,
    live_pollers: Arc<AtomicUsize>,
}

impl SupportDesk {
    pub fn new(store: Arc<dyn RecordStore>, identity: SupportIdentity, poll_every: Duration) -> Self {
        Self {
            store,
            identity,
            poll_every,
            state: Arc::new(Mutex::new(DeskState::default())),
            poller: None,
            live_pollers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Carrega a lista de canais (mais recente primeiro).
    pub async fn mount(&mut self) {
        match self.store.list_support_channels().await {
            Ok(channels) => {
                let mut state = lock(&self.state);
                state.channels = channels;
                state.sort_channels();
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao carregar os canais de suporte: {}", e);
                lock(&self.state).raise("support.channels_failed");
            }
        }
    }

    pub async fn select_channel(&mut self, company_id: Uuid) {
        self.stop_polling().await;

        {
            let mut state = lock(&self.state);
            state.phase = DeskPhase::Loading;
            state.selected = Some(company_id);
            state.messages.clear();
            state.in_flight.clear();
        }

        match self.store.list_support_messages(company_id).await {
            Ok(messages) => lock(&self.state).replace_thread(company_id, messages),
            Err(e) => {
                tracing::error!("🔥 Falha ao carregar o canal {}: {}", support_channel_id(company_id), e);
                lock(&self.state).raise("support.thread_failed");
            }
        }

        lock(&self.state).phase = DeskPhase::Active;
        self.start_polling(company_id);
    }

    pub async fn send(&mut self, text: &str, current_user: Option<&User>) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() || current_user.is_none() {
            return SendOutcome::Ignored;
        }
        let Some(company_id) = lock(&self.state).selected else {
            return SendOutcome::Ignored;
        };

        let outgoing = NewChatMessage {
            company_id,
            sender_id: self.identity.sender_id,
            sender_name: self.identity.sender_name.clone(),
            receiver_id: self.identity.admin_id,
            channel_id: support_channel_id(company_id),
            text: text.to_string(),
        };
        let optimistic = ChatMessage::optimistic(&outgoing, Utc::now());

        {
            let mut state = lock(&self.state);
            state.in_flight.push(optimistic.id);
            state.messages.push(optimistic.clone());
            state.touch_preview(&optimistic);
        }

        let result = self.store.send_message(&outgoing).await;

        let mut state = lock(&self.state);
        state.in_flight.retain(|id| *id != optimistic.id);
        match result {
            Ok(sent) => SendOutcome::Sent(sent),
            Err(e) => {
                tracing::error!("🔥 Falha ao enviar mensagem para {}: {}", outgoing.channel_id, e);
                state.raise("support.send_failed");
                SendOutcome::Failed
            }
        }
    }

    /// Desmonta a mesa: encerra o poller e volta ao estado inicial.
    pub async fn close(&mut self) {
        self.stop_polling().await;
        *lock(&self.state) = DeskState::default();
    }

    /// Foto da mesa; `notice` traz a chave do catálogo de mensagens.
    pub fn view(&self) -> DeskView {
        let mut state = lock(&self.state);
        let notice = state.current_notice().map(str::to_string);
        DeskView {
            phase: state.phase,
            selected_company_id: state.selected,
            channels: state.channels.clone(),
            messages: state.messages.clone(),
            notice,
        }
    }

    pub fn live_pollers(&self) -> usize {
        self.live_pollers.load(Ordering::SeqCst)
    }

    pub fn polling(&self) -> Option<Uuid> {
        self.poller.as_ref().map(|p| p.company_id)
    }

    fn start_polling(&mut self, company_id: Uuid) {
        let (stop, stop_rx) = oneshot::channel();
        let live = LiveGuard::enter(&self.live_pollers);
        // Conta a partir da seleção, não de quando a task rodar pela primeira vez
        let first = Instant::now() + self.poll_every;
        let handle = tokio::spawn(poll_thread(
            self.store.clone(),
            self.state.clone(),
            company_id,
            first,
            self.poll_every,
            stop_rx,
            live,
        ));
        self.poller = Some(Poller { company_id, stop, handle });
    }

    // Sinaliza e espera a task terminar: ao retornar, o poller já morreu
    async fn stop_polling(&mut self) {
        let Some(poller) = self.poller.take() else {
            return;
        };
        let _ = poller.stop.send(());
        if let Err(e) = poller.handle.await {
            tracing::error!("🔥 Poller do canal {} terminou com erro: {}", poller.company_id, e);
        }
    }
}

impl Drop for SupportDesk {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            let _ = poller.stop.send(());
        }
    }
}

async fn poll_thread(
    store: Arc<dyn RecordStore>,
    state: Arc<Mutex<DeskState>>,
    company_id: Uuid,
    first: Instant,
    every: Duration,
    mut stop: oneshot::Receiver<()>,
    _live: LiveGuard,
) {
    let mut ticker = time::interval_at(first, every);
    // Busca lenta não empilha ticks atrasados
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = &mut stop => break,
            fetched = store.list_support_messages(company_id) => fetched,
        };

        match fetched {
            Ok(messages) => lock(&state).replace_thread(company_id, messages),
            // Falha isolada: loga e tenta no próximo tick
            Err(e) => tracing::warn!("⚠️ Polling do canal {} falhou: {}", support_channel_id(company_id), e),
        }
    }
}
