// src/services/event_sync.rs
//
// Sincronização dos eventos com o calendário externo. A persistência do
// evento é a ação primária; criação, atualização e exclusão na agenda
// externa são efeitos posteriores que degradam para log quando falham.

use std::sync::Arc;

use minijinja::context;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EventRepository, LodgeRepository, SetupRepository, UserRepository},
    models::{auth::User, event::Event},
    services::{google_calendar::CalendarPort, notifier::Notifier},
};

// URL pública usada no e-mail quando o sistema ainda não foi configurado.
const DEFAULT_CALENDAR_URL: &str = "https://calendar.google.com/calendar";

/// Qual operação externa corresponde a uma gravação de evento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
    Delete,
    Nothing,
}

/// Decide a ação externa a partir do estado gravado. Evento ativo sem id
/// externo nunca gera atualização (nunca foi criado lá); cancelamento só
/// exclui quando existe id externo.
pub fn plan_sync(created: bool, is_cancelled: bool, has_external_id: bool) -> SyncAction {
    if created {
        SyncAction::Create
    } else if is_cancelled {
        if has_external_id {
            SyncAction::Delete
        } else {
            SyncAction::Nothing
        }
    } else if has_external_id {
        SyncAction::Update
    } else {
        SyncAction::Nothing
    }
}

#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
    lodges: LodgeRepository,
    users: UserRepository,
    setup: SetupRepository,
    calendar: Arc<dyn CalendarPort>,
    notifier: Notifier,
}

impl EventService {
    pub fn new(
        events: EventRepository,
        lodges: LodgeRepository,
        users: UserRepository,
        setup: SetupRepository,
        calendar: Arc<dyn CalendarPort>,
        notifier: Notifier,
    ) -> Self {
        Self {
            events,
            lodges,
            users,
            setup,
            calendar,
            notifier,
        }
    }

    async fn lodge_name(&self, lodge_id: Option<Uuid>) -> Option<String> {
        let lodge_id = lodge_id?;
        match self.lodges.find_by_id(lodge_id).await {
            Ok(lodge) => lodge.map(|l| l.name),
            Err(e) => {
                tracing::error!("Falha ao carregar a loja {} do evento: {}", lodge_id, e);
                None
            }
        }
    }

    /// Insere o evento e dispara os efeitos externos: criação na agenda,
    /// gravação pontual do id retornado e e-mail ao dono.
    pub async fn create_event(
        &self,
        owner: &User,
        lodge_id: Option<Uuid>,
        title: &str,
        description: &str,
        start_time: chrono::DateTime<chrono::Utc>,
        end_time: chrono::DateTime<chrono::Utc>,
        address: &str,
    ) -> Result<Event, AppError> {
        let mut event = self
            .events
            .insert(owner.id, lodge_id, title, description, start_time, end_time, address)
            .await?;

        let lodge_name = self.lodge_name(event.lodge_id).await;
        match self.calendar.create(&event, lodge_name.as_deref()).await {
            Ok(google_event_id) => {
                self.events
                    .set_google_event_id(event.id, &google_event_id)
                    .await?;
                event.google_event_id = Some(google_event_id);
            }
            Err(e) => {
                // O evento fica de pé sem id externo
                tracing::error!(
                    "Erro ao sincronizar o evento {} ({}) com o Google Calendar: {}",
                    event.id,
                    event.title,
                    e
                );
            }
        }

        let calendar_url = match self.setup.get().await {
            Ok(Some(setup)) => setup.calendar_url,
            _ => DEFAULT_CALENDAR_URL.to_string(),
        };

        let notification = self
            .notifier
            .send(
                "Evento Criado com Sucesso",
                "email/event_created_notification.html",
                context! { event => event, calendar_url => calendar_url },
                &[owner.email.clone()],
            )
            .await;
        if let Err(e) = notification {
            tracing::error!(
                "Erro ao notificar a criação do evento {} para {}: {}",
                event.id,
                owner.email,
                e
            );
        }

        Ok(event)
    }

    /// Regrava o evento e aplica a ação externa planejada. `was_cancelled`
    /// distingue a transição de cancelamento de uma edição comum.
    pub async fn update_event(&self, event: Event, was_cancelled: bool) -> Result<Event, AppError> {
        let event = self.events.update(&event).await?;

        match plan_sync(false, event.is_cancelled, event.google_event_id.is_some()) {
            SyncAction::Delete => {
                if !was_cancelled {
                    self.cancel_upstream(&event).await;
                }
            }
            SyncAction::Update => {
                let lodge_name = self.lodge_name(event.lodge_id).await;
                if let Err(e) = self.calendar.update(&event, lodge_name.as_deref()).await {
                    tracing::error!(
                        "Erro ao atualizar o evento {} ({}) no Google Calendar: {}",
                        event.id,
                        event.title,
                        e
                    );
                }
            }
            SyncAction::Nothing => {
                if event.is_cancelled && !was_cancelled {
                    tracing::warn!(
                        "Evento {} cancelado sem id externo; nada a excluir na agenda.",
                        event.id
                    );
                }
            }
            SyncAction::Create => unreachable!("atualização nunca planeja criação"),
        }

        Ok(event)
    }

    // Exclui na agenda externa e, só então, avisa o dono. Falha na
    // exclusão fica no log e suprime o aviso, como no fluxo original.
    async fn cancel_upstream(&self, event: &Event) {
        if let Err(e) = self.calendar.delete(event).await {
            tracing::error!(
                "Erro ao excluir o evento {} ({}) do Google Calendar: {}",
                event.id,
                event.title,
                e
            );
            return;
        }

        let owner_email = match self.users.find_by_id(event.user_id).await {
            Ok(Some(owner)) => owner.email,
            Ok(None) => {
                tracing::warn!("Dono do evento {} não encontrado para notificar.", event.id);
                return;
            }
            Err(e) => {
                tracing::error!("Falha ao carregar o dono do evento {}: {}", event.id, e);
                return;
            }
        };

        let notification = self
            .notifier
            .send(
                "Evento Cancelado",
                "email/event_cancelled_notification.html",
                context! { event => event },
                &[owner_email.clone()],
            )
            .await;
        if let Err(e) = notification {
            tracing::error!(
                "Erro ao notificar o cancelamento do evento {} para {}: {}",
                event.id,
                owner_email,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evento_ativo_sem_id_externo_nunca_gera_atualizacao() {
        assert_eq!(plan_sync(false, false, false), SyncAction::Nothing);
    }

    #[test]
    fn cancelamento_com_id_externo_gera_exatamente_uma_exclusao() {
        assert_eq!(plan_sync(false, true, true), SyncAction::Delete);
    }

    #[test]
    fn cancelamento_sem_id_externo_nao_chama_a_agenda() {
        assert_eq!(plan_sync(false, true, false), SyncAction::Nothing);
    }

    #[test]
    fn edicao_de_evento_sincronizado_gera_atualizacao() {
        assert_eq!(plan_sync(false, false, true), SyncAction::Update);
    }

    #[test]
    fn criacao_sempre_cria_na_agenda() {
        assert_eq!(plan_sync(true, false, false), SyncAction::Create);
        assert_eq!(plan_sync(true, false, true), SyncAction::Create);
    }
}
