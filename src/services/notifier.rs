// src/services/notifier.rs
//
// Envio de notificações por e-mail: renderiza um template nomeado com um
// contexto, deriva o texto puro do HTML e despacha pelo transporte
// configurado. Sem retry interno: quem chama decide se degrada ou propaga.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use minijinja::Environment;
use serde::Serialize;

use crate::common::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &OutgoingEmail) -> Result<(), AppError>;
}

// Transporte via API HTTP da Resend.
pub struct ResendTransport {
    client: reqwest::Client,
    api_key: String,
}

impl ResendTransport {
    const API_URL: &'static str = "https://api.resend.com/emails";

    pub fn new(api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent("agenda-maconica/1.0 (+reqwest)")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    async fn deliver(&self, message: &OutgoingEmail) -> Result<(), AppError> {
        let response = self
            .client
            .post(Self::API_URL)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::Mail(format!("falha no envio: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::Mail(format!("HTTP {status}: {body}")))
        }
    }
}

// Os templates são embutidos no binário em tempo de compilação.
fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    let templates: &[(&str, &str)] = &[
        (
            "email/store_request_notification.html",
            include_str!("../../templates/email/store_request_notification.html"),
        ),
        (
            "email/store_request_approval.html",
            include_str!("../../templates/email/store_request_approval.html"),
        ),
        (
            "email/user_request_notification.html",
            include_str!("../../templates/email/user_request_notification.html"),
        ),
        (
            "email/user_request_confirmation.html",
            include_str!("../../templates/email/user_request_confirmation.html"),
        ),
        (
            "email/user_request_approval.html",
            include_str!("../../templates/email/user_request_approval.html"),
        ),
        (
            "email/event_created_notification.html",
            include_str!("../../templates/email/event_created_notification.html"),
        ),
        (
            "email/event_cancelled_notification.html",
            include_str!("../../templates/email/event_cancelled_notification.html"),
        ),
        (
            "email/google_calendar_error.html",
            include_str!("../../templates/email/google_calendar_error.html"),
        ),
    ];
    for (name, source) in templates {
        env.add_template(name, source)
            .expect("template embutido inválido");
    }
    env
}

/// Deriva o corpo em texto puro removendo as tags do HTML renderizado.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    // Linhas em branco geradas pelas tags removidas não interessam
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
pub struct Notifier {
    env: Arc<Environment<'static>>,
    transport: Arc<dyn MailTransport>,
    from: String,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, from: String) -> Self {
        Self {
            env: Arc::new(build_environment()),
            transport,
            from,
        }
    }

    /// Renderiza o template nomeado e envia como HTML com fallback em texto.
    pub async fn send(
        &self,
        subject: &str,
        template_name: &str,
        context: minijinja::Value,
        recipients: &[String],
    ) -> Result<(), AppError> {
        let template = self.env.get_template(template_name)?;
        let html = template.render(context)?;
        let text = strip_tags(&html);

        let message = OutgoingEmail {
            from: self.from.clone(),
            to: recipients.to_vec(),
            subject: subject.to_string(),
            html: Some(html),
            text: Some(text),
        };

        self.transport.deliver(&message).await
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    // Transporte de mentira que só registra o que seria enviado.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingTransport {
        pub fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.subject.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: &OutgoingEmail) -> Result<(), AppError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(AppError::Mail("transporte indisponível".into()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingTransport;
    use super::*;
    use minijinja::context;
    use std::sync::Arc;

    #[test]
    fn strip_tags_remove_a_marcacao_e_preserva_o_texto() {
        let html = "<html><body><h2>Olá, Carlos</h2>\n<p>Sua solicitação foi <b>aprovada</b>.</p></body></html>";
        let text = strip_tags(html);
        assert_eq!(text, "Olá, Carlos\nSua solicitação foi aprovada.");
    }

    #[test]
    fn todos_os_templates_embutidos_renderizam() {
        let env = build_environment();
        for name in [
            "email/store_request_notification.html",
            "email/store_request_approval.html",
            "email/user_request_notification.html",
            "email/user_request_confirmation.html",
            "email/user_request_approval.html",
            "email/event_created_notification.html",
            "email/event_cancelled_notification.html",
            "email/google_calendar_error.html",
        ] {
            assert!(env.get_template(name).is_ok(), "template ausente: {name}");
        }
    }

    #[tokio::test]
    async fn envia_html_com_fallback_em_texto() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(transport.clone(), "agenda@example.com".into());

        notifier
            .send(
                "Erro no Google Calendar - Teste",
                "email/google_calendar_error.html",
                context! { operation => "Teste", error_message => "quota excedida" },
                &["admin@example.com".to_string()],
            )
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert_eq!(message.to, vec!["admin@example.com".to_string()]);
        let html = message.html.as_deref().unwrap();
        assert!(html.contains("quota excedida"));
        let text = message.text.as_deref().unwrap();
        assert!(!text.contains('<'));
        assert!(text.contains("quota excedida"));
    }
}
