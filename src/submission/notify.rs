use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn submitted() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Sucesso".to_string(),
            description: "Solicitação recebida com sucesso. Em breve entraremos em contato."
                .to_string(),
        }
    }

    pub fn submit_failed() -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Erro ao enviar".to_string(),
            description:
                "Ocorreu um erro ao processar sua solicitação. Tente novamente mais tarde."
                    .to_string(),
        }
    }

    pub fn consent_required() -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Consentimento Necessário".to_string(),
            description: "Precisamos do seu consentimento para prosseguir.".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps notices until they are taken, e.g. for the next page render.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(
            &mut *self
                .notices
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn peek(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notice);
    }
}
