use crate::forms::fields::{
    AutoLead, ContatoLead, DiagnosticoLead, EmpresarialLead, PatrimonialLead, RcProfissionalLead,
    ResidencialLead, VidaLead,
};
use crate::forms::{FieldSpec, LeadFields};

/// Form key of a page's main lead form.
pub const LEAD_FORM: &str = "lead";
/// Form key of the chat widget contact form.
pub const CONTACT_FORM: &str = "contato";

/// Which field set a page's main form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Diagnostico,
    Auto,
    Vida,
    Residencial,
    Empresarial,
    Patrimonial,
    RcProfissional,
}

impl FormKind {
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            FormKind::Diagnostico => DiagnosticoLead::FIELDS,
            FormKind::Auto => AutoLead::FIELDS,
            FormKind::Vida => VidaLead::FIELDS,
            FormKind::Residencial => ResidencialLead::FIELDS,
            FormKind::Empresarial => EmpresarialLead::FIELDS,
            FormKind::Patrimonial => PatrimonialLead::FIELDS,
            FormKind::RcProfissional => RcProfissionalLead::FIELDS,
        }
    }
}

#[derive(Debug)]
pub struct Page {
    pub slug: &'static str,
    pub path: &'static str,
    pub aliases: &'static [&'static str],
    pub nav_label: &'static str,
    pub title: &'static str,
    pub headline: &'static str,
    /// Service name sent with main form leads.
    pub service: &'static str,
    /// Solution named by the chat widget, if the page has one of its own.
    pub solution: Option<&'static str>,
    pub form: FormKind,
}

impl Page {
    /// Service name used for chat widget leads.
    pub fn contact_service(&self) -> &'static str {
        self.solution.unwrap_or("Chat Geral")
    }

    pub fn contact_fields(&self) -> &'static [FieldSpec] {
        ContatoLead::FIELDS
    }

    pub fn form_key(&self, form: &str) -> String {
        format!("{}/{}", self.slug, form)
    }
}

pub const PAGES: &[Page] = &[
    Page {
        slug: "home",
        path: "/",
        aliases: &[],
        nav_label: "Início",
        title: "Gestão de Risco e Seguros | Orientação Consultiva",
        headline: "Entender riscos, organizar prioridades e estruturar a proteção certa.",
        service: "Diagnóstico de Seguros",
        solution: None,
        form: FormKind::Diagnostico,
    },
    Page {
        slug: "seguro-vida",
        path: "/seguro-vida",
        aliases: &[],
        nav_label: "Vida",
        title: "Seguro de Vida | Orientação Consultiva",
        headline: "Proteção para quem depende de você.",
        service: "Seguro de Vida",
        solution: Some("Seguro de Vida"),
        form: FormKind::Vida,
    },
    Page {
        slug: "seguro-auto",
        path: "/seguro-auto",
        aliases: &[],
        nav_label: "Auto",
        title: "Seguro Auto | Cotação Guiada",
        headline: "Cotação guiada para entender opções e contratar com clareza.",
        service: "Seguro Auto",
        solution: Some("Seguro Auto"),
        form: FormKind::Auto,
    },
    Page {
        slug: "seguro-residencial",
        path: "/seguro-residencial",
        aliases: &[],
        nav_label: "Residencial",
        title: "Seguro Residencial | Orientação Consultiva",
        headline: "Sua casa protegida com coberturas que fazem sentido.",
        service: "Seguro Residencial",
        solution: Some("Seguro Residencial"),
        form: FormKind::Residencial,
    },
    Page {
        slug: "seguro-empresarial",
        path: "/seguro-empresarial",
        aliases: &[],
        nav_label: "Empresarial",
        title: "Seguro Empresarial | Orientação Consultiva",
        headline: "Continuidade do negócio com proteção estruturada.",
        service: "Seguro Empresarial",
        solution: Some("Seguro Empresarial"),
        form: FormKind::Empresarial,
    },
    Page {
        slug: "seguro-patrimonial",
        path: "/seguro-patrimonial",
        aliases: &[],
        nav_label: "Patrimonial",
        title: "Seguro Patrimonial | Orientação Consultiva",
        headline: "Patrimônio protegido contra os riscos que importam.",
        service: "Seguro Patrimonial",
        solution: Some("Seguro Patrimonial"),
        form: FormKind::Patrimonial,
    },
    Page {
        slug: "seguro-rc-profissional",
        path: "/seguro-rc-profissional",
        aliases: &["/seguro-profissional"],
        nav_label: "RC Profissional",
        title: "Seguro RC Profissional | Orientação Consultiva",
        headline: "Responsabilidade civil para quem atende clientes todos os dias.",
        service: "Seguro RC Profissional",
        solution: Some("RC Profissional"),
        form: FormKind::RcProfissional,
    },
];

pub fn by_slug(slug: &str) -> Option<&'static Page> {
    PAGES.iter().find(|p| p.slug == slug)
}

pub fn by_path(path: &str) -> Option<&'static Page> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    PAGES
        .iter()
        .find(|p| p.path == path || p.aliases.iter().any(|alias| *alias == path))
}

/// WhatsApp hand-off link opened after a chat widget lead is accepted.
pub fn whatsapp_link(number: &str, page: &Page) -> String {
    let message = format!(
        "Olá, estou no seu site e quero falar sobre {}",
        page.solution.unwrap_or("soluções")
    );
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://api.whatsapp.com/send/?phone={number}&text={text}")
}
