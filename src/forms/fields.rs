//! Field sets for every lead form on the site.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{FieldKind, FieldSpec, LeadFields};

const NOME: FieldSpec = FieldSpec {
    name: "nome",
    label: "Nome",
    kind: FieldKind::Text,
    required: true,
};
const WHATSAPP: FieldSpec = FieldSpec {
    name: "whatsapp",
    label: "WhatsApp",
    kind: FieldKind::Tel,
    required: true,
};
const EMAIL: FieldSpec = FieldSpec {
    name: "email",
    label: "E-mail",
    kind: FieldKind::Email,
    required: false,
};
const CIDADE: FieldSpec = FieldSpec {
    name: "cidade",
    label: "Cidade",
    kind: FieldKind::Text,
    required: false,
};
const EMPRESA: FieldSpec = FieldSpec {
    name: "empresa",
    label: "Empresa",
    kind: FieldKind::Text,
    required: true,
};
const LGPD: FieldSpec = FieldSpec {
    name: "lgpdConsent",
    label: "Concordo com o tratamento dos meus dados para contato, conforme a LGPD.",
    kind: FieldKind::Consent,
    required: true,
};

/// Checkbox values arrive as `true`, `"on"`, `"true"`, `"1"` or `"yes"`.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.as_str(), "on" | "true" | "1" | "yes"),
        Value::Number(n) => n.as_u64() == Some(1),
        _ => false,
    })
}

/// A string, or a list of strings joined with `", "`.
fn joined<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Home page risk diagnostic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticoLead {
    pub nome: String,
    pub whatsapp: String,
    pub email: String,
    pub cidade: String,
    #[serde(deserialize_with = "joined")]
    pub interesse: String,
}

impl LeadFields for DiagnosticoLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        WHATSAPP,
        EMAIL,
        CIDADE,
        FieldSpec {
            name: "interesse",
            label: "Interesse",
            kind: FieldKind::MultiSelect(&[
                "Seguro de Vida",
                "Seguro Auto",
                "Seguro Residencial",
                "Seguro Empresarial",
                "Seguro Patrimonial",
                "RC Profissional",
            ]),
            required: false,
        },
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoLead {
    pub nome: String,
    pub whatsapp: String,
    pub email: String,
    pub cidade: String,
    pub tipo_solicitacao: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for AutoLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        WHATSAPP,
        EMAIL,
        CIDADE,
        FieldSpec {
            name: "tipoSolicitacao",
            label: "Tipo de solicitação",
            kind: FieldKind::Select(&["Cotação nova", "Renovação", "Revisão de apólice"]),
            required: false,
        },
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VidaLead {
    pub nome: String,
    pub whatsapp: String,
    pub email: String,
    pub dependentes: String,
    pub perfil: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for VidaLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        WHATSAPP,
        EMAIL,
        FieldSpec {
            name: "dependentes",
            label: "Possui dependentes?",
            kind: FieldKind::Select(&["Sim", "Não"]),
            required: false,
        },
        FieldSpec {
            name: "perfil",
            label: "Perfil",
            kind: FieldKind::Select(&["CLT", "Autônomo", "Empresário", "Profissional liberal"]),
            required: false,
        },
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResidencialLead {
    pub nome: String,
    pub whatsapp: String,
    pub email: String,
    pub tipo: String,
    pub cidade: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for ResidencialLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        WHATSAPP,
        EMAIL,
        FieldSpec {
            name: "tipo",
            label: "Tipo de imóvel",
            kind: FieldKind::Select(&["Casa", "Apartamento", "Casa em condomínio"]),
            required: false,
        },
        CIDADE,
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmpresarialLead {
    pub nome: String,
    pub empresa: String,
    pub whatsapp: String,
    pub segmento: String,
    pub cidade: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for EmpresarialLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        EMPRESA,
        WHATSAPP,
        FieldSpec {
            name: "segmento",
            label: "Segmento",
            kind: FieldKind::Text,
            required: false,
        },
        CIDADE,
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatrimonialLead {
    pub nome: String,
    pub empresa: String,
    pub whatsapp: String,
    pub cidade: String,
    pub segmento: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for PatrimonialLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        EMPRESA,
        WHATSAPP,
        CIDADE,
        FieldSpec {
            name: "segmento",
            label: "Segmento",
            kind: FieldKind::Text,
            required: false,
        },
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RcProfissionalLead {
    pub nome: String,
    pub profissao: String,
    pub whatsapp: String,
    pub email: String,
    pub atende_como: String,
    #[serde(deserialize_with = "checkbox")]
    pub lgpd_consent: bool,
}

impl LeadFields for RcProfissionalLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        FieldSpec {
            name: "profissao",
            label: "Profissão",
            kind: FieldKind::Text,
            required: true,
        },
        WHATSAPP,
        EMAIL,
        FieldSpec {
            name: "atendeComo",
            label: "Atende como",
            kind: FieldKind::Select(&["Pessoa física", "Pessoa jurídica"]),
            required: false,
        },
        LGPD,
    ];

    fn consent(&self) -> Option<bool> {
        Some(self.lgpd_consent)
    }
}

/// Chat widget contact, handed off to WhatsApp after submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContatoLead {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cidade: String,
}

impl LeadFields for ContatoLead {
    const FIELDS: &'static [FieldSpec] = &[
        NOME,
        FieldSpec {
            name: "email",
            label: "E-mail",
            kind: FieldKind::Email,
            required: true,
        },
        FieldSpec {
            name: "telefone",
            label: "Telefone",
            kind: FieldKind::Tel,
            required: true,
        },
        CIDADE,
    ];
}
