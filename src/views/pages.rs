use askama::Template;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::forms::{FieldKind, FieldSpec};
use crate::pages::{self, CONTACT_FORM, LEAD_FORM, PAGES, Page};
use crate::state::SharedState;
use crate::submission::Notice;

/// A form field flattened for the template.
pub struct FieldView {
    pub id: String,
    pub name: &'static str,
    pub label: &'static str,
    pub input: &'static str,
    pub required: bool,
    pub options: &'static [&'static str],
}

impl FieldView {
    fn from_spec(form: &str, spec: &FieldSpec) -> Self {
        let (input, options) = match spec.kind {
            FieldKind::Text => ("text", &[][..]),
            FieldKind::Email => ("email", &[][..]),
            FieldKind::Tel => ("tel", &[][..]),
            FieldKind::Select(options) => ("select", options),
            FieldKind::MultiSelect(options) => ("multiselect", options),
            FieldKind::Consent => ("checkbox", &[][..]),
        };
        Self {
            id: format!("{form}-{}", spec.name),
            name: spec.name,
            label: spec.label,
            input,
            required: spec.required,
            options,
        }
    }
}

fn field_views(form: &str, specs: &[FieldSpec]) -> Vec<FieldView> {
    specs.iter().map(|s| FieldView::from_spec(form, s)).collect()
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    nav: &'static [Page],
    page: &'static Page,
    notices: Vec<Notice>,
    sent: bool,
    lead_action: String,
    lead_start: String,
    lead_fields: Vec<FieldView>,
    contact_action: String,
    contact_start: String,
    contact_service: &'static str,
    contact_fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    nav: &'static [Page],
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub enviado: Option<String>,
}

pub async fn show(
    State(state): State<SharedState>,
    uri: Uri,
    jar: CookieJar,
    Query(q): Query<PageQuery>,
) -> Response {
    let Some(page) = pages::by_path(uri.path()) else {
        return not_found_page();
    };

    let (jar, session) = state.sessions.resolve(jar, state.config.cookie_secure);
    let location = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    session.attribution.capture(location);
    state.analytics.track_page_view(uri.path());

    let template = PageTemplate {
        nav: PAGES,
        page,
        notices: session.notices.take(),
        sent: q.enviado.is_some(),
        lead_action: format!("/leads/{}", page.slug),
        lead_start: format!("/forms/{}/{LEAD_FORM}/start", page.slug),
        lead_fields: field_views(LEAD_FORM, page.form.fields()),
        contact_action: format!("/contato/{}", page.slug),
        contact_start: format!("/forms/{}/{CONTACT_FORM}/start", page.slug),
        contact_service: page.contact_service(),
        contact_fields: field_views(CONTACT_FORM, page.contact_fields()),
    };
    (jar, Html(template.render().unwrap_or_default())).into_response()
}

pub async fn not_found() -> Response {
    not_found_page()
}

fn not_found_page() -> Response {
    let template = NotFoundTemplate { nav: PAGES };
    (
        StatusCode::NOT_FOUND,
        Html(template.render().unwrap_or_default()),
    )
        .into_response()
}
