use std::net::{IpAddr, SocketAddr};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde_json::{Value, json};

use crate::client_ip::client_ip;
use crate::error::AppError;
use crate::forms::fields::{
    AutoLead, ContatoLead, DiagnosticoLead, EmpresarialLead, PatrimonialLead, RcProfissionalLead,
    ResidencialLead, VidaLead,
};
use crate::forms::{FormError, LeadFields};
use crate::pages::{self, CONTACT_FORM, FormKind, LEAD_FORM, Page};
use crate::session::Session;
use crate::state::SharedState;
use crate::submission::SubmissionResult;
use crate::submission::parser;

type Outcome = Result<SubmissionResult, FormError>;

/// Main lead form of a page.
pub async fn submit_lead(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(CookieJar, Response), AppError> {
    let page = find_page(&slug)?;
    check_rate(&state, &headers, addr.ip())?;

    let (jar, session) = state.sessions.resolve(jar, state.config.cookie_secure);
    let content_type = content_type(&headers);
    let raw = parser::parse_body(content_type, &body).map_err(AppError::BadRequest)?;

    let outcome = match page.form {
        FormKind::Diagnostico => {
            submit::<DiagnosticoLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?
        }
        FormKind::Auto => submit::<AutoLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?,
        FormKind::Vida => submit::<VidaLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?,
        FormKind::Residencial => {
            submit::<ResidencialLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?
        }
        FormKind::Empresarial => {
            submit::<EmpresarialLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?
        }
        FormKind::Patrimonial => {
            submit::<PatrimonialLead>(&state, &session, page, LEAD_FORM, page.service, raw).await?
        }
        FormKind::RcProfissional => {
            submit::<RcProfissionalLead>(&state, &session, page, LEAD_FORM, page.service, raw)
                .await?
        }
    };

    let thank_you = format!("{}?enviado=1", page.path);
    let response = respond(outcome, parser::is_html_form(content_type), page, &thank_you)?;
    Ok((jar, response))
}

/// Chat widget contact form. Accepted leads continue on WhatsApp.
pub async fn submit_contact(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(CookieJar, Response), AppError> {
    let page = find_page(&slug)?;
    check_rate(&state, &headers, addr.ip())?;

    let (jar, session) = state.sessions.resolve(jar, state.config.cookie_secure);
    let content_type = content_type(&headers);
    let raw = parser::parse_body(content_type, &body).map_err(AppError::BadRequest)?;

    let outcome = submit::<ContatoLead>(
        &state,
        &session,
        page,
        CONTACT_FORM,
        page.contact_service(),
        raw,
    )
    .await?;

    let handoff = pages::whatsapp_link(&state.config.whatsapp_number, page);
    let response = respond(outcome, parser::is_html_form(content_type), page, &handoff)?;
    Ok((jar, response))
}

/// First interaction with a form's fields.
pub async fn start_form(
    State(state): State<SharedState>,
    Path((slug, form)): Path<(String, String)>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let page = find_page(&slug)?;
    let (jar, session) = state.sessions.resolve(jar, state.config.cookie_secure);

    let emitted = match form.as_str() {
        LEAD_FORM => match page.form {
            FormKind::Diagnostico => start::<DiagnosticoLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::Auto => start::<AutoLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::Vida => start::<VidaLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::Residencial => start::<ResidencialLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::Empresarial => start::<EmpresarialLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::Patrimonial => start::<PatrimonialLead>(&state, &session, page, LEAD_FORM, page.service)?,
            FormKind::RcProfissional => {
                start::<RcProfissionalLead>(&state, &session, page, LEAD_FORM, page.service)?
            }
        },
        CONTACT_FORM => {
            start::<ContatoLead>(&state, &session, page, CONTACT_FORM, page.contact_service())?
        }
        _ => return Err(AppError::NotFound(format!("Unknown form: {form}"))),
    };

    Ok((jar, Json(json!({ "emitted": emitted }))))
}

async fn submit<F: LeadFields>(
    state: &SharedState,
    session: &Session,
    page: &Page,
    form: &str,
    service_name: &str,
    raw: Value,
) -> Result<Outcome, AppError> {
    let fields: F = serde_json::from_value(raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid form fields: {e}")))?;
    let lead_form = state.lead_form::<F>(session, page, form, service_name)?;
    Ok(lead_form.submit(fields).await)
}

fn start<F: LeadFields>(
    state: &SharedState,
    session: &Session,
    page: &Page,
    form: &str,
    service_name: &str,
) -> Result<bool, AppError> {
    Ok(state.lead_form::<F>(session, page, form, service_name)?.start())
}

/// HTML forms are redirected, to `success_target` when the lead was
/// accepted and back to the page otherwise. Script callers get the result.
fn respond(
    outcome: Outcome,
    html: bool,
    page: &Page,
    success_target: &str,
) -> Result<Response, AppError> {
    match (outcome, html) {
        (Ok(result), true) if result.success => Ok(Redirect::to(success_target).into_response()),
        (_, true) => Ok(Redirect::to(page.path).into_response()),
        (Ok(result), false) => {
            let status = if result.success {
                StatusCode::OK
            } else {
                StatusCode::BAD_GATEWAY
            };
            Ok((status, Json(result)).into_response())
        }
        (Err(e), false) => Err(e.into()),
    }
}

fn find_page(slug: &str) -> Result<&'static Page, AppError> {
    pages::by_slug(slug).ok_or_else(|| AppError::NotFound(format!("Unknown page: {slug}")))
}

fn check_rate(state: &SharedState, headers: &HeaderMap, peer: IpAddr) -> Result<(), AppError> {
    let ip = client_ip(headers, peer, &state.config.trusted_proxies);
    state.submission_limiter.check(ip).map_err(|retry_after| {
        tracing::warn!(%ip, "Lead submission rate limited");
        AppError::RateLimited(format!(
            "Too many submissions. Retry after {}s",
            retry_after.as_secs().max(1)
        ))
    })
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}
