// crates/survey-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Survey Gate Access Gate
// Description: Request-scoped orchestration of the survey access flow.
// Purpose: Map one inbound request to exactly one observable outcome.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`AccessGate::handle`] walks a strict linear decision tree:
//!
//! 1. no gating record or gating disabled: passthrough
//! 2. unauthenticated: redirect to the identity provider login
//! 3. attributes fail the requirement: render the denial page
//! 4. attributes pass without an email: render the denial page naming the
//!    missing email attribute, since logging in again yields the same identity
//! 5. attributes pass: find or create the participant token, then redirect
//!    to the survey with it, or proceed when the visitor is already tokened
//!
//! Security posture: the gate fails closed. Session timeouts and failures,
//! store errors, and rendering errors all degrade to a login redirect and are
//! recorded in the audit log; no error detail reaches the visitor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::AccessAuditEvent;
use crate::core::AccessDecision;
use crate::core::AccessToken;
use crate::core::AuditOutcome;
use crate::core::AttributeKey;
use crate::core::AuditReason;
use crate::core::EmptyAttributesPolicy;
use crate::core::IdentityMapping;
use crate::core::ParticipantIdentity;
use crate::core::SurveyId;
use crate::interfaces::AuditSink;
use crate::interfaces::DenialCause;
use crate::interfaces::DenialRenderer;
use crate::interfaces::DenialView;
use crate::interfaces::IdentitySession;
use crate::interfaces::ParticipantTokenStore;
use crate::interfaces::SessionError;
use crate::interfaces::SurveyDirectory;
use crate::interfaces::SurveyRecord;
use crate::interfaces::TokenGenerator;
use crate::runtime::engine::AccessDecisionEngine;
use crate::runtime::engine::received_values;
use crate::runtime::link::SurveyLinkBuilder;
use crate::runtime::tokens::ParticipantTokenManager;
use crate::runtime::tokens::TokenDisposition;
use crate::runtime::tokens::TokenRequest;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Access gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessGateConfig {
    /// Attribute names holding the participant's email and names.
    pub mapping: IdentityMapping,
    /// Handling of sessions that returned no attributes.
    pub empty_attributes: EmptyAttributesPolicy,
}

// ============================================================================
// SECTION: Requests and Responses
// ============================================================================

/// Inbound survey request as seen by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    /// Survey being requested.
    pub survey_id: SurveyId,
    /// Requested display language, if any.
    pub language: Option<String>,
    /// Token parameter carried by the request, if any.
    pub token: Option<AccessToken>,
}

impl GateRequest {
    /// Creates a request without language or token parameters.
    #[must_use]
    pub const fn new(survey_id: SurveyId) -> Self {
        Self {
            survey_id,
            language: None,
            token: None,
        }
    }

    /// Sets the requested language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the carried token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns true when the request carries a non-empty token parameter.
    #[must_use]
    pub fn carries_token(&self) -> bool {
        self.token.as_ref().is_some_and(|token| !token.is_empty())
    }

    /// Returns the requested language when it is non-empty.
    fn requested_language(&self) -> Option<&str> {
        self.language.as_deref().map(str::trim).filter(|language| !language.is_empty())
    }
}

/// Terminal outcome of one gate invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResponse {
    /// Survey is not gated; serve the request unmodified.
    Passthrough,
    /// Send the visitor to the identity provider.
    RedirectToLogin {
        /// Login URL.
        url: String,
    },
    /// Send the visitor to the survey with their token.
    RedirectToSurvey {
        /// Survey entry URL carrying the token.
        url: String,
        /// Issued or reused token.
        token: AccessToken,
    },
    /// Visitor is already tokened; serve the survey normally.
    Proceed,
    /// Visitor is denied; emit `content` and render nothing else.
    Denied {
        /// Fields supplied to the renderer.
        view: DenialView,
        /// Rendered page content.
        content: String,
    },
}

// ============================================================================
// SECTION: Access Gate
// ============================================================================

/// Request-scoped survey access gate.
pub struct AccessGate<D, S, G, R, A> {
    /// Survey configuration source.
    directory: D,
    /// Participant token manager.
    tokens: ParticipantTokenManager<S, G>,
    /// Survey redirect link builder.
    links: SurveyLinkBuilder,
    /// Denial page renderer.
    renderer: R,
    /// Audit sink for outcomes.
    audit: A,
    /// Attribute decision engine.
    engine: AccessDecisionEngine,
    /// Identity attribute mapping.
    mapping: IdentityMapping,
}

impl<D, S, G, R, A> AccessGate<D, S, G, R, A>
where
    D: SurveyDirectory,
    S: ParticipantTokenStore,
    G: TokenGenerator,
    R: DenialRenderer,
    A: AuditSink,
{
    /// Creates a new access gate.
    #[must_use]
    pub fn new(
        config: AccessGateConfig,
        directory: D,
        tokens: ParticipantTokenManager<S, G>,
        links: SurveyLinkBuilder,
        renderer: R,
        audit: A,
    ) -> Self {
        Self {
            directory,
            tokens,
            links,
            renderer,
            audit,
            engine: AccessDecisionEngine::new(config.empty_attributes),
            mapping: config.mapping,
        }
    }

    /// Handles one survey request against the visitor's identity session.
    #[must_use]
    pub fn handle(&self, request: &GateRequest, session: &dyn IdentitySession) -> GateResponse {
        let survey_id = &request.survey_id;
        let record = match self.directory.survey(survey_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                return self.passthrough(survey_id, AuditReason::UnknownSurvey);
            }
            Err(_) => {
                return self.login(session, survey_id, AuditReason::DirectoryFailure, None);
            }
        };
        if !record.requirement.enabled {
            return self.passthrough(survey_id, AuditReason::Disabled);
        }

        match session.is_authenticated() {
            Ok(true) => {}
            Ok(false) => {
                return self.login(session, survey_id, AuditReason::Unauthenticated, None);
            }
            Err(err) => return self.login(session, survey_id, session_reason(&err), None),
        }
        let attributes = match session.attributes() {
            Ok(attributes) => attributes,
            Err(err) => return self.login(session, survey_id, session_reason(&err), None),
        };

        let language = request.requested_language().unwrap_or(&record.language).to_string();
        let identity =
            ParticipantIdentity::from_attributes(&attributes, &self.mapping, Some(language));

        let required = record.requirement.effective();
        match self.engine.decide(&required, &attributes) {
            AccessDecision::Granted if !identity.has_email() => {
                let email_attribute = AttributeKey::new(self.mapping.email.clone());
                let refusal = Refusal {
                    cause: DenialCause::MissingEmail {
                        attribute: email_attribute.clone(),
                    },
                    reason: AuditReason::IdentityIncomplete,
                    failed_attribute: email_attribute,
                    received: received_values(&required, &attributes),
                    required,
                };
                self.deny(session, &record, &identity, refusal)
            }
            AccessDecision::Granted => self.grant(request, session, &record, &identity),
            AccessDecision::Denied(diagnostics) => {
                let refusal = Refusal {
                    cause: DenialCause::AttributeMismatch,
                    reason: AuditReason::AttributeMismatch,
                    failed_attribute: diagnostics.failed_attribute,
                    required: diagnostics.required,
                    received: diagnostics.received,
                };
                self.deny(session, &record, &identity, refusal)
            }
        }
    }

    /// Issues or reuses the token for a granted visitor.
    fn grant(
        &self,
        request: &GateRequest,
        session: &dyn IdentitySession,
        record: &SurveyRecord,
        identity: &ParticipantIdentity,
    ) -> GateResponse {
        let survey_id = &request.survey_id;
        let email = identity.email.as_str();
        let token_request = TokenRequest {
            survey_id,
            identity,
            schedule: &record.schedule,
            already_carrying_token: request.carries_token(),
        };
        let result = match self.tokens.obtain_token(token_request) {
            Ok(result) => result,
            Err(_) => {
                return self.login(session, survey_id, AuditReason::StoreFailure, Some(email));
            }
        };
        let reason = match result.disposition {
            TokenDisposition::Created => AuditReason::TokenCreated,
            TokenDisposition::Reused => AuditReason::TokenReused,
            TokenDisposition::AlreadyCarrying => AuditReason::AlreadyTokened,
        };
        let Some(token) = result.redirect_token else {
            self.record(
                AccessAuditEvent::new(survey_id.clone(), AuditOutcome::Proceed, reason)
                    .with_subject(email),
            );
            return GateResponse::Proceed;
        };
        match self.links.token_url(survey_id, &token) {
            Ok(url) => {
                self.record(
                    AccessAuditEvent::new(survey_id.clone(), AuditOutcome::TokenRedirect, reason)
                        .with_subject(email),
                );
                GateResponse::RedirectToSurvey {
                    url: url.into(),
                    token,
                }
            }
            Err(_) => self.login(session, survey_id, AuditReason::LinkFailure, Some(email)),
        }
    }

    /// Renders the denial page and ends the request there.
    fn deny(
        &self,
        session: &dyn IdentitySession,
        record: &SurveyRecord,
        identity: &ParticipantIdentity,
        refusal: Refusal,
    ) -> GateResponse {
        let survey_id = &record.requirement.survey_id;
        let email = identity.email.as_str();
        let view = DenialView {
            survey_id: survey_id.clone(),
            language: identity.language.clone().unwrap_or_else(|| record.language.clone()),
            cause: refusal.cause,
            required: refusal.required,
            received: refusal.received,
            admin_name: record.admin.name.clone(),
            admin_email: record.admin.email.clone(),
        };
        match self.renderer.render(&view) {
            Ok(content) => {
                self.record(
                    AccessAuditEvent::new(survey_id.clone(), AuditOutcome::Denied, refusal.reason)
                        .with_failed_attribute(refusal.failed_attribute)
                        .with_subject(email),
                );
                GateResponse::Denied {
                    view,
                    content,
                }
            }
            Err(_) => self.login(session, survey_id, AuditReason::RenderFailure, Some(email)),
        }
    }

    /// Records a passthrough outcome.
    fn passthrough(&self, survey_id: &SurveyId, reason: AuditReason) -> GateResponse {
        self.record(AccessAuditEvent::new(survey_id.clone(), AuditOutcome::Passthrough, reason));
        GateResponse::Passthrough
    }

    /// Records a login redirect outcome.
    fn login(
        &self,
        session: &dyn IdentitySession,
        survey_id: &SurveyId,
        reason: AuditReason,
        subject: Option<&str>,
    ) -> GateResponse {
        let mut event = AccessAuditEvent::new(survey_id.clone(), AuditOutcome::LoginRedirect, reason);
        if let Some(email) = subject {
            event = event.with_subject(email);
        }
        self.record(event);
        GateResponse::RedirectToLogin {
            url: session.login_url(),
        }
    }

    /// Emits an audit event.
    fn record(&self, event: AccessAuditEvent) {
        self.audit.record(&event);
    }
}

/// Terminal refusal details handed to the denial renderer and audit log.
struct Refusal {
    /// Cause shown to the visitor.
    cause: DenialCause,
    /// Audit reason.
    reason: AuditReason,
    /// Attribute that decided the refusal.
    failed_attribute: AttributeKey,
    /// Constrained requirements.
    required: BTreeMap<AttributeKey, String>,
    /// Presented values for the required keys.
    received: BTreeMap<AttributeKey, String>,
}

/// Maps a session failure to its audit reason.
const fn session_reason(err: &SessionError) -> AuditReason {
    match err {
        SessionError::Timeout => AuditReason::SessionTimeout,
        SessionError::Unavailable(_) => AuditReason::SessionFailure,
    }
}
