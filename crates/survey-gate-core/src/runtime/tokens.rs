// crates/survey-gate-core/src/runtime/tokens.rs
// ============================================================================
// Module: Survey Gate Participant Token Manager
// Description: Find-or-create participant tokens bounded by survey schedule.
// Purpose: Guarantee one token per (survey, email) and avoid redirect loops.
// Dependencies: crate::{core, interfaces}, rand, thiserror
// ============================================================================

//! ## Overview
//! [`ParticipantTokenManager::obtain_token`] reuses the token already issued
//! to an email or creates one. Creation relies on the store's uniqueness
//! guarantee: when a concurrent request wins the insert, the loser observes
//! [`StoreError::Conflict`], re-reads, and returns the winner's token. A
//! visitor who already carries a token and already has a record gets no
//! redirect, which keeps an authenticated visitor from bouncing back to the
//! survey URL forever.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::core::AccessToken;
use crate::core::NewParticipantToken;
use crate::core::ParticipantIdentity;
use crate::core::SurveyId;
use crate::core::SurveySchedule;
use crate::interfaces::GeneratorError;
use crate::interfaces::ParticipantTokenStore;
use crate::interfaces::StoreError;
use crate::interfaces::TokenGenerator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default access token length.
pub const DEFAULT_TOKEN_LENGTH: usize = 15;
/// Default number of find-or-create rounds before giving up.
pub const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 3;
/// Token alphabet.
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
/// Largest byte value accepted before modulo reduction (unbiased sampling).
const TOKEN_BYTE_LIMIT: u8 = 248;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token issuance errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The identity has no email to key the token.
    #[error("participant identity has no email")]
    MissingEmail,
    /// The token store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The token generator failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// Every find-or-create round lost a race or collided.
    #[error("token creation gave up after {attempts} attempts")]
    Exhausted {
        /// Rounds attempted.
        attempts: u32,
    },
}

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Input to [`ParticipantTokenManager::obtain_token`].
#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
    /// Survey identifier.
    pub survey_id: &'a SurveyId,
    /// Participant identity.
    pub identity: &'a ParticipantIdentity,
    /// Survey validity window.
    pub schedule: &'a SurveySchedule,
    /// Whether the current request already carries a token parameter.
    pub already_carrying_token: bool,
}

/// How the manager satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDisposition {
    /// A new token was created.
    Created,
    /// An existing token was reused.
    Reused,
    /// The visitor already carries a token; nothing to do.
    AlreadyCarrying,
}

/// Result of [`ParticipantTokenManager::obtain_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResult {
    /// Token to redirect with; `None` when no redirect is needed.
    pub redirect_token: Option<AccessToken>,
    /// How the request was satisfied.
    pub disposition: TokenDisposition,
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Finds or creates participant tokens.
pub struct ParticipantTokenManager<S, G> {
    /// Token store.
    store: S,
    /// Token string generator.
    generator: G,
    /// Maximum find-or-create rounds.
    max_create_attempts: u32,
}

impl<S, G> ParticipantTokenManager<S, G>
where
    S: ParticipantTokenStore,
    G: TokenGenerator,
{
    /// Creates a manager with the default attempt budget.
    #[must_use]
    pub const fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }

    /// Overrides the attempt budget (minimum one round).
    #[must_use]
    pub fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = attempts.max(1);
        self
    }

    /// Finds or creates the token for the request's `(survey, email)`.
    ///
    /// A lost creation race is resolved by re-reading the winner's record and
    /// does not consume an attempt; only token string collisions do.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the identity has no email, the store or
    /// generator fails, or the attempt budget is exhausted.
    pub fn obtain_token(&self, request: TokenRequest<'_>) -> Result<TokenResult, TokenError> {
        if !request.identity.has_email() {
            return Err(TokenError::MissingEmail);
        }
        let email = request.identity.email.as_str();
        for _ in 0 .. self.max_create_attempts {
            if let Some(existing) = self.store.find(request.survey_id, email)? {
                return Ok(reuse(existing.token, request.already_carrying_token));
            }
            let token = self.generator.generate(request.survey_id)?;
            let record = NewParticipantToken::from_identity(
                request.survey_id.clone(),
                request.identity,
                request.schedule,
                token,
            );
            match self.store.insert(record) {
                Ok(created) => {
                    return Ok(TokenResult {
                        redirect_token: Some(created.token),
                        disposition: TokenDisposition::Created,
                    });
                }
                Err(StoreError::Conflict {
                    ..
                }) => {
                    // The winner's row is committed before the conflict is reported.
                    if let Some(winner) = self.store.find(request.survey_id, email)? {
                        return Ok(reuse(winner.token, request.already_carrying_token));
                    }
                }
                Err(StoreError::TokenCollision {
                    ..
                }) => {}
                Err(err) => return Err(TokenError::Store(err)),
            }
        }
        Err(TokenError::Exhausted {
            attempts: self.max_create_attempts,
        })
    }
}

/// Builds the result for a token that already exists.
fn reuse(token: AccessToken, already_carrying_token: bool) -> TokenResult {
    if already_carrying_token {
        return TokenResult {
            redirect_token: None,
            disposition: TokenDisposition::AlreadyCarrying,
        };
    }
    TokenResult {
        redirect_token: (!token.is_empty()).then_some(token),
        disposition: TokenDisposition::Reused,
    }
}

// ============================================================================
// SECTION: Random Token Generator
// ============================================================================

/// Alphanumeric token generator backed by the OS RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    /// Token length in characters.
    length: usize,
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

impl RandomTokenGenerator {
    /// Creates a generator producing tokens of `length` characters.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self {
            length,
        }
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self, _survey_id: &SurveyId) -> Result<AccessToken, GeneratorError> {
        let mut out = String::with_capacity(self.length);
        let mut buffer = [0_u8; 64];
        while out.len() < self.length {
            OsRng.try_fill_bytes(&mut buffer).map_err(|err| GeneratorError(err.to_string()))?;
            for byte in buffer {
                if out.len() == self.length {
                    break;
                }
                if byte < TOKEN_BYTE_LIMIT {
                    let index = usize::from(byte) % TOKEN_ALPHABET.len();
                    out.push(char::from(TOKEN_ALPHABET[index]));
                }
            }
        }
        Ok(AccessToken::new(out))
    }
}
