//! Identity primitives: usernames, email addresses, signup credentials and
//! the persisted identity record.
//!
//! Inbound adapters build these through the validating constructors so the
//! provisioning and profile services only ever see well-formed values.

use std::fmt;

use zeroize::Zeroizing;

use super::{AccountIdentifier, CredentialDigest};

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 64;
/// Maximum email length in characters.
pub const EMAIL_MAX: usize = 254;

/// Domain error returned when identity inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Username exceeded [`USERNAME_MAX`] characters.
    UsernameTooLong { max: usize },
    /// Username contained whitespace or a path separator.
    UsernameInvalidCharacters,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email exceeded [`EMAIL_MAX`] characters.
    EmailTooLong { max: usize },
    /// Email did not have the `local@domain` shape.
    EmailMalformed,
    /// Password was empty.
    EmptyPassword,
}

impl IdentityValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::UsernameTooLong { .. } | Self::UsernameInvalidCharacters => {
                "username"
            }
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::EmailMalformed => "email",
            Self::EmptyPassword => "password",
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::UsernameTooLong { .. } => "username_too_long",
            Self::UsernameInvalidCharacters => "username_invalid_characters",
            Self::EmptyEmail => "empty_email",
            Self::EmailTooLong { .. } => "email_too_long",
            Self::EmailMalformed => "email_malformed",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username must not contain whitespace or '/'")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmailMalformed => write!(f, "email must look like local@domain"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Natural key of an identity record.
///
/// ## Invariants
/// - Trimmed, between 1 and [`USERNAME_MAX`] characters.
/// - Contains no whitespace and no `/`, so it is safe as a path segment.
///
/// # Examples
/// ```
/// use karma_backend::domain::Username;
///
/// let name = Username::new("  bob ").expect("valid username");
/// assert_eq!(name.as_str(), "bob");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Validate and normalise a raw username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(IdentityValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(IdentityValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Contact email recorded with an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate a raw email: one `@` with non-empty parts on both sides.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(IdentityValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let mut parts = trimmed.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None)
                if !local.is_empty()
                    && !domain.is_empty()
                    && !trimmed.chars().any(char::is_whitespace)
        );
        if !well_formed {
            return Err(IdentityValidationError::EmailMalformed);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Email as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated signup request handed to the provisioning service.
///
/// The password keeps caller-provided whitespace and is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupCredentials {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, IdentityValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(IdentityValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// The validated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The validated email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The raw password; never log or persist it.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for SignupCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity record as persisted by the identity store.
///
/// Created once by provisioning and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    username: Username,
    email: EmailAddress,
    identifier: AccountIdentifier,
    credential_digest: CredentialDigest,
}

impl UserIdentity {
    pub fn new(
        username: Username,
        email: EmailAddress,
        identifier: AccountIdentifier,
        credential_digest: CredentialDigest,
    ) -> Self {
        Self {
            username,
            email,
            identifier,
            credential_digest,
        }
    }

    /// The validated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The validated email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Identifier shared with the ledger account.
    pub fn identifier(&self) -> AccountIdentifier {
        self.identifier
    }

    /// Argon2id PHC string for later verification.
    pub fn credential_digest(&self) -> &CredentialDigest {
        &self.credential_digest
    }
}
