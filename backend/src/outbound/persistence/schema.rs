//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// One row per provisioned identity, keyed by username.
    user_identities (username) {
        username -> Text,
        /// Unsigned 64-bit account identifier stored bit-for-bit as `BIGINT`.
        identifier -> Int8,
        email -> Text,
        /// Argon2id PHC string.
        credential_digest -> Text,
        created_at -> Timestamptz,
    }
}
