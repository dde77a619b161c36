//! Paystack webhook signature verification.
//!
//! Paystack signs every callback with HMAC-SHA512 over the raw request body,
//! keyed by the account's secret key, and sends the hex digest in the
//! `x-paystack-signature` header. The digest must be computed over the exact
//! bytes received: re-serializing the parsed JSON changes key order and
//! whitespace and breaks every legitimate signature.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::paystack_event::PaystackEvent;
use super::webhook_errors::WebhookError;

/// Header carrying the hex HMAC-SHA512 signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

type HmacSha512 = Hmac<Sha512>;

/// Verifier for Paystack webhook signatures.
pub struct PaystackWebhookVerifier {
    secret: SecretString,
}

impl PaystackWebhookVerifier {
    /// Creates a new verifier with the shared secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature, then parses the envelope.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - no header supplied
    /// - `InvalidSignature` - header is not hex or does not match
    /// - `ParseError` - authenticated body is not a valid envelope
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PaystackEvent, WebhookError> {
        self.verify(payload, signature)?;
        PaystackEvent::from_slice(payload)
    }

    /// Checks `signature` against the HMAC of `payload`.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let provided = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.compute_signature(payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Hex signature Paystack would send for `payload`.
    pub fn sign(&self, payload: &[u8]) -> Result<String, WebhookError> {
        self.compute_signature(payload).map(hex::encode)
    }

    fn compute_signature(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha512::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
