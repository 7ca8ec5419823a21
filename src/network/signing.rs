//! Request signing for authenticated exchange endpoints

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use crate::errors::{BotError, BotResult};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Binance: hex HMAC-SHA256 of the query string, keyed with the raw secret.
pub fn binance_signature(secret: &str, query: &str) -> BotResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::config("BINANCE_API_SECRET", format!("HMAC key error: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Kraken: base64 HMAC-SHA512 of `path + SHA256(nonce + body)`, keyed with
/// the base64-decoded secret.
pub fn kraken_signature(secret: &str, path: &str, nonce: u64, body: &str) -> BotResult<String> {
    let key = BASE64
        .decode(secret)
        .map_err(|e| BotError::config("KRAKEN_API_SECRET", format!("secret is not base64: {}", e)))?;

    let mut sha = Sha256::new();
    sha.update(nonce.to_string().as_bytes());
    sha.update(body.as_bytes());
    let digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(&key)
        .map_err(|e| BotError::config("KRAKEN_API_SECRET", format!("HMAC key error: {}", e)))?;
    mac.update(path.as_bytes());
    mac.update(&digest);
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
