use rand::RngExt;

/// Alphabet for codes and refresh tokens. Alphanumeric only, so values are
/// safe in query strings and headers without escaping.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric secret of `len` characters from the
/// thread-local CSPRNG.
pub fn generate_secure_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
