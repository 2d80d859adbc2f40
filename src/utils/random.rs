//! Random tokens drawn from the OS CSPRNG.
use core::fmt::Write as _;

/// Fill a fresh buffer of `N` bytes from the OS random source.
fn random_bytes<const N: usize>() -> Result<[u8; N], getrandom::Error> {
    let mut buf = [0_u8; N];
    getrandom::fill(&mut buf)?;
    Ok(buf)
}

/// Generate a random token of `N` bytes, hex encoded.
pub fn hex_token<const N: usize>() -> Result<String, getrandom::Error> {
    Ok(random_bytes::<N>()?
        .into_iter()
        .fold(String::with_capacity(N * 2), |mut acc, byte| {
            // Writing to a String cannot fail.
            let _ = write!(acc, "{byte:02x}");
            acc
        }))
}
