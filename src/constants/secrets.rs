//! Reading of Docker secrets mounted into the container.
use std::fs::File;
use std::io::Read as _;
use std::path::Path;

/// Directory Docker mounts secrets into.
const DOCKER_SECRETS_PATH: &str = "/run/secrets/";

/// Environment variable naming the Docker secret that holds the JWT signing key.
pub const JWT_SECRET_DOCKER_SECRET: &str = "JWT_SECRET_DOCKER_SECRET";

/// Read the named Docker secret, trimming the trailing newline editors tend to leave.
pub fn read_secret(name: &str) -> Result<String, std::io::Error> {
    let mut secret_val = String::new();
    File::open(Path::new(DOCKER_SECRETS_PATH).join(name.to_lowercase()))?
        .read_to_string(&mut secret_val)?;
    Ok(secret_val.trim_end().to_owned())
}
