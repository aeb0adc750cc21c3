//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::io;
use std::path::Path;

/// Load the PEM certificate chain and private key for the HTTPS listener.
pub async fn load_tls_config(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<RustlsConfig, io::Error> {
    let (cert_path, key_path) = (cert_path.as_ref(), key_path.as_ref());
    for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{kind} file not found: {}", path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
