use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(test)]
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::{DateTime, TimeZone, Utc};
use rustls::pki_types::{pem::PemObject, CertificateDer, PrivateKeyDer};
use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::time::ASN1Time;

use crate::errors::TlsError;

/// Metadata extracted from the primary leaf certificate for logging and validation.
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

/// Loaded certificate materials used for configuring the webhook listener.
#[derive(Debug)]
pub struct CertificateBundle {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub leaf: CertificateDer<'static>,
    pub intermediates: Vec<CertificateDer<'static>>,
    pub private_key: PrivateKeyDer<'static>,
    pub info: CertificateInfo,
}

/// Load and validate certificate materials from disk.
pub fn load_certificate_bundle(
    cert_path: &Path,
    key_path: &Path,
) -> Result<CertificateBundle, TlsError> {
    let cert_bytes = fs::read(cert_path)
        .map_err(|e| TlsError::CertificateReadError { path: cert_path.to_path_buf(), source: e })?;

    let mut leaf_chain: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(&cert_bytes)
        .map(|result| {
            result.map_err(|err| TlsError::InvalidCertificatePem {
                path: cert_path.to_path_buf(),
                source: anyhow!(err),
            })
        })
        .collect::<Result<_, _>>()?;

    if leaf_chain.is_empty() {
        return Err(TlsError::EmptyCertificateChain { path: cert_path.to_path_buf() });
    }

    let leaf = leaf_chain.remove(0);
    let intermediates = leaf_chain;

    let key_bytes = fs::read(key_path)
        .map_err(|e| TlsError::PrivateKeyReadError { path: key_path.to_path_buf(), source: e })?;

    let private_key = PrivateKeyDer::from_pem_slice(&key_bytes).map_err(|err| {
        TlsError::InvalidPrivateKey { path: key_path.to_path_buf(), source: Some(anyhow!(err)) }
    })?;

    let info = parse_certificate_metadata(&leaf, cert_path)?;

    validate_certificate_dates(&info, cert_path)?;

    Ok(CertificateBundle {
        cert_path: cert_path.to_path_buf(),
        key_path: key_path.to_path_buf(),
        leaf,
        intermediates,
        private_key,
        info,
    })
}

fn parse_certificate_metadata(
    cert: &CertificateDer<'static>,
    path: &Path,
) -> Result<CertificateInfo, TlsError> {
    let (_, parsed) = X509Certificate::from_der(cert.as_ref()).map_err(|err| {
        TlsError::CertificateMetadata { path: path.to_path_buf(), source: anyhow!(err) }
    })?;

    let subject = parsed.subject().to_string();
    let issuer = parsed.issuer().to_string();

    let validity = parsed.validity();
    let not_before = asn1_time_to_chrono(&validity.not_before, path)?;
    let not_after = asn1_time_to_chrono(&validity.not_after, path)?;

    Ok(CertificateInfo { subject, issuer, not_before, not_after })
}

fn asn1_time_to_chrono(time: &ASN1Time, path: &Path) -> Result<DateTime<Utc>, TlsError> {
    Utc.timestamp_opt(time.timestamp(), 0).single().ok_or_else(|| {
        TlsError::CertificateMetadata {
            path: path.to_path_buf(),
            source: anyhow!("failed to convert certificate time"),
        }
    })
}

fn validate_certificate_dates(info: &CertificateInfo, path: &Path) -> Result<(), TlsError> {
    let now = current_time();
    if info.not_before > now {
        return Err(TlsError::CertificateNotYetValid {
            path: path.to_path_buf(),
            not_before: info.not_before,
        });
    }
    if info.not_after <= now {
        return Err(TlsError::CertificateExpired {
            path: path.to_path_buf(),
            not_after: info.not_after,
        });
    }
    Ok(())
}

fn current_time() -> DateTime<Utc> {
    #[cfg(test)]
    {
        if let Some(now) = NOW_OVERRIDE.lock().unwrap().as_ref() {
            return *now;
        }
    }
    Utc::now()
}

#[cfg(test)]
static NOW_OVERRIDE: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);

#[cfg(test)]
pub fn set_mock_time(moment: Option<DateTime<Utc>>) {
    *NOW_OVERRIDE.lock().unwrap() = moment;
}
