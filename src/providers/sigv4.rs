//! AWS Signature Version 4 for JSON 1.1 POST requests.
//!
//! Comprehend and Translate both take a single POST with an `X-Amz-Target`
//! header naming the operation, so only that shape is signed. The path is
//! normally `/` but endpoint overrides may carry their own.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-date;x-amz-target";

/// Access key pair plus region
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// Headers to attach to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Canonical URI for an already percent-encoded request path.
///
/// Services other than S3 expect each segment encoded a second time.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.replace('%', "%25")
    }
}

/// Sign a JSON 1.1 POST to `path` on `host` for `service`
pub fn sign(
    credentials: &AwsCredentials,
    service: &str,
    host: &str,
    path: &str,
    target: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n",
        CONTENT_TYPE, host, amz_date, target
    );
    let canonical_request = format!(
        "POST\n{}\n\n{}\n{}\n{}",
        canonical_uri(path),
        canonical_headers,
        SIGNED_HEADERS,
        sha256_hex(body)
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, credentials.region, service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let k_date = hmac(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac(&k_date, credentials.region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    let k_signing = hmac(&k_service, b"aws4_request");
    let signature = hex(&hmac(&k_signing, string_to_sign.as_bytes()));

    SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, scope, SIGNED_HEADERS, signature
        ),
        amz_date,
    }
}

/// Host header value for `url`, including a non-default port
pub fn host_header(url: &reqwest::Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credentials() -> AwsCredentials {
        AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn test_sha256_hex_of_empty_payload() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_signing_key_derivation_matches_aws_example() {
        // Worked example from the AWS SigV4 documentation
        let k_date = hmac(
            b"AWS4wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            b"20150830",
        );
        let k_region = hmac(&k_date, b"us-east-1");
        let k_service = hmac(&k_region, b"iam");
        let k_signing = hmac(&k_service, b"aws4_request");

        assert_eq!(
            hex(&k_signing),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_sign_produces_authorization_header() {
        let signed = sign(
            &credentials(),
            "comprehend",
            "comprehend.us-east-1.amazonaws.com",
            "/",
            "Comprehend_20171127.DetectSyntax",
            br#"{"Text":"Hello","LanguageCode":"en"}"#,
            fixed_time(),
        );

        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/comprehend/aws4_request, "
        ));
        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-target, "));

        let signature = signed
            .authorization
            .rsplit("Signature=")
            .next()
            .expect("signature");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_is_deterministic_and_body_sensitive() {
        let a = sign(&credentials(), "translate", "h", "/", "T", b"{}", fixed_time());
        let b = sign(&credentials(), "translate", "h", "/", "T", b"{}", fixed_time());
        let c = sign(&credentials(), "translate", "h", "/", "T", b"{ }", fixed_time());

        assert_eq!(a, b);
        assert_ne!(a.authorization, c.authorization);
    }

    #[test]
    fn test_sign_covers_request_path() {
        let root = sign(&credentials(), "comprehend", "h", "/", "T", b"{}", fixed_time());
        let nested = sign(
            &credentials(),
            "comprehend",
            "h",
            "/comprehend/",
            "T",
            b"{}",
            fixed_time(),
        );

        assert_ne!(root.authorization, nested.authorization);
        assert_eq!(
            root,
            sign(&credentials(), "comprehend", "h", "", "T", b"{}", fixed_time())
        );
    }

    #[test]
    fn test_canonical_uri() {
        assert_eq!(canonical_uri(""), "/");
        assert_eq!(canonical_uri("/"), "/");
        assert_eq!(canonical_uri("/comprehend/"), "/comprehend/");
        assert_eq!(canonical_uri("/a%20b"), "/a%2520b");
    }

    #[test]
    fn test_host_header() {
        let url = reqwest::Url::parse("https://translate.eu-west-1.amazonaws.com/").unwrap();
        assert_eq!(
            host_header(&url).as_deref(),
            Some("translate.eu-west-1.amazonaws.com")
        );

        let local = reqwest::Url::parse("http://127.0.0.1:4566/").unwrap();
        assert_eq!(host_header(&local).as_deref(), Some("127.0.0.1:4566"));
    }
}
