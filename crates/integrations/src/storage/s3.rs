//! S3-compatible object storage (MinIO, AWS S3) over plain HTTP.
//!
//! Requests use path-style addressing (`{endpoint}/{bucket}/{key}`) and are
//! signed with AWS Signature Version 4.

use async_trait::async_trait;
use campaign_core::config::StorageConfig;
use campaign_core::services::AssetStorage;
use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

fn storage_error(context: &str, err: impl std::fmt::Display) -> CampaignError {
    CampaignError::Storage(format!("{context}: {err}"))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Percent-encode per the SigV4 rules. `/` is kept when `encode_slash` is false.
pub(crate) fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k, true), uri_encode(v, true)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Derive the SigV4 signing key for a date (`YYYYMMDD`), region and service.
pub(crate) fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// SigV4 credentials for one endpoint/region.
#[derive(Debug, Clone)]
pub(crate) struct SigV4Signer {
    access_key: String,
    secret_key: String,
    region: String,
}

impl SigV4Signer {
    pub(crate) fn new(access_key: &str, secret_key: &str, region: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
        }
    }

    pub(crate) fn canonical_request(
        method: &str,
        canonical_uri: &str,
        query: &str,
        host: &str,
        payload_hash: &str,
        amz_date: &str,
    ) -> String {
        format!(
            "{method}\n{canonical_uri}\n{query}\nhost:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}"
        )
    }

    /// Returns the `x-amz-date` value and the `Authorization` header.
    pub(crate) fn authorize(
        &self,
        method: &str,
        canonical_uri: &str,
        query: &str,
        host: &str,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> (String, String) {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/s3/aws4_request", self.region);

        let canonical =
            Self::canonical_request(method, canonical_uri, query, host, payload_hash, &amz_date);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical.as_bytes())
        );
        let key = signing_key(&self.secret_key, &date, &self.region, "s3");
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.access_key
        );
        (amz_date, authorization)
    }
}

/// One page of a ListObjectsV2 response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListBucketResult {
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_continuation_token: Option<String>,
    #[serde(default)]
    pub contents: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListedObject {
    pub key: String,
}

pub(crate) fn parse_list_response(xml: &str) -> CampaignResult<ListBucketResult> {
    quick_xml::de::from_str(xml).map_err(|e| storage_error("malformed list response", e))
}

/// S3-compatible storage adapter. `save` returns `s3://{bucket}/{path}`.
pub struct S3Storage {
    client: reqwest::Client,
    endpoint: Url,
    bucket: String,
    signer: SigV4Signer,
}

impl S3Storage {
    /// Build the client and create the bucket when it does not exist yet.
    pub async fn connect(config: &StorageConfig) -> CampaignResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| CampaignError::Config(format!("invalid storage.endpoint: {e}")))?;
        let storage = Self {
            client: reqwest::Client::new(),
            endpoint,
            bucket: config.bucket.clone(),
            signer: SigV4Signer::new(&config.access_key, &config.secret_key, &config.region),
        };

        info!(endpoint = %config.endpoint, bucket = %config.bucket, "Connecting to S3-compatible storage");
        storage.ensure_bucket().await?;
        Ok(storage)
    }

    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Strip an `s3://{bucket}/` prefix so stored locations can be passed back in.
    fn object_key<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix("s3://")
            .and_then(|rest| rest.strip_prefix(self.bucket.as_str()))
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    }

    async fn request(
        &self,
        method: Method,
        key: Option<&str>,
        query: &[(&str, &str)],
        body: Vec<u8>,
    ) -> CampaignResult<reqwest::Response> {
        let canonical_uri = match key {
            Some(key) => format!("/{}/{}", uri_encode(&self.bucket, true), uri_encode(key, false)),
            None => format!("/{}", uri_encode(&self.bucket, true)),
        };
        let query_string = canonical_query(query);
        let payload_hash = sha256_hex(&body);
        let (amz_date, authorization) = self.signer.authorize(
            method.as_str(),
            &canonical_uri,
            &query_string,
            &self.host(),
            &payload_hash,
            Utc::now(),
        );

        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = format!("{base}{canonical_uri}");
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        debug!(%method, %url, bytes = body.len(), "S3 request");
        let mut request = self
            .client
            .request(method, &url)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("authorization", authorization);
        if !body.is_empty() {
            request = request.header("content-type", "image/png").body(body);
        }

        request
            .send()
            .await
            .map_err(|e| storage_error("S3 request failed", e))
    }

    async fn ensure_bucket(&self) -> CampaignResult<()> {
        let response = self.request(Method::HEAD, None, &[], Vec::new()).await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                info!(bucket = %self.bucket, "Creating bucket");
                let response = self.request(Method::PUT, None, &[], Vec::new()).await?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(storage_error("bucket creation failed", response.status()))
                }
            }
            other => Err(storage_error("bucket check failed", other)),
        }
    }
}

#[async_trait]
impl AssetStorage for S3Storage {
    async fn save(&self, path: &str, content: &[u8]) -> CampaignResult<String> {
        let key = self.object_key(path);
        let response = self
            .request(Method::PUT, Some(key), &[], content.to_vec())
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(storage_error("put object failed", format!("{status}: {body}")));
        }
        Ok(format!("s3://{}/{}", self.bucket, key))
    }

    async fn load(&self, path: &str) -> CampaignResult<Vec<u8>> {
        let key = self.object_key(path);
        let response = self.request(Method::GET, Some(key), &[], Vec::new()).await?;
        match response.status() {
            s if s.is_success() => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| storage_error("reading object body failed", e)),
            StatusCode::NOT_FOUND => Err(CampaignError::NotFound(path.to_string())),
            other => Err(storage_error("get object failed", other)),
        }
    }

    async fn exists(&self, path: &str) -> CampaignResult<bool> {
        let key = self.object_key(path);
        let response = self.request(Method::HEAD, Some(key), &[], Vec::new()).await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(storage_error("head object failed", other)),
        }
    }

    async fn list(&self, prefix: &str) -> CampaignResult<Vec<String>> {
        let prefix = self.object_key(prefix);
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut query = vec![("list-type", "2"), ("prefix", prefix)];
            if let Some(token) = continuation.as_deref() {
                query.push(("continuation-token", token));
            }
            let response = self.request(Method::GET, None, &query, Vec::new()).await?;
            if !response.status().is_success() {
                return Err(storage_error("list objects failed", response.status()));
            }
            let xml = response
                .text()
                .await
                .map_err(|e| storage_error("reading list response failed", e))?;
            let page = parse_list_response(&xml)?;

            keys.extend(page.contents.into_iter().map(|object| object.key));
            continuation = page.next_continuation_token;
            if !page.is_truncated || continuation.is_none() {
                break;
            }
        }

        Ok(keys)
    }

    fn name(&self) -> &str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("lavender-soap/en-US/1x1/a.png", false), "lavender-soap/en-US/1x1/a.png");
        assert_eq!(uri_encode("a b/c", false), "a%20b/c");
        assert_eq!(uri_encode("a b/c", true), "a%20b%2Fc");
        assert_eq!(uri_encode("1:1", true), "1%3A1");
    }

    #[test]
    fn test_canonical_query_is_sorted() {
        assert_eq!(
            canonical_query(&[("prefix", "lavender soap/"), ("list-type", "2")]),
            "list-type=2&prefix=lavender%20soap%2F"
        );
        assert_eq!(canonical_query(&[]), "");
    }

    #[test]
    fn test_signing_key_matches_aws_reference() {
        // Reference vector from the AWS SigV4 documentation.
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let signer = SigV4Signer::new("minio", "minio123", "us-east-1");
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let (amz_date, auth) = signer.authorize(
            "PUT",
            "/assets/lavender-soap/en-US/1x1/abc.png",
            "",
            "localhost:9000",
            &sha256_hex(b"png"),
            now,
        );
        assert_eq!(amz_date, "20250102T030405Z");
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=minio/20250102/us-east-1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));
        let signature = auth.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);

        // Same inputs, same signature.
        let (_, again) = signer.authorize(
            "PUT",
            "/assets/lavender-soap/en-US/1x1/abc.png",
            "",
            "localhost:9000",
            &sha256_hex(b"png"),
            now,
        );
        assert_eq!(auth, again);
    }

    #[test]
    fn test_canonical_request_layout() {
        let canonical = SigV4Signer::canonical_request(
            "GET",
            "/assets",
            "list-type=2&prefix=",
            "localhost:9000",
            "abc",
            "20250102T030405Z",
        );
        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "GET");
        assert_eq!(lines[1], "/assets");
        assert_eq!(lines[2], "list-type=2&prefix=");
        assert_eq!(lines[3], "host:localhost:9000");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], SIGNED_HEADERS);
        assert_eq!(lines[8], "abc");
    }

    #[test]
    fn test_list_response_parsing() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>assets</Name>
  <Prefix></Prefix>
  <KeyCount>3</KeyCount>
  <IsTruncated>false</IsTruncated>
  <Contents><Key>lavender-soap/en-US/1x1/a.png</Key><Size>3</Size></Contents>
  <Contents><Key>soap &amp; gel/en-US/1x1/b.png</Key><Size>3</Size></Contents>
  <Contents><Key>caf&#233;/en-US/1x1/c.png</Key><Size>3</Size></Contents>
</ListBucketResult>"#;
        let page = parse_list_response(xml).unwrap();
        let keys: Vec<&str> = page.contents.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "lavender-soap/en-US/1x1/a.png",
                "soap & gel/en-US/1x1/b.png",
                "caf\u{e9}/en-US/1x1/c.png",
            ]
        );
        assert!(!page.is_truncated);
        assert!(page.next_continuation_token.is_none());
    }

    #[test]
    fn test_truncated_list_page_and_cdata() {
        let xml = r#"<ListBucketResult>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=</NextContinuationToken>
  <Contents><Key><![CDATA[soap <deluxe>/en-US/1x1/d.png]]></Key></Contents>
</ListBucketResult>"#;
        let page = parse_list_response(xml).unwrap();
        assert!(page.is_truncated);
        assert_eq!(
            page.next_continuation_token.as_deref(),
            Some("1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=")
        );
        assert_eq!(page.contents[0].key, "soap <deluxe>/en-US/1x1/d.png");
    }

    #[test]
    fn test_empty_bucket_listing() {
        let page = parse_list_response(
            "<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>",
        )
        .unwrap();
        assert!(page.contents.is_empty());
        let malformed = "<ListBucketResult><IsTruncated>maybe</IsTruncated></ListBucketResult>";
        assert!(matches!(
            parse_list_response(malformed),
            Err(CampaignError::Storage(_))
        ));
    }
}
