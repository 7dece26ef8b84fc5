//! Request builders for the REST resources.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::capabilities::{HttpError, HttpMethod, HttpRequest, ValidatedUrl};
use crate::config::ClientConfig;
use crate::filters::ListParams;
use crate::resources::{Editable, Resource};
use crate::DecodeError;

fn resource_url(
    config: &ClientConfig,
    path: &str,
    id: Option<u64>,
) -> Result<Url, HttpError> {
    let mut url = config.base_url.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| HttpError::InvalidUrl {
            url: config.base_url.to_string(),
            reason: "base URL cannot carry a path".to_string(),
        })?;
        segments.pop_if_empty().push(path);
        if let Some(id) = id {
            segments.push(&id.to_string());
        }
    }
    Ok(url)
}

fn finish(
    config: &ClientConfig,
    method: HttpMethod,
    url: &Url,
) -> Result<HttpRequest, HttpError> {
    let mut request = HttpRequest::new(method, ValidatedUrl::from_url(url)?)
        .with_header("Accept", "application/json")?
        .with_timeout(config.request_timeout())?;
    if let Some(token) = &config.auth_token {
        request = request.with_header(
            "Authorization",
            format!("Bearer {}", token.expose_secret()),
        )?;
    }
    Ok(request)
}

/// `GET /<resource>?page=&per_page=[&search=][&<filter>=...]`
pub fn list_request<R: Resource>(
    config: &ClientConfig,
    params: &ListParams<R::Filters>,
    page: u32,
) -> Result<HttpRequest, HttpError> {
    let mut url = resource_url(config, R::PATH, None)?;
    url.query_pairs_mut()
        .extend_pairs(params.query_pairs(page, config.page_size));
    finish(config, HttpMethod::Get, &url)
}

/// `GET /<resource>/<id>`
pub fn detail_request<R: Resource>(config: &ClientConfig, id: u64) -> Result<HttpRequest, HttpError> {
    let url = resource_url(config, R::PATH, Some(id))?;
    finish(config, HttpMethod::Get, &url)
}

/// `POST /<resource>` with the draft as JSON.
pub fn create_request<R: Editable>(
    config: &ClientConfig,
    draft: &R::Draft,
) -> Result<HttpRequest, HttpError> {
    let url = resource_url(config, R::PATH, None)?;
    finish(config, HttpMethod::Post, &url)?.with_json(draft)
}

/// `PUT /<resource>/<id>` with the draft as JSON.
pub fn update_request<R: Editable>(
    config: &ClientConfig,
    id: u64,
    draft: &R::Draft,
) -> Result<HttpRequest, HttpError> {
    let url = resource_url(config, R::PATH, Some(id))?;
    finish(config, HttpMethod::Put, &url)?.with_json(draft)
}

/// `DELETE /<resource>/<id>`
pub fn delete_request<R: Editable>(config: &ClientConfig, id: u64) -> Result<HttpRequest, HttpError> {
    let url = resource_url(config, R::PATH, Some(id))?;
    finish(config, HttpMethod::Delete, &url)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordBody<T> {
    Wrapped { data: T },
    Bare(T),
}

/// Decodes a single record, wrapped as `{ data: T }` or bare.
pub fn decode_record<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    match serde_json::from_slice::<RecordBody<T>>(body) {
        Ok(RecordBody::Wrapped { data } | RecordBody::Bare(data)) => Ok(data),
        Err(e) => Err(DecodeError::Json(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::NoFilters;
    use crate::resources::{
        Brand, Brands, ContactDraft, ContactKind, Contacts, Currency, QuoteDraft, QuoteFilters,
        QuoteStatus, Quotes,
    };

    fn config() -> ClientConfig {
        ClientConfig::new("https://erp.example.com/api/v1").unwrap()
    }

    #[test]
    fn test_list_request_omits_absent_params() {
        let request =
            list_request::<Brands>(&config(), &ListParams::<NoFilters>::default(), 1).unwrap();

        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.url().path(), "/api/v1/brands");
        assert_eq!(
            request.url().query_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("per_page".to_string(), "20".to_string())
            ]
        );
        assert_eq!(request.headers().get("Accept"), Some("application/json"));
        assert_eq!(request.headers().get("Authorization"), None);
        assert_eq!(request.timeout_ms(), 30_000);
    }

    #[test]
    fn test_list_request_carries_search_and_filters() {
        let params = ListParams {
            search: Some("TKL 12".to_string()),
            filters: QuoteFilters {
                status: Some(QuoteStatus::Accepted),
                currency: None,
            },
        };
        let request = list_request::<Quotes>(&config().with_page_size(50), &params, 3).unwrap();

        assert_eq!(request.query_param("page").as_deref(), Some("3"));
        assert_eq!(request.query_param("per_page").as_deref(), Some("50"));
        assert_eq!(request.query_param("search").as_deref(), Some("TKL 12"));
        assert_eq!(request.query_param("status").as_deref(), Some("accepted"));
        assert_eq!(request.query_param("currency"), None);
    }

    #[test]
    fn test_bearer_token_is_attached() {
        let config = config().with_auth_token("opaque");
        let request = detail_request::<Contacts>(&config, 42).unwrap();
        assert_eq!(request.url().path(), "/api/v1/contacts/42");
        assert_eq!(request.headers().get("Authorization"), Some("Bearer opaque"));
    }

    #[test]
    fn test_mutation_requests() {
        let draft = QuoteDraft {
            customer_id: Some(1),
            amount: 10.0,
            currency: Some(Currency::Usd),
            note: None,
        };
        let create = create_request::<Quotes>(&config(), &draft).unwrap();
        assert_eq!(create.method(), HttpMethod::Post);
        assert_eq!(create.url().path(), "/api/v1/quotes");
        assert!(create.body().is_some());

        let contact = ContactDraft {
            name: "Ali".into(),
            kind: Some(ContactKind::Supplier),
            ..ContactDraft::default()
        };
        let update = update_request::<Contacts>(&config(), 7, &contact).unwrap();
        assert_eq!(update.method(), HttpMethod::Put);
        assert_eq!(update.url().path(), "/api/v1/contacts/7");

        let delete = delete_request::<Quotes>(&config(), 7).unwrap();
        assert_eq!(delete.method(), HttpMethod::Delete);
        assert!(delete.body().is_none());
    }

    #[test]
    fn test_decode_record_accepts_both_shapes() {
        let wrapped: Brand = decode_record(br#"{"data": {"id": 1, "name": "Lassa"}}"#).unwrap();
        let bare: Brand = decode_record(br#"{"id": 1, "name": "Lassa"}"#).unwrap();
        assert_eq!(wrapped, bare);
        assert!(matches!(
            decode_record::<Brand>(b"[]"),
            Err(DecodeError::Json(_))
        ));
    }
}
