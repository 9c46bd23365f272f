use std::str::FromStr;

use actix_multipart::Multipart;
use bigdecimal::{BigDecimal, Signed};
use common::{
    env_config::UploadLimits,
    error::{AppError, Res},
};
use db::{dtos::listing::ListingDraft, models::listing::ListingPurpose};
use futures::StreamExt;
use uuid::Uuid;

pub const MAIN_PHOTO_FIELD: &str = "main_photo";
pub const GALLERY_FIELD: &str = "gallery";
/// Largest accepted text field.
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

/// A file part of the listing form, fully buffered.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ListingForm {
    pub draft: ListingDraft,
    pub main_photo: Option<Upload>,
    pub gallery: Vec<Upload>,
}

/// Reads the multipart listing form: text fields into the draft, `main_photo`
/// and repeated `gallery` parts into uploads.
///
/// Parts are checked against `limits` while they stream in; an oversized part
/// or one image too many aborts the read before more is buffered.
pub async fn read_form(mut payload: Multipart, limits: &UploadLimits) -> Res<ListingForm> {
    let mut form = ListingForm::default();
    let mut files_seen = 0usize;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Malformed form data: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let is_file = name == MAIN_PHOTO_FIELD || name == GALLERY_FIELD;
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let max_bytes = if is_file {
            limits.max_file_bytes
        } else {
            MAX_TEXT_BYTES
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data =
                chunk.map_err(|e| AppError::BadRequest(format!("Malformed form data: {}", e)))?;
            if bytes.len() + data.len() > max_bytes {
                let what = filename.as_deref().unwrap_or(name.as_str());
                return Err(AppError::BadRequest(format!(
                    "{} is larger than the {} byte limit",
                    what, max_bytes
                )));
            }
            bytes.extend_from_slice(&data);
        }

        if is_file {
            // untouched file inputs arrive as empty parts
            let Some(filename) = filename.filter(|f| !f.is_empty()) else {
                continue;
            };
            if bytes.is_empty() {
                continue;
            }
            files_seen += 1;
            if files_seen > limits.max_files {
                return Err(AppError::BadRequest(format!(
                    "At most {} images can be sent at once",
                    limits.max_files
                )));
            }
            let upload = Upload {
                filename,
                content_type,
                bytes,
            };
            if name == MAIN_PHOTO_FIELD {
                form.main_photo = Some(upload);
            } else {
                form.gallery.push(upload);
            }
            continue;
        }

        let value = String::from_utf8(bytes)
            .map_err(|_| AppError::BadRequest(format!("Field {} is not valid text", name)))?;
        apply_field(&mut form.draft, &name, &value)?;
    }

    Ok(form)
}

/// Writes one text field into the draft. Blank values clear the field.
pub fn apply_field(draft: &mut ListingDraft, name: &str, value: &str) -> Res<()> {
    let value = value.trim();
    let text = || (!value.is_empty()).then(|| value.to_string());

    match name {
        "title" => draft.title = text(),
        "description" => draft.description = text(),
        "address" => draft.address = text(),
        "contact_phone" => draft.contact_phone = text(),
        "city_id" => draft.city_id = parse_optional(name, value)?,
        "neighborhood_id" => draft.neighborhood_id = parse_optional(name, value)?,
        "agency_id" => draft.agency_id = parse_agency(value)?,
        "purpose" => draft.purpose = parse_purpose(value)?,
        "price" => draft.price = parse_price(value)?,
        "bedrooms" => draft.bedrooms = parse_count(name, value)?,
        "suites" => draft.suites = parse_count(name, value)?,
        "bathrooms" => draft.bathrooms = parse_count(name, value)?,
        "living_rooms" => draft.living_rooms = parse_count(name, value)?,
        "kitchens" => draft.kitchens = parse_count(name, value)?,
        "closets" => draft.closets = parse_count(name, value)?,
        "area" => draft.area = parse_count(name, value)?,
        other => log::debug!("Ignoring unknown listing field {}", other),
    }
    Ok(())
}

fn parse_optional(name: &str, value: &str) -> Res<Option<i32>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{} must be a number", name)))
}

fn parse_count(name: &str, value: &str) -> Res<i32> {
    match parse_optional(name, value)? {
        None => Ok(0),
        Some(n) if n < 0 => Err(AppError::BadRequest(format!("{} cannot be negative", name))),
        Some(n) => Ok(n),
    }
}

fn parse_agency(value: &str) -> Res<Option<Uuid>> {
    if value.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("agency_id is not a valid id: {}", value)))
}

fn parse_purpose(value: &str) -> Res<Option<ListingPurpose>> {
    match value.to_uppercase().as_str() {
        "" => Ok(None),
        "SALE" => Ok(Some(ListingPurpose::Sale)),
        "RENT" => Ok(Some(ListingPurpose::Rent)),
        _ => Err(AppError::BadRequest(format!(
            "purpose must be SALE or RENT, got {}",
            value
        ))),
    }
}

/// Accepts `1234.50` as well as the local `1.234,50`.
fn parse_price(value: &str) -> Res<Option<BigDecimal>> {
    if value.is_empty() {
        return Ok(None);
    }
    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };
    let price = BigDecimal::from_str(&normalized)
        .map_err(|_| AppError::BadRequest(format!("price is not a valid amount: {}", value)))?;
    if price.is_negative() {
        return Err(AppError::BadRequest("price cannot be negative".to_string()));
    }
    Ok(Some(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_are_trimmed_and_blank_clears() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "title", "  Casa com quintal ").unwrap();
        assert_eq!(draft.title.as_deref(), Some("Casa com quintal"));

        apply_field(&mut draft, "title", "   ").unwrap();
        assert_eq!(draft.title, None);
    }

    #[test]
    fn counts_default_to_zero_and_reject_negatives() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "bedrooms", "3").unwrap();
        apply_field(&mut draft, "suites", "").unwrap();
        assert_eq!(draft.bedrooms, 3);
        assert_eq!(draft.suites, 0);

        assert!(apply_field(&mut draft, "area", "-10").is_err());
        assert!(apply_field(&mut draft, "kitchens", "two").is_err());
    }

    #[test]
    fn purpose_is_case_insensitive() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "purpose", "rent").unwrap();
        assert_eq!(draft.purpose, Some(ListingPurpose::Rent));
        assert!(apply_field(&mut draft, "purpose", "swap").is_err());
    }

    #[test]
    fn price_accepts_both_decimal_styles() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "price", "350000.50").unwrap();
        assert_eq!(draft.price, Some(BigDecimal::from_str("350000.50").unwrap()));

        apply_field(&mut draft, "price", "1.250.000,00").unwrap();
        assert_eq!(draft.price, Some(BigDecimal::from_str("1250000.00").unwrap()));

        assert!(apply_field(&mut draft, "price", "-1").is_err());
        assert!(apply_field(&mut draft, "price", "cheap").is_err());
    }

    #[test]
    fn location_ids_are_optional_numbers() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "city_id", "7").unwrap();
        apply_field(&mut draft, "neighborhood_id", "").unwrap();
        assert_eq!(draft.city_id, Some(7));
        assert_eq!(draft.neighborhood_id, None);
    }

    #[test]
    fn agency_is_an_optional_id() {
        let mut draft = ListingDraft::default();
        let agency = Uuid::new_v4();
        apply_field(&mut draft, "agency_id", &agency.to_string()).unwrap();
        assert_eq!(draft.agency_id, Some(agency));

        apply_field(&mut draft, "agency_id", " ").unwrap();
        assert_eq!(draft.agency_id, None);

        assert!(apply_field(&mut draft, "agency_id", "42").is_err());
    }

    fn multipart(body: String) -> Multipart {
        use actix_web::{
            error::PayloadError,
            http::header::{CONTENT_TYPE, HeaderMap, HeaderValue},
            web::Bytes,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=X"),
        );
        let stream = futures::stream::once(async move { Ok::<_, PayloadError>(Bytes::from(body)) });
        Multipart::new(&headers, stream)
    }

    fn file_part(field: &str, filename: &str, content: &str) -> String {
        format!(
            "--X\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n{}\r\n",
            field, filename, content
        )
    }

    #[actix_web::test]
    async fn reads_text_and_file_parts() {
        let body = concat!(
            "--X\r\n",
            "Content-Disposition: form-data; name=\"title\"\r\n\r\n",
            "Casa\r\n",
            "--X\r\n",
            "Content-Disposition: form-data; name=\"gallery\"; filename=\"a.jpg\"\r\n",
            "Content-Type: image/jpeg\r\n\r\n",
            "abc\r\n",
            "--X\r\n",
            "Content-Disposition: form-data; name=\"main_photo\"; filename=\"\"\r\n",
            "Content-Type: application/octet-stream\r\n\r\n",
            "\r\n",
            "--X--\r\n",
        );
        let form = read_form(multipart(body.to_string()), &UploadLimits::default())
            .await
            .unwrap();
        assert_eq!(form.draft.title.as_deref(), Some("Casa"));
        assert!(form.main_photo.is_none());
        assert_eq!(form.gallery.len(), 1);
        assert_eq!(form.gallery[0].filename, "a.jpg");
        assert_eq!(form.gallery[0].content_type, "image/jpeg");
        assert_eq!(form.gallery[0].bytes, b"abc");
    }

    #[actix_web::test]
    async fn oversized_image_is_refused() {
        let limits = UploadLimits {
            max_file_bytes: 8,
            max_files: 5,
        };
        let body = file_part("gallery", "big.jpg", "0123456789") + "--X--\r\n";

        let err = read_form(multipart(body), &limits).await.unwrap_err();
        assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("big.jpg")));
    }

    #[actix_web::test]
    async fn oversized_text_field_is_refused() {
        let body = format!(
            "--X\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{}\r\n--X--\r\n",
            "a".repeat(MAX_TEXT_BYTES + 1)
        );
        let err = read_form(multipart(body), &UploadLimits::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn too_many_images_are_refused() {
        let limits = UploadLimits {
            max_file_bytes: 1024,
            max_files: 2,
        };
        let body = file_part("main_photo", "a.jpg", "abc")
            + &file_part("gallery", "b.jpg", "abc")
            + &file_part("gallery", "c.jpg", "abc")
            + "--X--\r\n";

        let err = read_form(multipart(body), &limits).await.unwrap_err();
        assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("At most 2")));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut draft = ListingDraft::default();
        apply_field(&mut draft, "csrfmiddlewaretoken", "abc").unwrap();
        assert_eq!(draft, ListingDraft::default());
    }
}
