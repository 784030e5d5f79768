use super::*;

use image::{ImageFormat, Rgb, RgbImage};
use shared::error::ErrorCode;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn draft() -> ReportDraft {
    ReportDraft {
        title: "  Jaket Hitam ".into(),
        description: "".into(),
        location: "Depan Ruang Rapat".into(),
        date: "2025-09-19".into(),
        contact: " 0812-1111 ".into(),
        image: None,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 21).expect("date")
}

fn decoded_width(data_url: &str) -> u32 {
    let payload = data_url
        .strip_prefix("data:image/jpeg;base64,")
        .expect("jpeg data url");
    let bytes = STANDARD.decode(payload).expect("base64");
    image::load_from_memory(&bytes).expect("jpeg").width()
}

#[test]
fn prepare_report_trims_and_drops_empty_optionals() {
    let entry = prepare_report(draft(), &IntakeLimits::default(), ReportId::from("rep-9"), today())
        .expect("valid");

    assert_eq!(entry.id, ReportId::from("rep-9"));
    assert_eq!(entry.title, "Jaket Hitam");
    assert_eq!(entry.contact.as_deref(), Some("0812-1111"));
    assert_eq!(entry.description, None);
    assert_eq!(entry.image, None);
}

#[test]
fn missing_required_fields_are_rejected() {
    for broken in [
        ReportDraft {
            title: " ".into(),
            ..draft()
        },
        ReportDraft {
            location: "".into(),
            ..draft()
        },
        ReportDraft {
            date: "".into(),
            ..draft()
        },
    ] {
        let err = validate_draft(&broken).expect_err("missing field");
        assert_eq!(err.code, ErrorCode::Validation);
    }
}

#[test]
fn short_title_or_location_is_rejected() {
    let err = validate_draft(&ReportDraft {
        title: "HP".into(),
        ..draft()
    })
    .expect_err("short title");
    assert!(err.message.contains("title"));

    let err = validate_draft(&ReportDraft {
        location: "A1".into(),
        ..draft()
    })
    .expect_err("short location");
    assert!(err.message.contains("location"));
}

#[test]
fn malformed_date_is_rejected() {
    let err = validate_draft(&ReportDraft {
        date: "19/09/2025".into(),
        ..draft()
    })
    .expect_err("bad date");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn non_image_upload_is_rejected() {
    let upload = ImageUpload {
        bytes: b"%PDF-1.7".to_vec(),
        mime_type: "application/pdf".into(),
    };
    let err = validate_image(&upload, &IntakeLimits::default()).expect_err("pdf");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn oversized_upload_is_rejected_before_decoding() {
    let limits = IntakeLimits {
        max_image_bytes: 16,
        ..IntakeLimits::default()
    };
    let upload = ImageUpload {
        bytes: png(8, 8),
        mime_type: "image/png".into(),
    };
    let err = prepare_report(
        ReportDraft {
            image: Some(upload),
            ..draft()
        },
        &limits,
        ReportId::from("rep-1"),
        today(),
    )
    .expect_err("too large");
    assert!(err.message.contains("limit"));
}

#[test]
fn undecodable_image_is_rejected() {
    let upload = ImageUpload {
        bytes: b"definitely not a png".to_vec(),
        mime_type: "image/png".into(),
    };
    let err = embed_image(&upload, &IntakeLimits::default()).expect_err("garbage");
    assert!(err.message.contains("unreadable"));
}

#[test]
fn wide_image_is_downscaled_to_limit() {
    let limits = IntakeLimits {
        max_image_width: 64,
        ..IntakeLimits::default()
    };
    let upload = ImageUpload {
        bytes: png(256, 128),
        mime_type: "image/png".into(),
    };

    let data_url = embed_image(&upload, &limits).expect("embedded");
    assert_eq!(decoded_width(&data_url), 64);
}

#[test]
fn narrow_image_keeps_its_width() {
    let upload = ImageUpload {
        bytes: png(40, 30),
        mime_type: "image/png".into(),
    };
    let entry = prepare_report(
        ReportDraft {
            image: Some(upload),
            ..draft()
        },
        &IntakeLimits::default(),
        ReportId::from("rep-1"),
        today(),
    )
    .expect("valid");

    assert_eq!(decoded_width(entry.image.as_deref().expect("image")), 40);
}
