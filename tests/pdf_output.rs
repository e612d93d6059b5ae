mod common;

use formdoc_pdf::assets::{ColorModel, ImageAsset, ImageFormat};
use formdoc_pdf::{RenderConfig, render_submission};
use serde_json::json;

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Page objects in a serialized document, excluding the page tree node.
fn page_objects(pdf: &[u8]) -> usize {
    count(pdf, b"/Type /Page") - count(pdf, b"/Type /Pages")
}

#[test]
fn single_page_document() {
    let rec = common::record(json!({ "companyName": "Acme Ltd", "agreeToDataPrivacy": true }));
    let doc = render_submission(&rec, Some("generic-form"), &RenderConfig::default()).expect("render");
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert_eq!(doc.page_count, 1);
    assert_eq!(page_objects(&doc.bytes), 1);
    assert!(count(&doc.bytes, b"/Helvetica-Bold") >= 1);
    assert_eq!(doc.filename, "Acme-Ltd-generic-form.pdf");
}

#[test]
fn page_objects_match_page_breaks() {
    let doc = render_submission(&common::long_record(150), None, &RenderConfig::default())
        .expect("render");
    assert!(doc.page_breaks >= 2);
    assert_eq!(doc.page_count, doc.page_breaks + 1);
    assert_eq!(page_objects(&doc.bytes), doc.page_count);
}

#[test]
fn naira_amounts_render_with_builtin_fonts() {
    let rec = common::record(json!({
        "lossAmount": "\u{20A6}1,250,000",
        "moneyLocation": "In transit"
    }));
    let doc = render_submission(&rec, None, &RenderConfig::default()).expect("render");
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert!(doc.page_count >= 1);
}

#[test]
fn logo_is_embedded_as_an_image() {
    let dir = std::env::temp_dir().join(format!("formdoc-pdf-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("logo.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([139, 69, 19, 200]))
        .save(&path)
        .unwrap();
    let config = RenderConfig {
        logo_path: Some(path),
        ..RenderConfig::default()
    };
    let rec = common::record(json!({ "companyName": "Acme Ltd" }));
    let doc = render_submission(&rec, None, &config).expect("render");
    assert_eq!(count(&doc.bytes, b"/Subtype /Image"), 2);
    assert_eq!(count(&doc.bytes, b"/SMask"), 1);
}

fn jpeg_logo(name: &str, gray: bool) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("formdoc-jpeg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    if gray {
        image::GrayImage::from_pixel(16, 8, image::Luma([90])).save(&path).unwrap();
    } else {
        image::RgbImage::from_pixel(16, 8, image::Rgb([139, 69, 19])).save(&path).unwrap();
    }
    path
}

#[test]
fn jpeg_logos_keep_their_color_space() {
    let rec = common::record(json!({ "companyName": "Acme Ltd" }));
    for (name, gray, space) in [
        ("gray.jpg", true, &b"/DeviceGray"[..]),
        ("rgb.jpg", false, &b"/DeviceRGB"[..]),
    ] {
        let path = jpeg_logo(name, gray);
        let asset = ImageAsset::load(&path).expect("jpeg");
        assert_eq!(asset.format, ImageFormat::Jpeg);
        assert_eq!(asset.color, if gray { ColorModel::Gray } else { ColorModel::Rgb });
        assert_eq!((asset.pixel_width, asset.pixel_height), (16, 8));

        let config = RenderConfig {
            logo_path: Some(path),
            ..RenderConfig::default()
        };
        let doc = render_submission(&rec, None, &config).expect("render");
        assert_eq!(count(&doc.bytes, b"/DCTDecode"), 1, "{name}");
        assert_eq!(count(&doc.bytes, space), 1, "{name}");
        assert_eq!(count(&doc.bytes, b"/SMask"), 0, "{name}");
    }
}

#[test]
fn json_file_to_pdf_file() {
    let dir = std::env::temp_dir().join(format!("formdoc-convert-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("submission.json");
    let output = dir.join("out.pdf");
    std::fs::write(
        &input,
        json!({ "formType": "motor-claims", "nameCompany": "Ngozi Eze" }).to_string(),
    )
    .unwrap();
    let written = formdoc_pdf::convert_json_to_pdf(&input, Some(&output), None, &RenderConfig::default())
        .expect("convert");
    assert_eq!(written, output);
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    std::fs::write(&input, "[1, 2, 3]").unwrap();
    let err = formdoc_pdf::convert_json_to_pdf(&input, Some(&output), None, &RenderConfig::default());
    assert!(matches!(err, Err(formdoc_pdf::Error::Record(_))));
    std::fs::write(&input, "{ not json").unwrap();
    let err = formdoc_pdf::convert_json_to_pdf(&input, Some(&output), None, &RenderConfig::default());
    assert!(matches!(err, Err(formdoc_pdf::Error::Json(_))));
}
