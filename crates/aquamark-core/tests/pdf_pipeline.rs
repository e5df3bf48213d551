mod common;

use aquamark_core::container::pdf::{assemble, PdfImageMode};
use aquamark_core::container::{Container, ContainerCodec, ContainerKind};
use aquamark_core::media::CoverImage;
use aquamark_core::payload::PayloadVerdict;
use aquamark_core::pipeline::RunConfig;
use aquamark_core::{api, WatermarkError};
use lopdf::dictionary;

use common::textured_image;

fn pdf_with_two_covers() -> Vec<u8> {
    let covers = vec![
        CoverImage::new(textured_image(250, 200, 1), "page1", 0),
        CoverImage::new(textured_image(200, 250, 2), "page2", 1),
    ];
    assemble(&covers, 300).unwrap()
}

fn real_image_config() -> RunConfig {
    RunConfig::new("pdf-test")
}

fn page_render_config() -> RunConfig {
    let mut config = RunConfig::new("pdf-render-test");
    config.pdf_mode = PdfImageMode::PageRender;
    config
}

#[test]
fn should_embed_and_recover_from_real_images() {
    let pdf = pdf_with_two_covers();
    let mark = api::generate::prepare()
        .with_text("hello")
        .with_integrity(true)
        .execute()
        .unwrap();

    let outcome = api::embed::prepare()
        .with_container(pdf, ContainerKind::Pdf)
        .with_mark(mark)
        .with_config(real_image_config())
        .execute()
        .unwrap();
    assert_eq!(outcome.processed, 2);

    let recovered = api::extract::prepare()
        .with_container(outcome.container, ContainerKind::Pdf)
        .with_config(real_image_config())
        .execute()
        .unwrap();
    assert_eq!(recovered.len(), 2);

    for mark in recovered {
        assert_eq!(mark.texts.len(), 1);
        match api::verify::verify_integrity(&mark.texts[0]) {
            PayloadVerdict::Envelope(record) => {
                assert!(record.data_valid, "payload corrupted in {}", mark.identity)
            }
            other => panic!("Expected an envelope verdict, got {other:?}"),
        }
    }
}

#[test]
fn should_embed_through_page_render_fallback() {
    let pdf = pdf_with_two_covers();
    let mark = api::generate::prepare()
        .with_text("render-path")
        .with_integrity(false)
        .execute()
        .unwrap();

    let outcome = api::embed::prepare()
        .with_container(pdf, ContainerKind::Pdf)
        .with_mark(mark)
        .with_config(page_render_config())
        .execute()
        .unwrap();
    assert_eq!(outcome.processed, 2, "both page renders should take the mark");

    // the reconstructed document's image objects are the marked page
    // canvases, so real-image extraction recovers them losslessly
    let recovered = api::extract::prepare()
        .with_container(outcome.container, ContainerKind::Pdf)
        .with_config(real_image_config())
        .execute()
        .unwrap();

    assert_eq!(recovered.len(), 2);
    assert_eq!(recovered[0].texts, vec!["render-path".to_string()]);
}

#[test]
fn should_deduplicate_images_reused_across_pages() {
    // 2 distinct image streams referenced from 5 pages
    let first = image_stream(&textured_image(30, 30, 3));
    let second = image_stream(&textured_image(30, 30, 4));

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let first_id = doc.add_object(first);
    let second_id = doc.add_object(second);

    let mut kids: Vec<lopdf::Object> = Vec::new();
    for page in 0..5u8 {
        let image_id = if page % 2 == 0 { first_id } else { second_id };
        let content = lopdf::content::Content {
            operations: vec![
                lopdf::content::Operation::new("q", vec![]),
                lopdf::content::Operation::new(
                    "cm",
                    vec![
                        lopdf::Object::Integer(30),
                        lopdf::Object::Integer(0),
                        lopdf::Object::Integer(0),
                        lopdf::Object::Integer(30),
                        lopdf::Object::Integer(0),
                        lopdf::Object::Integer(0),
                    ],
                ),
                lopdf::content::Operation::new("Do", vec![lopdf::Object::Name(b"Im0".to_vec())]),
                lopdf::content::Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(lopdf::Stream::new(
            lopdf::dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(30),
                lopdf::Object::Integer(30),
            ],
            "Resources" => lopdf::dictionary! {
                "XObject" => lopdf::dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 5i64,
        }),
    );
    let catalog_id = doc.add_object(lopdf::dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut pdf = Vec::new();
    doc.save_to(&mut pdf).unwrap();

    let container =
        Container::from_bytes(pdf, ContainerKind::Pdf, &real_image_config()).unwrap();
    let covers = container.extract_images().unwrap();

    assert_eq!(covers.len(), 2, "reused streams must extract exactly once");
    assert_eq!(covers[0].identity, "page1/Im0");
    assert_eq!(covers[1].identity, "page2/Im0");
}

#[test]
fn should_fail_extraction_when_no_page_has_images() {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(lopdf::Stream::new(lopdf::dictionary! {}, Vec::new()));
    let page_id = doc.add_object(lopdf::dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            lopdf::Object::Integer(0),
            lopdf::Object::Integer(0),
            lopdf::Object::Integer(612),
            lopdf::Object::Integer(792),
        ],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(lopdf::dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut pdf = Vec::new();
    doc.save_to(&mut pdf).unwrap();

    let container =
        Container::from_bytes(pdf, ContainerKind::Pdf, &real_image_config()).unwrap();
    match container.extract_images() {
        Err(WatermarkError::NoImagesFound) => (),
        other => panic!("Expected NoImagesFound, got {:?}", other.map(|c| c.len())),
    }
}

/// A raw, uncompressed DeviceRGB image stream.
fn image_stream(pixels: &image::RgbImage) -> lopdf::Stream {
    lopdf::Stream::new(
        lopdf::dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(pixels.width()),
            "Height" => i64::from(pixels.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        pixels.as_raw().clone(),
    )
}
