// End-to-end loading through the local resolver: real files, data URIs, failures
use std::io::Cursor;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use gallery_viewer::app::{GalleryApp, SelectionOutcome};
use gallery_viewer::image_loader::{
    BoundedImageLoader, ImageLocator, LoaderConfig, ProbedDimensions, TargetSize,
};
use gallery_viewer::picker::LinePicker;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    // 纯色图编码快，尺寸才是测试关注点
    let img = ImageBuffer::from_pixel(width, height, Rgb([40u8, 120, 200]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn write_fixture(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gallery-viewer-it-{}-{}", std::process::id(), name));
    std::fs::write(&path, bytes).expect("write fixture failed");
    path
}

fn loader(width: u32, height: u32) -> BoundedImageLoader {
    BoundedImageLoader::new(LoaderConfig::with_target(
        TargetSize::new(width, height).expect("valid target"),
    ))
}

#[test]
fn large_photo_is_probed_and_decoded_at_factor_four() {
    let path = write_fixture("photo.png", &encode(4000, 3000, ImageFormat::Png));
    let loader = loader(400, 400);
    let locator = ImageLocator::new(path.display().to_string());

    let probed = loader.probe_dimensions(&locator).expect("probe should succeed");
    let image = loader.load(&locator);
    let _ = std::fs::remove_file(&path);

    assert_eq!(probed, ProbedDimensions::new(4000, 3000));
    let image = image.expect("decode should succeed");
    assert_eq!(image.factor().get(), 4);
    assert_eq!((image.width(), image.height()), (1000, 750));
    assert!(image.width() <= 800 && image.height() <= 800);
}

#[test]
fn photo_over_pixel_limit_loads_once_reduced() {
    // 3000x2000 = 600 万像素，上限 100 万；倍率 4 后 750x500 在上限内
    let mut config = LoaderConfig::with_target(TargetSize::new(400, 400).expect("valid target"));
    config.max_decoded_pixels = 1_000_000;
    let loader = BoundedImageLoader::new(config);

    for (name, format) in [("huge.png", ImageFormat::Png), ("huge.jpg", ImageFormat::Jpeg)] {
        let path = write_fixture(name, &encode(3000, 2000, format));
        let image = loader.load(&ImageLocator::new(path.display().to_string()));
        let _ = std::fs::remove_file(&path);

        let image = image.expect("large photo should still load");
        assert_eq!(image.natural(), ProbedDimensions::new(3000, 2000));
        assert_eq!(image.factor().get(), 4);
        assert_eq!((image.width(), image.height()), (750, 500));
    }
}

#[test]
fn jpeg_file_scheme_locator_loads() {
    let path = write_fixture("photo.jpg", &encode(1280, 960, ImageFormat::Jpeg));
    let locator = ImageLocator::new(format!("file://{}", path.display()));

    let image = loader(320, 240).load(&locator);
    let _ = std::fs::remove_file(&path);

    // half = 640/480：1 → 2 → 4（160/120 停止）
    let image = image.expect("decode should succeed");
    assert_eq!(image.factor().get(), 4);
    assert_eq!((image.width(), image.height()), (320, 240));
}

#[test]
fn data_uri_locator_loads_without_touching_disk() {
    let encoded = general_purpose::STANDARD.encode(encode(64, 48, ImageFormat::Png));
    let locator = ImageLocator::new(format!("data:image/png;base64,{}", encoded));

    let image = loader(400, 400).load(&locator).expect("decode should succeed");

    assert_eq!(image.factor().get(), 1);
    assert_eq!((image.width(), image.height()), (64, 48));
}

#[test]
fn missing_file_probes_unknown_and_yields_no_image() {
    let loader = loader(400, 400);
    let locator = ImageLocator::new("/definitely/not/here/photo.png");

    assert!(loader.probe_dimensions(&locator).is_err());
    assert!(loader.load(&locator).is_none());
}

#[test]
fn non_image_file_yields_no_image() {
    let path = write_fixture("notes.txt", b"just some notes, not pixels");

    let result = loader(400, 400).load(&ImageLocator::new(path.display().to_string()));
    let _ = std::fs::remove_file(&path);

    assert!(result.is_none());
}

#[test]
fn terminal_session_cancels_displays_and_survives_failure() {
    let path = write_fixture("session.png", &encode(900, 900, ImageFormat::Png));
    let input = format!("\n{}\n/definitely/not/here.png\n", path.display());

    let mut app = GalleryApp::new(LinePicker::new(Cursor::new(input)), loader(200, 200));

    assert_eq!(app.on_select_image(), SelectionOutcome::Cancelled);
    assert!(app.view().current().is_none());

    assert_eq!(app.on_select_image(), SelectionOutcome::Displayed);
    assert_eq!(app.on_select_image(), SelectionOutcome::Unchanged);
    let _ = std::fs::remove_file(&path);

    // half = 450：1 → 2 → 4（112 < 200 停止）
    let shown = app.view().current().expect("first image should remain");
    assert_eq!(shown.factor().get(), 4);
    assert_eq!((shown.width(), shown.height()), (225, 225));

    assert_eq!(app.on_select_image(), SelectionOutcome::Cancelled);
    assert!(app.picker().is_closed());
}
