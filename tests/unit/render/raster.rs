use super::*;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "iceberg_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn filled_and_pixel_access() {
    let img = RasterImage::filled(3, 2, [1, 2, 3, 255]);
    assert_eq!(img.data.len(), 3 * 2 * 4);
    assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(img.pixel(3, 0), None);
    assert_eq!(RasterImage::new(1, 1).pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn from_premul_checks_length() {
    assert!(RasterImage::from_premul(2, 2, vec![0; 16]).is_ok());
    let err = RasterImage::from_premul(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(err, IcebergError::Image(_)));
}

#[test]
fn png_encode_decode_keeps_opaque_pixels() {
    let img = RasterImage::filled(4, 3, [10, 200, 30, 255]);
    let bytes = img.encode_png().unwrap();
    let back = CpuRaster.load_image(&bytes).unwrap();
    assert_eq!(back, img);
}

#[test]
fn resize_produces_requested_dimensions() {
    let img = RasterImage::filled(8, 4, [50, 60, 70, 255]);
    let out = CpuRaster.resize(&img, 3, 5).unwrap();
    assert_eq!((out.width, out.height), (3, 5));
    assert_eq!(out.data.len(), 3 * 5 * 4);
    assert_eq!(out.pixel(1, 2), Some([50, 60, 70, 255]));

    assert!(CpuRaster.resize(&img, 0, 5).is_err());
}

#[test]
fn composite_at_places_and_clips() {
    let mut canvas = RasterImage::filled(4, 4, [0, 0, 0, 255]);
    let cover = RasterImage::filled(2, 2, [255, 255, 255, 255]);
    CpuRaster.composite_at(&mut canvas, &cover, 3, 3);
    assert_eq!(canvas.pixel(3, 3), Some([255, 255, 255, 255]));
    assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 255]));
}

#[test]
fn missing_base_canvas_is_asset_missing() {
    let path = temp_path("no_such_canvas.png");
    let err = CpuRaster.load_base_canvas(&path).unwrap_err();
    assert!(matches!(err, IcebergError::AssetMissing(_)));
}

#[test]
fn undecodable_base_canvas_is_asset_missing() {
    let path = temp_path("garbage_canvas.png");
    std::fs::write(&path, b"not an image").unwrap();
    let err = CpuRaster.load_base_canvas(&path).unwrap_err();
    assert!(matches!(err, IcebergError::AssetMissing(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn save_png_round_trips_through_disk() {
    let path = temp_path("saved.png");
    let img = RasterImage::filled(2, 2, [0, 0, 255, 255]);
    img.save_png(&path).unwrap();
    let loaded = CpuRaster.load_base_canvas(&path).unwrap();
    assert_eq!(loaded, img);
    std::fs::remove_file(&path).ok();
}
